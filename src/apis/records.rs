use crate::{
    client::FmODataClient,
    error::{FmODataError, FmODataResult},
    models::ODataResponse,
    query::{escape_filter, QueryOptions},
};
use bytes::Bytes;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use log::{debug, info};

/// Record CRUD operations
pub struct RecordApi<'a> {
    client: &'a FmODataClient,
}

impl<'a> RecordApi<'a> {
    pub fn new(client: &'a FmODataClient) -> Self {
        Self { client }
    }

    /// Query records of a table
    ///
    /// # Arguments
    /// * `table` - Table name
    /// * `options` - Filter, projection, ordering and paging options
    pub async fn get_records<T: DeserializeOwned>(
        &self,
        table: &str,
        options: &QueryOptions,
    ) -> FmODataResult<ODataResponse<T>> {
        info!("Getting records from table: {}", table);
        let req = self
            .client
            .request(Method::GET, &FmODataClient::table_path(table))
            .options(options);
        debug!("HTTP GET {}?{}", req.path(), req.query_string());

        self.client.execute(req).await
    }

    /// Get a single record by primary key
    ///
    /// Only `select` and `expand` from `options` are used.
    pub async fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        key: &str,
        options: &QueryOptions,
    ) -> FmODataResult<T> {
        info!("Getting record {} from table: {}", key, table);
        let req = self
            .client
            .request(Method::GET, &FmODataClient::record_path(table, key))
            .options(&options.select_expand_only());
        debug!("HTTP GET {}?{}", req.path(), req.query_string());

        self.client.execute(req).await
    }

    /// Count records, optionally restricted by a filter
    pub async fn get_record_count(&self, table: &str, filter: Option<&str>) -> FmODataResult<u64> {
        info!("Counting records in table: {}", table);
        let path = format!("{}/$count", FmODataClient::table_path(table));
        let mut req = self.client.request(Method::GET, &path);
        if let Some(filter) = filter {
            req = req.raw_query(&format!("$filter={}", escape_filter(filter)));
        }
        debug!("HTTP GET {}?{}", req.path(), req.query_string());

        let text = self.client.execute_text(req).await?;
        let count = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
        count.parse::<u64>().map_err(|e| {
            FmODataError::parse_error(format!("Invalid count response '{}': {}", count, e))
        })
    }

    /// Raw value of one field of one record
    pub async fn get_field_value(&self, table: &str, key: &str, field: &str) -> FmODataResult<Bytes> {
        info!("Getting field {} of record {} in table: {}", field, key, table);
        let path = format!(
            "{}/{}/$value",
            FmODataClient::record_path(table, key),
            urlencoding::encode(field)
        );
        let req = self.client.request(Method::GET, &path);
        debug!("HTTP GET {}", req.path());

        self.client.execute_bytes(req).await
    }

    /// Follow a navigation property from one record
    ///
    /// Only `filter`, `select`, `top` and `skip` from `options` are used.
    pub async fn navigate_related<T: DeserializeOwned>(
        &self,
        table: &str,
        key: &str,
        navigation: &str,
        options: &QueryOptions,
    ) -> FmODataResult<ODataResponse<T>> {
        info!("Navigating {} from record {} in table: {}", navigation, key, table);
        let path = format!(
            "{}/{}",
            FmODataClient::record_path(table, key),
            urlencoding::encode(navigation)
        );
        let req = self
            .client
            .request(Method::GET, &path)
            .options(&options.navigation_only());
        debug!("HTTP GET {}?{}", req.path(), req.query_string());

        self.client.execute(req).await
    }

    /// Create a record and return the server's representation of it
    pub async fn create_record<B, T>(&self, table: &str, data: &B) -> FmODataResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("Creating record in table: {}", table);
        let req = self
            .client
            .request(Method::POST, &FmODataClient::table_path(table))
            .json(data)?;
        debug!("HTTP POST {}", req.path());

        self.client.execute(req).await
    }

    /// Patch fields of an existing record
    ///
    /// Returns the updated record when the server sends one back.
    pub async fn update_record<B, T>(&self, table: &str, key: &str, data: &B) -> FmODataResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("Updating record {} in table: {}", key, table);
        let req = self
            .client
            .request(Method::PATCH, &FmODataClient::record_path(table, key))
            .json(data)?;
        debug!("HTTP PATCH {}", req.path());

        self.client.execute_optional(req).await
    }

    /// Delete a record
    pub async fn delete_record(&self, table: &str, key: &str) -> FmODataResult<()> {
        info!("Deleting record {} from table: {}", key, table);
        let req = self
            .client
            .request(Method::DELETE, &FmODataClient::record_path(table, key));
        debug!("HTTP DELETE {}", req.path());

        self.client.execute_empty(req).await
    }
}
