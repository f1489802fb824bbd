use crate::{
    client::FmODataClient,
    error::FmODataResult,
    metadata,
    models::{ODataResponse, Table},
};
use reqwest::Method;
use log::{debug, info, warn};

/// Table listing and metadata operations
pub struct TableApi<'a> {
    client: &'a FmODataClient,
}

impl<'a> TableApi<'a> {
    pub fn new(client: &'a FmODataClient) -> Self {
        Self { client }
    }

    /// List all tables in the database.
    ///
    /// Servers that reject the listing endpoint as unauthorized but still
    /// serve `$metadata` get their table list rebuilt from the metadata.
    /// Every other failure is returned as is.
    pub async fn get_tables(&self) -> FmODataResult<ODataResponse<Table>> {
        info!("Listing tables");
        let req = self.client.request(Method::GET, "");

        let err = match self.client.execute::<ODataResponse<Table>>(req).await {
            Ok(tables) => return Ok(tables),
            Err(err) => err,
        };

        if !err.is_unauthorized() {
            return Err(err);
        }

        warn!("Table listing rejected ({}), rebuilding from $metadata", err);
        let xml = self.get_metadata().await?;
        let tables = metadata::extract_tables(&xml)?;
        debug!("Recovered {} tables from metadata", tables.len());

        Ok(ODataResponse {
            context: format!("{}/$metadata", self.client.base_url()),
            value: tables,
            count: None,
        })
    }

    /// Fetch the `$metadata` CSDL document as XML text
    pub async fn get_metadata(&self) -> FmODataResult<String> {
        info!("Getting metadata");
        let req = self.client.request(Method::GET, "/$metadata").accept_xml();
        debug!("HTTP GET {}", req.path());

        self.client.execute_text(req).await
    }

    /// Field names of a table, read fresh from `$metadata`
    pub async fn list_fields(&self, table: &str) -> FmODataResult<Vec<String>> {
        info!("Listing fields of table: {}", table);
        let xml = self.get_metadata().await?;
        metadata::extract_fields(&xml, table)
    }
}
