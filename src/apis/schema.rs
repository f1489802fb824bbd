use crate::{
    client::FmODataClient,
    error::FmODataResult,
    models::{AddFieldsRequest, CreateTableRequest, FieldDefinition},
};
use reqwest::Method;
use log::{debug, info};

/// Schema pseudo-resource for tables
const TABLES_RESOURCE: &str = "/FileMaker_Tables";
/// Schema pseudo-resource for fields, below a table
const FIELDS_RESOURCE: &str = "FileMaker_Fields";

/// Schema mutation operations
pub struct SchemaApi<'a> {
    client: &'a FmODataClient,
}

impl<'a> SchemaApi<'a> {
    pub fn new(client: &'a FmODataClient) -> Self {
        Self { client }
    }

    /// Create a new table
    ///
    /// # Arguments
    /// * `name` - Name of the new table
    /// * `fields` - Initial field definitions
    pub async fn create_table(
        &self,
        name: &str,
        fields: &[FieldDefinition],
    ) -> FmODataResult<Option<serde_json::Value>> {
        info!("Creating table: {} ({} fields)", name, fields.len());
        let body = CreateTableRequest {
            table_name: name,
            fields,
        };
        let req = self.client.request(Method::POST, TABLES_RESOURCE).json(&body)?;
        debug!("HTTP POST {}", req.path());

        self.client.execute_optional(req).await
    }

    /// Add fields to an existing table
    pub async fn add_fields(
        &self,
        table: &str,
        fields: &[FieldDefinition],
    ) -> FmODataResult<Option<serde_json::Value>> {
        info!("Adding {} fields to table: {}", fields.len(), table);
        let path = format!("{}/{}", FmODataClient::table_path(table), FIELDS_RESOURCE);
        let req = self
            .client
            .request(Method::POST, &path)
            .json(&AddFieldsRequest { fields })?;
        debug!("HTTP POST {}", req.path());

        self.client.execute_optional(req).await
    }

    /// Delete a table
    pub async fn delete_table(&self, table: &str) -> FmODataResult<()> {
        info!("Deleting table: {}", table);
        let path = format!("{}('{}')", TABLES_RESOURCE, urlencoding::encode(table));
        let req = self.client.request(Method::DELETE, &path);
        debug!("HTTP DELETE {}", req.path());

        self.client.execute_empty(req).await
    }

    /// Delete a field from a table
    pub async fn delete_field(&self, table: &str, field: &str) -> FmODataResult<()> {
        info!("Deleting field {} from table: {}", field, table);
        let path = format!(
            "{}/{}('{}')",
            FmODataClient::table_path(table),
            FIELDS_RESOURCE,
            urlencoding::encode(field)
        );
        let req = self.client.request(Method::DELETE, &path);
        debug!("HTTP DELETE {}", req.path());

        self.client.execute_empty(req).await
    }
}
