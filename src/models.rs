use serde::{Deserialize, Serialize};

/// Kind reported for every table
pub const ENTITY_SET_KIND: &str = "EntitySet";

/// Table (entity set) as listed by the service root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub url: String,
}

fn default_kind() -> String {
    ENTITY_SET_KIND.to_string()
}

impl Table {
    /// Table record for an entity set name, shaped like the live listing
    pub fn entity_set(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ENTITY_SET_KIND.to_string(),
            url: name.to_string(),
        }
    }
}

/// OData collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ODataResponse<T> {
    #[serde(rename = "@odata.context", default)]
    pub context: String,
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.count", skip_serializing_if = "Option::is_none", default)]
    pub count: Option<u64>,
}

/// FileMaker field types accepted by the schema endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    #[serde(rename = "VARCHAR")]
    Varchar,
    #[serde(rename = "NUMERIC")]
    Numeric,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "DATE")]
    Date,
    #[serde(rename = "TIME")]
    Time,
    #[serde(rename = "TIMESTAMP")]
    Timestamp,
    #[serde(rename = "BLOB")]
    Blob,
    #[serde(rename = "VARBINARY")]
    Varbinary,
    #[serde(rename = "LONGVARBINARY")]
    LongVarbinary,
    #[serde(rename = "BINARY VARYING")]
    BinaryVarying,
    #[serde(rename = "CHARACTER VARYING")]
    CharacterVarying,
}

fn default_nullable() -> bool {
    true
}

/// Field definition used when creating tables or adding fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "Type", default)]
    pub field_type: FieldType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl FieldDefinition {
    /// Nullable field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Body of `POST /FileMaker_Tables`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTableRequest<'a> {
    #[serde(rename = "TableName")]
    pub table_name: &'a str,
    #[serde(rename = "Fields")]
    pub fields: &'a [FieldDefinition],
}

/// Body of `POST /<Table>/FileMaker_Fields`
#[derive(Debug, Clone, Serialize)]
pub struct AddFieldsRequest<'a> {
    #[serde(rename = "Fields")]
    pub fields: &'a [FieldDefinition],
}

/// How a script parameter travels to the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScriptParameterMode {
    /// `POST` with `{"scriptParameterValue": ...}`
    #[default]
    Body,
    /// `GET` with `$parameter=...`
    Query,
}

/// Script to run in the context of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    pub table: String,
    pub script: String,
    pub param: Option<String>,
    pub mode: ScriptParameterMode,
}

impl ScriptInvocation {
    pub fn new(table: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            script: script.into(),
            param: None,
            mode: ScriptParameterMode::default(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_mode(mut self, mode: ScriptParameterMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Body of a script `POST`
#[derive(Debug, Clone, Serialize)]
pub struct ScriptRequest<'a> {
    #[serde(rename = "scriptParameterValue")]
    pub script_parameter_value: &'a str,
}

/// Result envelope returned by script execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResponse {
    #[serde(rename = "scriptResult")]
    pub script_result: Option<ScriptResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub code: Option<i64>,
    #[serde(rename = "resultParameter")]
    pub result_parameter: Option<serde_json::Value>,
    pub message: Option<String>,
}

/// OData error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: Option<serde_json::Value>,
    pub message: Option<String>,
}
