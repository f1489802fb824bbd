/*
 * FileMaker OData client - request construction for the FileMaker OData v4 API
 */

// Internal modules
mod client;
pub mod models;  // Make models public
mod apis;
mod error;
pub mod auth;
pub mod config;
pub mod metadata;
pub mod query;
pub mod transport;


// Re-export public types and interfaces
pub use client::{Connection, FmODataClient, ODataRequest, ODATA_ROOT};
pub use models::*;
pub use apis::*;
pub use error::{FmODataError, FmODataResult};
pub use auth::{Credential, ResolvedAuth};
pub use config::ODataConfig;
pub use query::{format_key, QueryOptions};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        FmODataClient, Connection,
        Credential, ODataConfig,
        FmODataError, FmODataResult,
        QueryOptions,
        // Common model types
        Table, ODataResponse,
        FieldDefinition, FieldType,
        ScriptInvocation, ScriptParameterMode,
    };
}
