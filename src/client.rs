use crate::{
    apis::{RecordApi, SchemaApi, ScriptApi, TableApi},
    auth::{Credential, ResolvedAuth},
    error::{FmODataError, FmODataResult},
    models::ErrorResponse,
    query::{format_key, QueryOptions},
    transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse},
};
use bytes::Bytes;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Root of every OData path, before the database segment
pub const ODATA_ROOT: &str = "/fmi/odata/v4";

const JSON: &str = "application/json";
const XML: &str = "application/xml";

/// Server address and database name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    host: Url,
    database: String,
}

impl Connection {
    pub fn new(host: impl AsRef<str>, database: impl Into<String>) -> FmODataResult<Self> {
        let host_str = host.as_ref().trim();
        if host_str.is_empty() {
            return Err(FmODataError::config_error("host is required"));
        }

        let host = Url::parse(host_str)
            .map_err(|e| FmODataError::config_error(format!("invalid host '{}': {}", host_str, e)))?;
        if !matches!(host.scheme(), "http" | "https") || host.host_str().is_none() {
            return Err(FmODataError::config_error(format!(
                "host must be an http(s) URL, got '{}'",
                host_str
            )));
        }

        let database = database.into();
        if database.trim().is_empty() {
            return Err(FmODataError::config_error("database is required"));
        }

        Ok(Self { host, database })
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Main FileMaker OData client
#[derive(Clone)]
pub struct FmODataClient {
    transport: Arc<dyn Transport>,
    connection: Connection,
    origin: String,
    auth: ResolvedAuth,
    timeout: Option<Duration>,
}

impl FmODataClient {
    /// Create a new client using the default reqwest transport
    pub fn new(
        host: impl AsRef<str>,
        database: impl Into<String>,
        credential: Credential,
    ) -> FmODataResult<Self> {
        let connection = Connection::new(host, database)?;
        Self::with_transport(connection, &credential, ReqwestTransport::new()?)
    }

    /// Create a new client over a custom transport
    pub fn with_transport(
        connection: Connection,
        credential: &Credential,
        transport: impl Transport + 'static,
    ) -> FmODataResult<Self> {
        Self::with_shared_transport(connection, credential, Arc::new(transport))
    }

    /// Create a new client sharing an existing transport
    pub fn with_shared_transport(
        connection: Connection,
        credential: &Credential,
        transport: Arc<dyn Transport>,
    ) -> FmODataResult<Self> {
        let auth = ResolvedAuth::resolve(credential)?;

        let mut host = connection.host.clone();
        if let Some(port) = auth.port() {
            host.set_port(Some(port))
                .map_err(|_| FmODataError::config_error("host does not accept a port"))?;
        }
        let origin = host.as_str().trim_end_matches('/').to_string();

        debug!(
            "Configured {} client for {} (database {})",
            credential.kind(),
            origin,
            connection.database
        );

        Ok(Self {
            transport,
            connection,
            origin,
            auth,
            timeout: None,
        })
    }

    /// Clone of this client whose requests give up after `timeout`
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self.clone()
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn auth(&self) -> &ResolvedAuth {
        &self.auth
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Service root URL, including any auth path prefix
    pub fn base_url(&self) -> String {
        format!("{}{}", self.origin, self.service_path(""))
    }

    /// Absolute request path for a suffix below the service root
    pub fn service_path(&self, suffix: &str) -> String {
        let path = format!(
            "{}/{}{}",
            ODATA_ROOT,
            urlencoding::encode(&self.connection.database),
            suffix
        );
        self.auth.rewrite_path(&path).into_owned()
    }

    /// Get Table API
    pub fn tables(&self) -> TableApi<'_> {
        TableApi::new(self)
    }

    /// Get Record API
    pub fn records(&self) -> RecordApi<'_> {
        RecordApi::new(self)
    }

    /// Get Schema API
    pub fn schema(&self) -> SchemaApi<'_> {
        SchemaApi::new(self)
    }

    /// Get Script API
    pub fn scripts(&self) -> ScriptApi<'_> {
        ScriptApi::new(self)
    }

    /// Build a request for a path below the service root
    pub fn request(&self, method: Method, suffix: &str) -> ODataRequest {
        ODataRequest {
            method,
            path: self.service_path(suffix),
            query: String::new(),
            body: None,
            accept: JSON,
        }
    }

    /// Execute a request and deserialize the JSON body
    pub async fn execute<T>(&self, request: ODataRequest) -> FmODataResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Execute a request whose success body may be empty
    pub async fn execute_optional<T>(&self, request: ODataRequest) -> FmODataResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&response.body)?))
    }

    /// Execute a request and discard the body
    pub async fn execute_empty(&self, request: ODataRequest) -> FmODataResult<()> {
        self.send(request).await.map(|_| ())
    }

    /// Execute a request and return raw bytes
    pub async fn execute_bytes(&self, request: ODataRequest) -> FmODataResult<Bytes> {
        Ok(self.send(request).await?.body)
    }

    /// Execute a request and return the body as UTF-8 text
    pub async fn execute_text(&self, request: ODataRequest) -> FmODataResult<String> {
        let body = self.send(request).await?.body;
        String::from_utf8(body.to_vec())
            .map_err(|e| FmODataError::parse_error(format!("Response is not UTF-8: {}", e)))
    }

    async fn send(&self, request: ODataRequest) -> FmODataResult<TransportResponse> {
        let mut raw = format!("{}{}", self.origin, request.path);
        if !request.query.is_empty() {
            raw.push('?');
            raw.push_str(&request.query);
        }
        let url = Url::parse(&raw)?;
        debug!("HTTP {} {}", request.method, url);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(request.accept));
        headers.insert(HeaderName::from_static("odata-version"), HeaderValue::from_static("4.0"));
        headers.insert(HeaderName::from_static("odata-maxversion"), HeaderValue::from_static("4.0"));
        if request.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        self.auth.apply_auth(&mut headers);

        let response = self
            .transport
            .send(TransportRequest {
                method: request.method,
                url,
                headers,
                body: request.body,
                timeout: self.timeout,
            })
            .await?;

        if response.status.is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response.status, &response.body))
        }
    }

    /// Map a non-2xx response to an OData error, keeping the raw body
    fn error_from_response(status: StatusCode, body: &[u8]) -> FmODataError {
        let raw = String::from_utf8_lossy(body).into_owned();
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .and_then(|resp| resp.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| format!("HTTP {}", status));

        FmODataError::odata_error(status.as_u16(), message, raw)
    }

    /// Path segment for a table
    pub fn table_path(table: &str) -> String {
        format!("/{}", urlencoding::encode(table))
    }

    /// Path segment addressing one record of a table.
    ///
    /// Characters that would end the segment or the path (`/`, `\`, `?`,
    /// `#`) are percent-encoded inside the predicate, as is `%` itself.
    /// Single quotes stay literal.
    pub fn record_path(table: &str, key: &str) -> String {
        format!(
            "/{}({})",
            urlencoding::encode(table),
            escape_key_predicate(&format_key(key))
        )
    }
}

fn escape_key_predicate(predicate: &str) -> String {
    let mut escaped = String::with_capacity(predicate.len());
    for c in predicate.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '/' => escaped.push_str("%2F"),
            '\\' => escaped.push_str("%5C"),
            '?' => escaped.push_str("%3F"),
            '#' => escaped.push_str("%23"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A request under construction, relative to the client's service root
#[derive(Debug, Clone)]
pub struct ODataRequest {
    method: Method,
    path: String,
    query: String,
    body: Option<Bytes>,
    accept: &'static str,
}

impl ODataRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Append encoded query options
    pub fn options(self, options: &QueryOptions) -> Self {
        self.raw_query(&options.to_query_string())
    }

    /// Append an already encoded `name=value` fragment
    pub fn raw_query(mut self, fragment: &str) -> Self {
        if fragment.is_empty() {
            return self;
        }
        if !self.query.is_empty() {
            self.query.push('&');
        }
        self.query.push_str(fragment);
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> FmODataResult<Self> {
        let encoded = serde_json::to_vec(body)?;
        debug!("Request body: {} bytes", encoded.len());
        self.body = Some(Bytes::from(encoded));
        Ok(self)
    }

    /// Ask for XML instead of JSON
    pub fn accept_xml(mut self) -> Self {
        self.accept = XML;
        self
    }
}
