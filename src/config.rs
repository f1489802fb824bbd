//! Client configuration from the process environment or from the headers of
//! an inbound request.

use crate::{
    auth::Credential,
    client::{Connection, FmODataClient},
    error::{FmODataError, FmODataResult},
};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const ENV_HOST: &str = "FMODATA_HOST";
pub const ENV_DATABASE: &str = "FMODATA_DATABASE";
pub const ENV_USERNAME: &str = "FMODATA_USERNAME";
pub const ENV_PASSWORD: &str = "FMODATA_PASSWORD";
pub const ENV_OTTO_API_KEY: &str = "FMODATA_OTTO_API_KEY";
pub const ENV_OTTO_PORT: &str = "FMODATA_OTTO_PORT";
pub const ENV_TIMEOUT_SECS: &str = "FMODATA_TIMEOUT_SECS";

const HOST_HEADERS: &[&str] = &["x-fmodata-host", "fmodata-host"];
const DATABASE_HEADERS: &[&str] = &[
    "x-fmodata-database",
    "fmodata-database",
    "x-fmodata-filename",
    "fmodata-filename",
];
const USERNAME_HEADERS: &[&str] = &["x-fmodata-username", "fmodata-username"];
const PASSWORD_HEADERS: &[&str] = &["x-fmodata-password", "fmodata-password"];
const API_KEY_HEADERS: &[&str] = &[
    "x-fmodata-otto-api-key",
    "fmodata-otto-api-key",
    "x-fmodata-api-key",
    "fmodata-api-key",
];
const OTTO_PORT_HEADERS: &[&str] = &["x-fmodata-otto-port", "fmodata-otto-port"];

/// Unvalidated connection settings
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ODataConfig {
    pub host: Option<String>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub otto_port: Option<String>,
    pub timeout_secs: Option<String>,
}

impl fmt::Debug for ODataConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ODataConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("api_key", &redacted(&self.api_key))
            .field("otto_port", &self.otto_port)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ODataConfig {
    /// Read settings from `FMODATA_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            host: get(ENV_HOST),
            database: get(ENV_DATABASE),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
            api_key: get(ENV_OTTO_API_KEY),
            otto_port: get(ENV_OTTO_PORT),
            timeout_secs: get(ENV_TIMEOUT_SECS),
        }
    }

    /// Read settings from inbound request headers.
    ///
    /// Header names match case-insensitively; both `x-fmodata-*` and
    /// `fmodata-*` spellings are accepted, first match wins.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |names: &[&str]| {
            names.iter().find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
        };

        Self {
            host: get(HOST_HEADERS),
            database: get(DATABASE_HEADERS),
            username: get(USERNAME_HEADERS),
            password: get(PASSWORD_HEADERS),
            api_key: get(API_KEY_HEADERS),
            otto_port: get(OTTO_PORT_HEADERS),
            timeout_secs: None,
        }
    }

    /// Headers first, environment for anything the headers leave out
    pub fn from_headers_or_env(headers: &HeaderMap) -> Self {
        Self::from_headers(headers).or(Self::from_env())
    }

    /// Fill unset values from `fallback`
    pub fn or(self, fallback: Self) -> Self {
        Self {
            host: self.host.or(fallback.host),
            database: self.database.or(fallback.database),
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
            api_key: self.api_key.or(fallback.api_key),
            otto_port: self.otto_port.or(fallback.otto_port),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    pub fn connection(&self) -> FmODataResult<Connection> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| FmODataError::config_error("missing host"))?;
        let database = self
            .database
            .as_deref()
            .ok_or_else(|| FmODataError::config_error("missing database"))?;
        Connection::new(host, database)
    }

    pub fn credential(&self) -> FmODataResult<Credential> {
        let port = parse_setting::<u16>("otto port", self.otto_port.as_deref())?;
        Credential::from_parts(
            self.username.as_deref(),
            self.password.as_deref(),
            self.api_key.as_deref(),
            port,
        )
    }

    pub fn timeout(&self) -> FmODataResult<Option<Duration>> {
        Ok(parse_setting::<u64>("timeout", self.timeout_secs.as_deref())?.map(Duration::from_secs))
    }

    /// Check everything without building a client
    pub fn validate(&self) -> FmODataResult<()> {
        self.connection()?;
        self.credential()?;
        self.timeout()?;
        Ok(())
    }

    /// Build a client over the default transport
    pub fn build_client(&self) -> FmODataResult<FmODataClient> {
        let connection = self.connection()?;
        let credential = self.credential()?;
        let timeout = self.timeout()?;

        let client = FmODataClient::with_transport(
            connection,
            &credential,
            crate::transport::ReqwestTransport::new()?,
        )?;
        Ok(match timeout {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        })
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, value: Option<&str>) -> FmODataResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| FmODataError::config_error(format!("invalid {} '{}': {}", name, v, e)))
        })
        .transpose()
}
