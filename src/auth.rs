use crate::error::{FmODataError, FmODataResult};
use base64::{Engine, engine::general_purpose};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::borrow::Cow;
use std::fmt;

/// Key prefix of Otto v3 API keys
pub const OTTO_V3_KEY_PREFIX: &str = "KEY_";
/// Key prefix of OttoFMS API keys
pub const OTTO_FMS_KEY_PREFIX: &str = "dk_";
/// Port the Otto v3 proxy listens on unless told otherwise
pub const OTTO_V3_DEFAULT_PORT: u16 = 3030;
/// Path segment OttoFMS expects in front of `/fmi`
pub const OTTO_FMS_PATH_PREFIX: &str = "/otto";

/// Credential used to talk to the OData service.
///
/// Constructed once per client. Use [`Credential::api_key`] to classify a raw
/// API key by its prefix.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// FileMaker account username/password
    Basic { username: String, password: String },
    /// Otto v3 API key (`KEY_...`), served on its own port
    ApiKeyV3 { key: String, port: Option<u16> },
    /// OttoFMS API key (`dk_...`), served under `/otto`
    ApiKeyFms { key: String },
}

impl Credential {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Classify an API key by prefix. `port` only applies to Otto v3 keys.
    pub fn api_key(key: impl Into<String>, port: Option<u16>) -> FmODataResult<Self> {
        classify_key(key.into(), port)
    }

    /// Build a credential from loosely supplied parts.
    ///
    /// An API key wins over username/password. Empty strings count as absent.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
        api_key: Option<&str>,
        port: Option<u16>,
    ) -> FmODataResult<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        if let Some(key) = present(api_key) {
            return classify_key(key.to_string(), port);
        }

        match (present(username), present(password)) {
            (Some(username), Some(password)) => Ok(Self::basic(username, password)),
            _ => Err(FmODataError::config_error(
                "either an API key or a username/password pair is required",
            )),
        }
    }

    /// Short name of the credential variant, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::ApiKeyV3 { .. } => "otto-v3",
            Self::ApiKeyFms { .. } => "otto-fms",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::ApiKeyV3 { port, .. } => f
                .debug_struct("ApiKeyV3")
                .field("key", &"<redacted>")
                .field("port", port)
                .finish(),
            Self::ApiKeyFms { .. } => f
                .debug_struct("ApiKeyFms")
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Pick the API key variant from its prefix
pub fn classify_key(key: String, port: Option<u16>) -> FmODataResult<Credential> {
    if key.starts_with(OTTO_V3_KEY_PREFIX) {
        Ok(Credential::ApiKeyV3 { key, port })
    } else if key.starts_with(OTTO_FMS_KEY_PREFIX) {
        Ok(Credential::ApiKeyFms { key })
    } else {
        Err(FmODataError::AuthResolution(format!(
            "invalid key format: must start with '{}' (Otto v3) or '{}' (OttoFMS)",
            OTTO_V3_KEY_PREFIX, OTTO_FMS_KEY_PREFIX
        )))
    }
}

/// Authorization header and routing rules derived from a [`Credential`].
///
/// The path rewrite applies to every request made with the credential, not
/// only to the header.
#[derive(Clone)]
pub struct ResolvedAuth {
    header: HeaderValue,
    base_path_prefix: &'static str,
    port: Option<u16>,
}

impl ResolvedAuth {
    pub fn resolve(credential: &Credential) -> FmODataResult<Self> {
        let (auth_value, base_path_prefix, port) = match credential {
            Credential::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(FmODataError::config_error(
                        "basic auth requires both username and password",
                    ));
                }
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                (format!("Basic {}", encoded), "", None)
            }
            Credential::ApiKeyV3 { key, port } => (
                format!("Bearer {}", key),
                "",
                Some(port.unwrap_or(OTTO_V3_DEFAULT_PORT)),
            ),
            Credential::ApiKeyFms { key } => {
                (format!("Bearer {}", key), OTTO_FMS_PATH_PREFIX, None)
            }
        };

        let mut header = HeaderValue::from_str(&auth_value).map_err(|e| {
            FmODataError::AuthResolution(format!("Invalid auth header: {}", e))
        })?;
        header.set_sensitive(true);

        Ok(Self {
            header,
            base_path_prefix,
            port,
        })
    }

    /// Value for the `Authorization` header
    pub fn header(&self) -> &HeaderValue {
        &self.header
    }

    /// Prefix placed before `/fmi` (empty unless OttoFMS)
    pub fn base_path_prefix(&self) -> &str {
        self.base_path_prefix
    }

    /// Port override for the host, if the variant has one
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Apply authentication to the request headers
    pub fn apply_auth(&self, headers: &mut HeaderMap) {
        headers.insert(AUTHORIZATION, self.header.clone());
    }

    /// Insert the base path prefix in front of an absolute `/fmi/...` path.
    ///
    /// Paths that do not start with `/fmi/` or already carry the prefix are
    /// returned unchanged.
    pub fn rewrite_path<'p>(&self, path: &'p str) -> Cow<'p, str> {
        if !self.base_path_prefix.is_empty() && path.starts_with("/fmi/") {
            Cow::Owned(format!("{}{}", self.base_path_prefix, path))
        } else {
            Cow::Borrowed(path)
        }
    }
}

impl fmt::Debug for ResolvedAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAuth")
            .field("base_path_prefix", &self.base_path_prefix)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}
