//! Environment-based configuration for the resource synchronizer.

use anyhow::Result;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;

/// Default location of the entity manifest
pub const DEFAULT_MANIFEST_PATH: &str = "uma-resources.json";

/// Environment variable holding the app allow-list
pub const ALLOW_LIST_ENV: &str = "MODELS_FOR_SYNCHRONIZE_RESOURCES";

/// Authorization server base URL
#[derive(Clone, Debug)]
pub struct ServerUrl(Url);

/// HTTP client timeout configuration
#[derive(Clone, Debug)]
pub struct HttpClientTimeout(Duration);

/// Certificate bundles for HTTPS connections
#[derive(Clone, Debug)]
pub struct CertificateBundles(Vec<String>);

/// Optional allow-list of app config names.
///
/// An app is admitted when its name appears anywhere inside the configured
/// value, so `"blog,shop"` admits `blog`, `shop` and also `log`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList(Option<String>);

/// Main application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub server_url: ServerUrl,
    pub realm: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub allow_list: AllowList,
    pub manifest_path: String,
    pub http_client_timeout: HttpClientTimeout,
    pub certificate_bundles: CertificateBundles,
    pub user_agent: String,
}

impl Config {
    /// Create a new configuration from environment variables
    pub fn new() -> Result<Self> {
        let server_url: ServerUrl = require_env("UMA_SERVER_URL")?.try_into()?;
        let realm = require_env("UMA_REALM")?;
        let client_id = require_env("UMA_CLIENT_ID")?;
        let client_secret = optional_env("UMA_CLIENT_SECRET").filter(|s| !s.is_empty());
        let allow_list: AllowList = optional_env(ALLOW_LIST_ENV).into();
        let manifest_path = default_env("MANIFEST_PATH", DEFAULT_MANIFEST_PATH);
        let http_client_timeout: HttpClientTimeout =
            default_env("HTTP_CLIENT_TIMEOUT", "10s").try_into()?;
        let certificate_bundles: CertificateBundles =
            optional_env("CERTIFICATE_BUNDLES").into();
        let default_user_agent = format!("uma-sync/{}", version()?);
        let user_agent = default_env("USER_AGENT", &default_user_agent);

        Ok(Self {
            version: version()?,
            server_url,
            realm,
            client_id,
            client_secret,
            allow_list,
            manifest_path,
            http_client_timeout,
            certificate_bundles,
            user_agent,
        })
    }

    /// Issuer URL of the configured realm
    pub fn issuer(&self) -> String {
        self.server_url.issuer(&self.realm)
    }
}

/// Get application version from build environment
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotSet.into())
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| ConfigError::EnvVarRequired(name.to_string()).into())
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default_value.to_string())
}

impl ServerUrl {
    /// Realm issuer, `{server}/realms/{realm}`
    pub fn issuer(&self, realm: &str) -> String {
        format!(
            "{}/realms/{}",
            self.0.as_str().trim_end_matches('/'),
            realm
        )
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Url::parse(&value)
            .map(Self)
            .map_err(|err| ConfigError::InvalidServerUrl(value, err))
    }
}

impl AsRef<Url> for ServerUrl {
    fn as_ref(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<String> for HttpClientTimeout {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self(Duration::from_secs(10)));
        }

        if let Some(seconds) = value.strip_suffix('s') {
            let seconds = seconds
                .parse::<u64>()
                .map_err(ConfigError::TimeoutParsingFailed)?;
            Ok(Self(Duration::from_secs(seconds)))
        } else if let Some(minutes) = value.strip_suffix('m') {
            let minutes = minutes
                .parse::<u64>()
                .map_err(ConfigError::TimeoutParsingFailed)?;
            Ok(Self(Duration::from_secs(minutes * 60)))
        } else {
            // Bare numbers are seconds
            let seconds = value
                .parse::<u64>()
                .map_err(ConfigError::TimeoutParsingFailed)?;
            Ok(Self(Duration::from_secs(seconds)))
        }
    }
}

impl AsRef<Duration> for HttpClientTimeout {
    fn as_ref(&self) -> &Duration {
        &self.0
    }
}

impl From<Option<String>> for CertificateBundles {
    fn from(value: Option<String>) -> Self {
        let value = value.unwrap_or_default();
        Self(
            value
                .split(';')
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl AsRef<Vec<String>> for CertificateBundles {
    fn as_ref(&self) -> &Vec<String> {
        &self.0
    }
}

impl AllowList {
    /// Allow-list that admits every app
    pub fn unrestricted() -> Self {
        Self(None)
    }

    /// Whether a filter is configured at all
    pub fn is_restricted(&self) -> bool {
        self.0.is_some()
    }

    /// Whether the named app config should be synchronized
    pub fn admits(&self, app_name: &str) -> bool {
        match &self.0 {
            None => true,
            Some(allowed) => allowed.contains(app_name),
        }
    }
}

impl From<Option<String>> for AllowList {
    fn from(value: Option<String>) -> Self {
        // An empty value disables filtering
        Self(value.filter(|v| !v.is_empty()))
    }
}

impl From<&str> for AllowList {
    fn from(value: &str) -> Self {
        Some(value.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_timeout_parsing() {
        let timeout: HttpClientTimeout = "30s".to_string().try_into().unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(30));

        let timeout: HttpClientTimeout = "2m".to_string().try_into().unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(120));

        let timeout: HttpClientTimeout = "15".to_string().try_into().unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(15));

        let timeout: HttpClientTimeout = String::new().try_into().unwrap();
        assert_eq!(*timeout.as_ref(), Duration::from_secs(10));

        let invalid: Result<HttpClientTimeout, _> = "soon".to_string().try_into();
        assert!(invalid.is_err());
    }

    #[test]
    fn test_certificate_bundles() {
        let bundles: CertificateBundles = Some("/a.pem;;/b.pem".to_string()).into();
        assert_eq!(bundles.as_ref(), &vec!["/a.pem".to_string(), "/b.pem".to_string()]);

        let bundles: CertificateBundles = None.into();
        assert!(bundles.as_ref().is_empty());
    }

    #[test]
    fn test_server_url_issuer() {
        let url: ServerUrl = "https://sso.example.com/".to_string().try_into().unwrap();
        assert_eq!(url.issuer("acme"), "https://sso.example.com/realms/acme");

        let url: ServerUrl = "https://sso.example.com/auth".to_string().try_into().unwrap();
        assert_eq!(url.issuer("acme"), "https://sso.example.com/auth/realms/acme");

        let invalid: Result<ServerUrl, _> = "not a url".to_string().try_into();
        assert!(invalid.is_err());
    }

    #[test]
    fn test_allow_list_unset_admits_everything() {
        let allow_list = AllowList::unrestricted();
        assert!(!allow_list.is_restricted());
        assert!(allow_list.admits("blog"));

        let empty: AllowList = Some(String::new()).into();
        assert!(!empty.is_restricted());
        assert!(empty.admits("shop"));
    }

    #[test]
    fn test_allow_list_substring_match() {
        let allow_list: AllowList = "blog,shop".into();
        assert!(allow_list.is_restricted());
        assert!(allow_list.admits("blog"));
        assert!(allow_list.admits("shop"));
        assert!(!allow_list.admits("accounts"));
        // Substring semantics also admit fragments of listed names
        assert!(allow_list.admits("log"));
    }
}
