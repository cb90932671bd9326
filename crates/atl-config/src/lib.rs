//! Configuration management for atl.
//!
//! Parses `atl.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: every `url` and every credential field under
//! `[confluence.auth]` and `[jira.auth]`.
//!
//! ## Example
//!
//! ```toml
//! [confluence]
//! url = "https://acme.atlassian.net/wiki"
//!
//! [confluence.auth]
//! type = "basic"
//! username = "${CONFLUENCE_USERNAME}"
//! api_token = "${CONFLUENCE_API_TOKEN}"
//!
//! [jira]
//! url = "https://jira.acme.internal"
//! force_internal_comments = true
//!
//! [jira.auth]
//! type = "token"
//! personal_token = "${JIRA_PERSONAL_TOKEN}"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub confluence_url: Option<String>,
    /// Override Jira base URL.
    pub jira_url: Option<String>,
    /// Override the Jira forced-internal-comments flag.
    pub force_internal_comments: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "atl.toml";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence configuration.
    pub confluence: Option<ConfluenceConfig>,
    /// Jira configuration.
    pub jira: Option<JiraConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Credentials for one Atlassian product.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Username plus API token (Cloud) or password (Server).
    Basic {
        /// Account username or e-mail.
        username: String,
        /// API token or password.
        api_token: String,
    },
    /// Personal access token (Server/Data Center).
    Token {
        /// Bearer token value.
        personal_token: String,
    },
    /// OAuth 1.0 RSA-SHA1 (Server/Data Center application link).
    Oauth1 {
        /// OAuth consumer key.
        consumer_key: String,
        /// Path to RSA private key (PEM), relative to the config file.
        key_file: PathBuf,
        /// OAuth access token.
        access_token: String,
    },
}

/// Confluence configuration.
#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    /// Confluence base URL (including `/wiki` on Cloud).
    pub url: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credentials.
    pub auth: AuthConfig,
}

impl ConfluenceConfig {
    /// Whether the URL points at Atlassian Cloud.
    #[must_use]
    pub fn is_cloud(&self) -> bool {
        is_cloud_url(&self.url)
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_service(&self.url, self.timeout_secs, &self.auth, "confluence")
    }
}

/// Jira configuration.
#[derive(Debug, Deserialize)]
pub struct JiraConfig {
    /// Jira base URL.
    pub url: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Credentials.
    pub auth: AuthConfig,
    /// Post every comment as internal, ignoring the requested visibility.
    #[serde(default)]
    pub force_internal_comments: bool,
}

impl JiraConfig {
    /// Whether the URL points at Atlassian Cloud.
    #[must_use]
    pub fn is_cloud(&self) -> bool {
        is_cloud_url(&self.url)
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_service(&self.url, self.timeout_secs, &self.auth, "jira")
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`jira.auth.api_token`").
        field: String,
        /// Error message (e.g., "${`JIRA_API_TOKEN`} not set").
        message: String,
    },
}

/// Whether `url` points at an Atlassian Cloud site.
///
/// Localhost and literal IP hosts are never Cloud.
#[must_use]
pub fn is_cloud_url(url: &str) -> bool {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    if host.starts_with('[') {
        return false;
    }
    let host = host.split(':').next().unwrap_or_default().to_ascii_lowercase();

    if host == "localhost" || host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }

    host == "api.atlassian.com"
        || host.ends_with(".atlassian.net")
        || host.ends_with(".jira.com")
        || host.ends_with(".jira-dev.com")
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

fn validate_service(
    url: &str,
    timeout_secs: u64,
    auth: &AuthConfig,
    section: &str,
) -> Result<(), ConfigError> {
    let field = |name: &str| format!("{section}.{name}");

    require_non_empty(url, &field("url"))?;
    require_http_url(url, &field("url"))?;
    if timeout_secs == 0 {
        return Err(ConfigError::Validation(format!(
            "{} must be greater than 0",
            field("timeout_secs")
        )));
    }

    match auth {
        AuthConfig::Basic {
            username,
            api_token,
        } => {
            require_non_empty(username, &field("auth.username"))?;
            require_non_empty(api_token, &field("auth.api_token"))?;
        }
        AuthConfig::Token { personal_token } => {
            require_non_empty(personal_token, &field("auth.personal_token"))?;
        }
        AuthConfig::Oauth1 {
            consumer_key,
            key_file,
            access_token,
        } => {
            require_non_empty(consumer_key, &field("auth.consumer_key"))?;
            require_non_empty(access_token, &field("auth.access_token"))?;
            if key_file.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{} cannot be empty",
                    field("auth.key_file")
                )));
            }
        }
    }
    Ok(())
}

fn expand_auth(auth: &mut AuthConfig, section: &str) -> Result<(), ConfigError> {
    match auth {
        AuthConfig::Basic {
            username,
            api_token,
        } => {
            expand::expand_in_place(username, &format!("{section}.auth.username"))?;
            expand::expand_in_place(api_token, &format!("{section}.auth.api_token"))?;
        }
        AuthConfig::Token { personal_token } => {
            expand::expand_in_place(personal_token, &format!("{section}.auth.personal_token"))?;
        }
        AuthConfig::Oauth1 {
            consumer_key,
            access_token,
            ..
        } => {
            expand::expand_in_place(consumer_key, &format!("{section}.auth.consumer_key"))?;
            expand::expand_in_place(access_token, &format!("{section}.auth.access_token"))?;
        }
    }
    Ok(())
}

fn resolve_key_file(auth: &mut AuthConfig, config_dir: &Path) {
    if let AuthConfig::Oauth1 { key_file, .. } = auth
        && key_file.is_relative()
        && !key_file.as_os_str().is_empty()
    {
        *key_file = config_dir.join(&*key_file);
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `atl.toml` in current directory and parents.
    /// Without any file the configuration is empty and every
    /// `require_*` call fails.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(confluence) = self.confluence.as_mut()
            && let Some(url) = &settings.confluence_url
        {
            confluence.url.clone_from(url);
        }
        if let Some(jira) = self.jira.as_mut() {
            if let Some(url) = &settings.jira_url {
                jira.url.clone_from(url);
            }
            if let Some(force) = settings.force_internal_comments {
                jira.force_internal_comments = force;
            }
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation("[confluence] section required in config".into())
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Get validated Jira configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_jira(&self) -> Result<&JiraConfig, ConfigError> {
        let conf = self
            .jira
            .as_ref()
            .ok_or_else(|| ConfigError::Validation("[jira] section required in config".into()))?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values that do not depend on credentials.
    ///
    /// Credentials are validated lazily by [`Config::require_confluence`] and
    /// [`Config::require_jira`], so a file may carry a half-filled section
    /// for a product that is not used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(confluence) = &self.confluence
            && confluence.timeout_secs == 0
        {
            return Err(ConfigError::Validation(
                "confluence.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if let Some(jira) = &self.jira
            && jira.timeout_secs == 0
        {
            return Err(ConfigError::Validation(
                "jira.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            expand::expand_in_place(&mut confluence.url, "confluence.url")?;
            expand_auth(&mut confluence.auth, "confluence")?;
        }
        if let Some(ref mut jira) = self.jira {
            expand::expand_in_place(&mut jira.url, "jira.url")?;
            expand_auth(&mut jira.auth, "jira")?;
        }
        Ok(())
    }

    /// Resolve relative key file paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(ref mut confluence) = self.confluence {
            resolve_key_file(&mut confluence.auth, config_dir);
        }
        if let Some(ref mut jira) = self.jira {
            resolve_key_file(&mut jira.auth, config_dir);
        }
    }
}
