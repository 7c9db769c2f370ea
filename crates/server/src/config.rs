//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SEEDMART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SEEDMART_BASE_URL` - Public URL, used for email links and the session cookie
//! - `SELLER_GSTIN` - GSTIN printed on tax invoices
//!
//! ## Optional
//! - `SEEDMART_HOST` - Bind address (default: 127.0.0.1)
//! - `SEEDMART_PORT` - Listen port (default: 3000)
//! - `SEEDMART_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SELLER_NAME` - Legal name on invoices (default: Tanindo Seeds Pvt Ltd)
//! - `SELLER_ADDRESS` - Registered address on invoices
//! - `SELLER_STATE` - State of supply origin (default: derived from `SELLER_GSTIN`)
//! - `ADMIN_SETUP_SECRET` - Enables `POST /api/admin/promote` (high entropy)
//! - `EMAIL_FROM` - Sender address (default: `SeedMart <noreply@seedmart.in>`)
//! - `SMTP_HOST` - SMTP relay; when unset, emails are logged instead of sent
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - Required when `SMTP_HOST` is set
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use seedmart_core::Gstin;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SELLER_NAME: &str = "Tanindo Seeds Pvt Ltd";
const DEFAULT_EMAIL_FROM: &str = "SeedMart <noreply@seedmart.in>";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Invoice issuer details
    pub seller: SellerConfig,
    /// Shared secret for bootstrapping the first admin
    pub admin_setup_secret: Option<SecretString>,
    /// Outbound email configuration
    pub email: EmailConfig,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// The business issuing invoices.
#[derive(Debug, Clone)]
pub struct SellerConfig {
    pub name: String,
    pub address: Option<String>,
    pub gstin: Gstin,
    /// Origin state; compared with the buyer's state to pick CGST+SGST or IGST.
    pub state: String,
}

/// Outbound email configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email sender address (From header)
    pub from_address: String,
    /// SMTP relay; `None` selects the log-only transport
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay credentials.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port
    pub port: u16,
    /// SMTP authentication username
    pub username: String,
    /// SMTP authentication password
    pub password: SecretString,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("SEEDMART_DATABASE_URL")?;
        let host = get_env_or_default("SEEDMART_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEDMART_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SEEDMART_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SEEDMART_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("SEEDMART_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SEEDMART_BASE_URL".to_string(), e.to_string())
        })?;

        let seller = SellerConfig::new(
            get_optional_env("SELLER_NAME"),
            get_optional_env("SELLER_ADDRESS"),
            &get_required_env("SELLER_GSTIN")?,
            get_optional_env("SELLER_STATE"),
        )?;

        let admin_setup_secret = get_optional_env("ADMIN_SETUP_SECRET")
            .map(|value| {
                validate_secret_strength(&value, "ADMIN_SETUP_SECRET")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;

        let email = EmailConfig::from_env()?;
        let log_json = get_optional_env("SEEDMART_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            seller,
            admin_setup_secret,
            email,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over TLS (controls the Secure cookie flag).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute URL for `path` under the public base URL.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl SellerConfig {
    /// Build seller details, deriving the state from the GSTIN when not given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for a malformed GSTIN or when the
    /// state can be neither read nor derived.
    pub fn new(
        name: Option<String>,
        address: Option<String>,
        gstin: &str,
        state: Option<String>,
    ) -> Result<Self, ConfigError> {
        let gstin = Gstin::parse(gstin)
            .map_err(|e| ConfigError::InvalidEnvVar("SELLER_GSTIN".to_string(), e.to_string()))?;

        let state = match state.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(state) => state,
            None => gstin
                .state_name()
                .map(str::to_string)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "SELLER_STATE".to_string(),
                        format!("unknown GST state code {}; set SELLER_STATE", gstin.state_code()),
                    )
                })?,
        };

        Ok(Self {
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SELLER_NAME.to_string()),
            address: address.filter(|a| !a.trim().is_empty()),
            gstin,
            state,
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let from_address = get_env_or_default("EMAIL_FROM", DEFAULT_EMAIL_FROM);
        from_address.parse::<lettre::message::Mailbox>().map_err(|e| {
            ConfigError::InvalidEnvVar("EMAIL_FROM".to_string(), e.to_string())
        })?;

        let smtp = match get_optional_env("SMTP_HOST") {
            None => None,
            Some(host) => {
                let port = get_env_or_default("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string())
                    })?;
                Some(SmtpConfig {
                    host,
                    port,
                    username: get_required_env("SMTP_USERNAME")?,
                    password: get_validated_secret("SMTP_PASSWORD")?,
                })
            }
        };

        Ok(Self { from_address, smtp })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Configuration used by unit tests across the crate.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/seedmart_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "https://seedmart.test".to_string(),
        seller: SellerConfig::new(None, None, "27AAPFU0939F1ZV", None).unwrap(),
        admin_setup_secret: None,
        email: EmailConfig {
            from_address: DEFAULT_EMAIL_FROM.to_string(),
            smtp: None,
        },
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.1,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-setup-key", "ADMIN_SETUP_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "ADMIN_SETUP_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("q8Zr!2vLk#9TmW4p$Xa7", "ADMIN_SETUP_SECRET").is_ok());
    }

    #[test]
    fn test_seller_state_derived_from_gstin() {
        let seller = SellerConfig::new(None, None, "03aabcp1234q1z5", None).unwrap();
        assert_eq!(seller.state, "Punjab");
        assert_eq!(seller.name, DEFAULT_SELLER_NAME);
        assert_eq!(seller.gstin.as_str(), "03AABCP1234Q1Z5");
    }

    #[test]
    fn test_seller_state_override_and_blank_name() {
        let seller = SellerConfig::new(
            Some("  ".to_string()),
            Some("Plot 7, MIDC, Jalna".to_string()),
            "27AAPFU0939F1ZV",
            Some(" Maharashtra ".to_string()),
        )
        .unwrap();
        assert_eq!(seller.state, "Maharashtra");
        assert_eq!(seller.name, DEFAULT_SELLER_NAME);
        assert_eq!(seller.address.as_deref(), Some("Plot 7, MIDC, Jalna"));
    }

    #[test]
    fn test_seller_rejects_bad_gstin() {
        let result = SellerConfig::new(None, None, "NOT-A-GSTIN", None);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(var, _)) if var == "SELLER_GSTIN"));
    }

    #[test]
    fn test_public_url_joins_paths() {
        let mut config = test_config();
        assert_eq!(config.public_url("/api/invoices/7"), "https://seedmart.test/api/invoices/7");
        config.base_url = "http://localhost:3000/".to_string();
        assert_eq!(config.public_url("api/invoices/7"), "http://localhost:3000/api/invoices/7");
        assert!(!config.is_https());
    }

    #[test]
    fn test_smtp_config_debug_redacts_password() {
        let smtp = SmtpConfig {
            host: "smtp.seedmart.in".to_string(),
            port: 587,
            username: "mailer".to_string(),
            password: SecretString::from("Zq8!super-private-pass"),
        };
        let debug_output = format!("{smtp:?}");
        assert!(debug_output.contains("smtp.seedmart.in"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-private-pass"));
    }
}
