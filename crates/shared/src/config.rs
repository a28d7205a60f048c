//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// SMTP configuration for passcode delivery.
    #[serde(default)]
    pub email: EmailConfig,
    /// One-time passcode configuration.
    #[serde(default)]
    pub otp: OtpConfig,
    /// First-run admin account.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Shop details printed on invoices and used for daily closing.
    #[serde(default)]
    pub shop: ShopConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    43_200 // one shift
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Mailbox that receives every passcode (the shop owner's inbox).
    #[serde(default = "default_from_email")]
    pub otp_recipient: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            otp_recipient: default_from_email(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "owner@nursery.local".to_string()
}

fn default_from_name() -> String {
    "Plants & Pots".to_string()
}

/// One-time passcode configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// How long an issued passcode stays valid.
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,
    /// How long an idle login session is kept before it is dropped.
    #[serde(default = "default_session_idle")]
    pub session_idle_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
            session_idle_secs: default_session_idle(),
        }
    }
}

fn default_otp_ttl() -> u64 {
    300
}

fn default_session_idle() -> u64 {
    43_200
}

/// Default admin account seeded on first run.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Admin username.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Admin password. Rotate immediately after the first login.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

/// Shop details.
#[derive(Debug, Clone, Deserialize)]
pub struct ShopConfig {
    /// Name printed on the invoice header.
    #[serde(default = "default_shop_name")]
    pub name: String,
    /// Tagline printed under the name.
    #[serde(default = "default_shop_tagline")]
    pub tagline: String,
    /// IANA timezone that defines a business day.
    #[serde(default = "default_shop_timezone")]
    pub timezone: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            name: default_shop_name(),
            tagline: default_shop_tagline(),
            timezone: default_shop_timezone(),
        }
    }
}

fn default_shop_name() -> String {
    "GREEN NURSERY".to_string()
}

fn default_shop_tagline() -> String {
    "Plants | Pots | Gardening Tools".to_string()
}

fn default_shop_timezone() -> String {
    "UTC".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `NURSERY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("NURSERY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
