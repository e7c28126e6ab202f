use crate::auth::JwtConfig;
use crate::core::ServerError;

/// Server configuration
///
/// # Environment variables
///
/// Every value can be overridden from the environment (a `.env` file is
/// loaded first by `main`):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 5000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | DATABASE_URL | unset | PostgreSQL URL, unset selects the in-memory store |
/// | DATABASE_MAX_CONNECTIONS | 10 | pool size |
/// | SCORING_WINDOW_DAYS | 30 | default trailing window for seller performance |
/// | LATE_SHIPMENT_DAYS | 3 | shipments slower than this count as late |
/// | LOG_LEVEL | info | tracing filter |
/// | LOG_JSON | false | emit JSON log lines |
/// | LOG_DIR | unset | directory for daily rolling log files |
/// | CORS_ORIGINS | http://localhost:5173,http://localhost:3000 | comma separated origins |
///
/// JWT settings are read by [`JwtConfig::from_env`].
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=postgres://localhost/market HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub scoring_window_days: u32,
    pub late_shipment_days: i64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            jwt: JwtConfig::from_env(),
            scoring_window_days: std::env::var("SCORING_WINDOW_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(30),
            late_shipment_days: std::env::var("LATE_SHIPMENT_DAYS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|days| *days >= 0)
                .unwrap_or(3),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:5173".to_string(),
                        "http://localhost:3000".to_string(),
                    ]
                }),
        }
    }

    /// Configuration for tests and local tooling: in-memory store, fixed secret
    pub fn for_tests() -> Self {
        Self {
            http_port: 0,
            environment: "development".into(),
            database_url: None,
            database_max_connections: 1,
            jwt: JwtConfig::with_secret("test-secret-for-market-server-0123456789"),
            scoring_window_days: 30,
            late_shipment_days: 3,
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
            cors_origins: Vec::new(),
        }
    }

    /// Reject settings that are only acceptable on a developer machine
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.is_development() {
            return Ok(());
        }
        if !self.jwt.has_production_secret() {
            return Err(ServerError::Config(
                "JWT_SECRET must be set (at least 32 characters) outside development".into(),
            ));
        }
        if self.is_production() && self.database_url.is_none() {
            return Err(ServerError::Config(
                "DATABASE_URL must be set in production".into(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
