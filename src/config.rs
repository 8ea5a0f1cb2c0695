use clap::{Args, Parser, ValueEnum};
use ipnetwork::IpNetwork;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub email: EmailConfig,

    #[command(flatten)]
    pub event: EventConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "RSVP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "RSVP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Comma-separated list of CIDRs to trust for X-Forwarded-For IP extraction
    #[arg(
        long,
        env = "RSVP_TRUSTED_PROXIES",
        default_value = "10.0.0.0/8,172.16.0.0/12,192.168.0.0/16,127.0.0.1/32",
        value_delimiter = ','
    )]
    pub trusted_proxies: Vec<IpNetwork>,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[arg(long, env = "RSVP_DATABASE_URL")]
    pub url: String,

    /// Maximum number of pooled connections
    #[arg(long, env = "RSVP_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Minimum number of pooled connections kept open
    #[arg(long, env = "RSVP_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool
    #[arg(long, env = "RSVP_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Timeout for the readiness probe's connectivity check
    #[arg(long, env = "RSVP_DB_HEALTH_TIMEOUT_MS", default_value_t = 2000)]
    pub health_timeout_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Maximum submissions per email address within the trailing window
    #[arg(long, env = "RSVP_RATE_LIMIT_PER_EMAIL", default_value_t = 10)]
    pub max_per_email: i64,

    /// Maximum submissions per origin address within the trailing window
    #[arg(long, env = "RSVP_RATE_LIMIT_PER_ORIGIN", default_value_t = 10)]
    pub max_per_origin: i64,

    /// Length of the trailing rate-limit window in seconds
    #[arg(long, env = "RSVP_RATE_LIMIT_WINDOW_SECS", default_value_t = 3600)]
    pub window_secs: i64,
}

#[derive(Clone, Debug, Args)]
pub struct EmailConfig {
    /// API key for the email delivery provider
    #[arg(long, env = "RSVP_EMAIL_API_KEY")]
    pub api_key: String,

    /// Sender address for all outgoing mail
    #[arg(long, env = "RSVP_EMAIL_FROM")]
    pub from: String,

    /// Comma-separated list of administrator recipient addresses
    #[arg(long, env = "RSVP_EMAIL_ADMIN", value_delimiter = ',')]
    pub admin_recipients: Vec<String>,

    /// Base URL of the delivery provider API
    #[arg(long, env = "RSVP_EMAIL_API_BASE_URL", default_value = "https://api.resend.com")]
    pub api_base_url: String,

    /// Per-attempt delivery timeout in seconds
    #[arg(long, env = "RSVP_EMAIL_SEND_TIMEOUT_SECS", default_value_t = 10)]
    pub send_timeout_secs: u64,

    /// Maximum delivery attempts for the guest confirmation channel
    #[arg(long, env = "RSVP_EMAIL_GUEST_MAX_ATTEMPTS", default_value_t = 3)]
    pub guest_max_attempts: u32,

    /// Base backoff delay for the guest channel in milliseconds
    #[arg(long, env = "RSVP_EMAIL_GUEST_RETRY_BASE_MS", default_value_t = 1000)]
    pub guest_retry_base_ms: u64,

    /// Maximum delivery attempts for the admin notification channel
    #[arg(long, env = "RSVP_EMAIL_ADMIN_MAX_ATTEMPTS", default_value_t = 2)]
    pub admin_max_attempts: u32,

    /// Base backoff delay for the admin channel in milliseconds
    #[arg(long, env = "RSVP_EMAIL_ADMIN_RETRY_BASE_MS", default_value_t = 500)]
    pub admin_retry_base_ms: u64,
}

#[derive(Clone, Debug, Args)]
pub struct EventConfig {
    /// Human-readable wedding date shown in emails
    #[arg(long, env = "RSVP_EVENT_DATE", default_value = "September 20, 2025")]
    pub wedding_date: String,

    /// Venue name shown in emails
    #[arg(long, env = "RSVP_EVENT_VENUE", default_value = "Loft Diplomat")]
    pub venue_name: String,

    /// Venue address shown in emails
    #[arg(long, env = "RSVP_EVENT_VENUE_ADDRESS", default_value = "Bucharest, Romania")]
    pub venue_address: String,

    /// Couple names shown in email headers and signatures
    #[arg(long, env = "RSVP_EVENT_COUPLE_NAMES", default_value = "Dana & Thomas")]
    pub couple_names: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP endpoint for traces and metrics; telemetry export is disabled when unset
    #[arg(long, env = "RSVP_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "RSVP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}
