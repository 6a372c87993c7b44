//! Command Line Interface (CLI) arguments.

use clap::Parser;
use url::Url;

/// quakeviz command line interface
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "QUAKEVIZ_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 3000, env = "PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "QUAKEVIZ_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/quakeviz/certs/cert.pem",
        env = "QUAKEVIZ_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/quakeviz/certs/key.pem",
        env = "QUAKEVIZ_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for requests to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "QUAKEVIZ_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// PostgreSQL connection URL. The built-in sample dataset is served when not set.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<Url>,
    /// Maximum number of pooled database connections
    #[arg(long, default_value_t = 10, env = "QUAKEVIZ_DB_MAX_CONNECTIONS")]
    pub db_max_connections: u32,
    /// Maximum time in seconds to wait for a pooled database connection
    #[arg(long, default_value_t = 5, env = "QUAKEVIZ_DB_ACQUIRE_TIMEOUT")]
    pub db_acquire_timeout: u64,
    /// Time in seconds for which distributions are cached. Zero disables caching.
    #[arg(long, default_value_t = 0, env = "QUAKEVIZ_CACHE_TTL")]
    pub cache_ttl: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "QUAKEVIZ_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
}

impl CommandLineArgs {
    /// Returns the database URL with any password masked, suitable for logging.
    pub fn redacted_database_url(&self) -> Option<String> {
        self.database_url.as_ref().map(|url| {
            let mut url = url.clone();
            if url.password().is_some() {
                // Only fails for URLs that cannot have a password.
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        })
    }
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
