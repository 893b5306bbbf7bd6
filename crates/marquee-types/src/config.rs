use clap::Parser;
use serde::Serialize;
use std::{path::PathBuf, time::Duration};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "MARQUEE_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/marquee.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "MARQUEE_DATA_DIR",
        help = "Data directory for the database, default is system default like ~/.local/share/marquee",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "MARQUEE_DB_MAX_OPEN_CONNS",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        help = "Maximum number of open connections in the pool"
    )]
    pub db_max_open_conns: u32,

    #[arg(
        long,
        env = "MARQUEE_DB_MAX_IDLE_TIME",
        default_value = "15m",
        help = "Maximum time a connection may stay idle in the pool (e.g. 15m, 1h)",
        value_parser = humantime::parse_duration
    )]
    pub db_max_idle_time: Duration,

    #[arg(
        long,
        env = "MARQUEE_DB_QUERY_TIMEOUT",
        default_value = "3s",
        help = "Deadline for every single database operation",
        value_parser = humantime::parse_duration
    )]
    pub db_query_timeout: Duration,

    #[arg(
        long,
        value_enum,
        env = "MARQUEE_ENV",
        default_value_t = Environment::Development,
        help = "Environment the tool runs in"
    )]
    pub env: Environment,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("marquee"))
        .unwrap_or_else(|| PathBuf::from("marquee"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// True when the database lives in the data directory rather than at an explicit URL.
    pub fn uses_data_dir(&self) -> bool {
        self.database_url.is_none()
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/marquee.db", self.data_dir))
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            database_url: self.database_url(),
            max_connections: self.db_max_open_conns,
            idle_timeout: Some(self.db_max_idle_time),
            query_timeout: self.db_query_timeout,
        }
    }
}

/// Connection pool settings, independent of where they were read from.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub idle_timeout: Option<Duration>,
    pub query_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        PoolConfig {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}
