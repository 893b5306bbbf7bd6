pub mod error;
pub mod filters;
pub mod movie;

use std::{fmt::Display, future::Future, str::FromStr as _, time::Duration};

pub use error::{Error, ErrorKind};
pub use filters::{Filters, Metadata, SortColumn};
use marquee_types::config::PoolConfig;
pub use sqlx::Error as SqlxError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type ChosenRow = sqlx::sqlite::SqliteRow;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn new_pool(config: &PoolConfig) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = with_timeout(
        CONNECT_TIMEOUT,
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .connect_with(options),
    )
    .await?;
    info!(
        "Database connection pool established, max connections {}",
        config.max_connections
    );
    Ok(pool)
}

pub async fn migrate(pool: &Pool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &Pool, timeout: Duration) -> Result<()> {
    with_timeout(timeout, sqlx::query("SELECT 1").execute(pool)).await?;
    Ok(())
}

/// Bounds a database call by `timeout`; the future is dropped when the deadline passes.
pub(crate) async fn with_timeout<T, E, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    Error: From<E>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res.map_err(Error::from),
        Err(_) => {
            error!("Database operation exceeded deadline of {timeout:?}");
            Err(Error::Timeout(timeout))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc(SortColumn),
    Desc(SortColumn),
}

impl Order {
    pub fn column(&self) -> SortColumn {
        match self {
            Order::Asc(c) | Order::Desc(c) => *c,
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::Asc(SortColumn::Id)
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc(c) => write!(f, "{} ASC", c.as_ref()),
            Order::Desc(c) => write!(f, "{} DESC", c.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
    pub order: Order,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
            order: Order::default(),
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            order: Order::default(),
        }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// `ORDER BY` clause built only from fixed column identifiers, ties broken by ascending id.
    pub fn ordering(&self) -> String {
        match self.order.column() {
            SortColumn::Id => format!("ORDER BY {}", self.order),
            _ => format!("ORDER BY {}, {} ASC", self.order, SortColumn::Id.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub offset: i64,
    pub limit: i64,
    pub rows: Vec<T>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        let params = ListingParams::new(0, 20);
        assert_eq!("ORDER BY id ASC", params.ordering());

        let params = ListingParams::new(20, 20).with_order(Order::Desc(SortColumn::Year));
        assert_eq!("ORDER BY year DESC, id ASC", params.ordering());

        let params = ListingParams::default().with_order(Order::Desc(SortColumn::Id));
        assert_eq!("ORDER BY id DESC", params.ordering());
    }
}
