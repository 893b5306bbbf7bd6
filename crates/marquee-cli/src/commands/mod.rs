use marquee_dal::movie::MovieRepository;
use marquee_types::{config::BackendConfig, Runtime};
use tracing::debug;

pub mod create;
pub mod delete;
pub mod healthcheck;
pub mod list;
pub mod show;
pub mod update;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

pub(crate) async fn open_pool(backend: &BackendConfig) -> anyhow::Result<marquee_dal::Pool> {
    if backend.uses_data_dir() {
        let data_dir = backend.data_dir();
        if !data_dir.exists() {
            debug!("Creating data directory {data_dir:?}");
            tokio::fs::create_dir_all(&data_dir).await?;
        }
    }
    let pool = marquee_dal::new_pool(&backend.pool_config()).await?;
    marquee_dal::migrate(&pool).await?;
    Ok(pool)
}

pub(crate) async fn open_repository(backend: &BackendConfig) -> anyhow::Result<MovieRepository> {
    let pool = open_pool(backend).await?;
    Ok(MovieRepository::new(pool).with_timeout(backend.db_query_timeout))
}

/// Accepts both bare minutes (`102`) and the display form (`102 mins`).
pub(crate) fn parse_runtime(s: &str) -> Result<Runtime, String> {
    let s = s.trim();
    if let Ok(minutes) = s.parse::<i32>() {
        return Ok(Runtime::new(minutes));
    }
    s.parse::<Runtime>().map_err(|e| e.to_string())
}
