use clap::Parser;
use marquee_types::config::BackendConfig;
use serde_json::json;
use tracing::info;

use crate::{
    commands::{open_repository, Executor},
    output::print_json,
};

#[derive(Parser, Debug)]
pub struct DeleteCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(allow_negative_numbers = true, help = "Movie id")]
    id: i64,
}

impl Executor for DeleteCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = open_repository(&self.backend).await?;
        repository.delete(self.id).await?;
        info!("Deleted movie {}", self.id);
        print_json(&json!({ "message": "movie successfully deleted" }))
    }
}
