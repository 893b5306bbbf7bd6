use clap::Parser;
use marquee_types::config::BackendConfig;
use serde_json::json;

use crate::{
    commands::{open_repository, Executor},
    output::print_json,
};

#[derive(Parser, Debug)]
pub struct ShowCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(allow_negative_numbers = true, help = "Movie id")]
    id: i64,
}

impl Executor for ShowCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = open_repository(&self.backend).await?;
        let movie = repository.get(self.id).await?;
        print_json(&json!({ "movie": movie }))
    }
}
