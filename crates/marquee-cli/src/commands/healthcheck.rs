use clap::Parser;
use marquee_types::config::BackendConfig;
use serde_json::json;

use crate::{
    commands::{open_pool, Executor},
    output::print_json,
};

#[derive(Parser, Debug)]
pub struct HealthcheckCmd {
    #[command(flatten)]
    backend: BackendConfig,
}

impl Executor for HealthcheckCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_pool(&self.backend).await?;
        marquee_dal::ping(&pool, marquee_dal::CONNECT_TIMEOUT).await?;
        print_json(&json!({
            "status": "available",
            "system_info": {
                "environment": self.backend.env.as_str(),
                "version": env!("CARGO_PKG_VERSION"),
            }
        }))
    }
}
