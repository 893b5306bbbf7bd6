use clap::Parser;
use marquee_dal::movie::MovieInput;
use marquee_types::{config::BackendConfig, Runtime};
use serde_json::json;
use tracing::info;

use crate::{
    commands::{open_repository, parse_runtime, Executor},
    output::print_json,
};

#[derive(Parser, Debug)]
pub struct CreateCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Movie title")]
    title: Option<String>,
    #[arg(short, long, help = "Release year")]
    year: Option<i32>,
    #[arg(short, long, allow_negative_numbers = true, value_parser = parse_runtime, help = "Running time in minutes, e.g. 102 or \"102 mins\"")]
    runtime: Option<Runtime>,
    #[arg(short, long, num_args = 0.., value_delimiter = ',',
        help = "Genres, comma separated or used multiple times")]
    genres: Option<Vec<String>>,
}

impl Executor for CreateCmd {
    async fn run(self) -> anyhow::Result<()> {
        let input = MovieInput {
            title: self.title,
            year: self.year,
            runtime: self.runtime,
            genres: self.genres,
        };
        let mut movie = input.into_movie()?;

        let repository = open_repository(&self.backend).await?;
        repository.insert(&mut movie).await?;
        info!("Created movie {}", movie.id);

        print_json(&json!({ "movie": movie }))
    }
}
