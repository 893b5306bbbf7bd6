use clap::Parser;
use marquee_dal::{
    movie::{validate_movie, MovieInput},
    Error,
};
use marquee_types::{config::BackendConfig, Runtime, Validator};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    commands::{open_repository, parse_runtime, Executor},
    output::print_json,
};

/// Partial update, only the given fields change.
#[derive(Parser, Debug)]
pub struct UpdateCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(allow_negative_numbers = true, help = "Movie id")]
    id: i64,
    #[arg(short, long, help = "New title")]
    title: Option<String>,
    #[arg(short, long, help = "New release year")]
    year: Option<i32>,
    #[arg(short, long, allow_negative_numbers = true, value_parser = parse_runtime, help = "New running time in minutes")]
    runtime: Option<Runtime>,
    #[arg(short, long, num_args = 0.., value_delimiter = ',',
        help = "New genres, replace the current ones, comma separated or used multiple times")]
    genres: Option<Vec<String>>,
    #[arg(
        long,
        help = "Fail with an edit conflict unless the stored version equals this one"
    )]
    expected_version: Option<i32>,
}

impl Executor for UpdateCmd {
    async fn run(self) -> anyhow::Result<()> {
        let repository = open_repository(&self.backend).await?;
        let mut movie = repository.get(self.id).await?;

        if let Some(expected) = self.expected_version {
            if expected != movie.version {
                debug!(
                    "Movie {} is at version {}, expected {expected}",
                    movie.id, movie.version
                );
                return Err(Error::EditConflict {
                    id: movie.id,
                    version: expected,
                }
                .into());
            }
        }

        let input = MovieInput {
            title: self.title,
            year: self.year,
            runtime: self.runtime,
            genres: self.genres,
        };
        input.merge_into(&mut movie);

        let mut v = Validator::new();
        validate_movie(&mut v, &movie);
        v.finish()?;

        repository.update(&mut movie).await?;
        info!("Updated movie {} to version {}", movie.id, movie.version);

        print_json(&json!({ "movie": movie }))
    }
}
