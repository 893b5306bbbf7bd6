use clap::Parser;
use marquee_dal::{
    filters::{DEFAULT_PAGE_SIZE, MOVIE_SORT_SAFELIST},
    Filters, Metadata,
};
use marquee_types::config::BackendConfig;
use serde_json::json;

use crate::{
    commands::{open_repository, Executor},
    output::print_json,
};

#[derive(Parser, Debug)]
pub struct ListCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, default_value = "", help = "Words that must all appear in the title")]
    title: String,
    #[arg(short, long, num_args = 0.., value_delimiter = ',',
        help = "Genres the movie must have, comma separated or used multiple times")]
    genres: Vec<String>,
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true, help = "Page number, starting at 1")]
    page: i64,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true, help = "Movies per page, at most 100")]
    page_size: i64,
    #[arg(
        short,
        long,
        default_value = "id",
        allow_hyphen_values = true,
        help = "Sort by id, title, year or runtime, prefix with - for descending order"
    )]
    sort: String,
}

impl Executor for ListCmd {
    async fn run(self) -> anyhow::Result<()> {
        let filters = Filters::new(self.page, self.page_size, self.sort, MOVIE_SORT_SAFELIST);
        let params = filters.listing_params()?;

        let repository = open_repository(&self.backend).await?;
        let batch = repository.list(&self.title, &self.genres, &params).await?;
        let metadata = Metadata::calculate(batch.total, self.page, self.page_size);

        print_json(&json!({ "movies": batch.rows, "metadata": metadata }))
    }
}
