use std::time::Duration;

use futures::{StreamExt as _, TryStreamExt as _};
use marquee_types::{
    config::DEFAULT_QUERY_TIMEOUT,
    validator::{unique, Validator},
    Runtime, ValidationErrors,
};
use serde::{Deserialize, Serialize};
use sqlx::{Acquire as _, Row as _};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    error::{Error, Result},
    filters::Filters,
    with_timeout, Batch, ChosenDB, ChosenRow, ListingParams, Pool, MAX_LIMIT,
};

pub const MAX_TITLE_BYTES: usize = 500;
pub const MIN_YEAR: i32 = 1888;
pub const MAX_GENRES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(
        with = "time::serde::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<OffsetDateTime>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// New unsaved movie, id, creation time and version are assigned on insert.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        runtime: Runtime,
        genres: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Movie {
            id: 0,
            created_at: None,
            title: title.into(),
            year,
            runtime,
            genres: genres.into_iter().map(Into::into).collect(),
            version: 0,
        }
    }
}

impl sqlx::FromRow<'_, ChosenRow> for Movie {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let genres: String = row.try_get("genres")?;
        let genres = serde_json::from_str(&genres).map_err(|e| sqlx::Error::ColumnDecode {
            index: "genres".to_string(),
            source: Box::new(e),
        })?;
        Ok(Movie {
            id: row.try_get("id")?,
            created_at: Some(row.try_get("created_at")?),
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            runtime: Runtime::new(row.try_get("runtime")?),
            genres,
            version: row.try_get("version")?,
        })
    }
}

/// Candidate movie as submitted by a client, absent fields stay `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieInput {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl MovieInput {
    pub fn validate_into(&self, v: &mut Validator) {
        check_title(v, self.title.as_deref().unwrap_or_default());
        check_year(v, self.year.unwrap_or_default());
        check_runtime(v, self.runtime.unwrap_or_default());
        check_genres(v, self.genres.as_deref());
    }

    /// Validated conversion into an unsaved movie.
    pub fn into_movie(self) -> Result<Movie, ValidationErrors> {
        let mut v = Validator::new();
        self.validate_into(&mut v);
        v.finish()?;
        Ok(Movie::new(
            self.title.unwrap_or_default(),
            self.year.unwrap_or_default(),
            self.runtime.unwrap_or_default(),
            self.genres.unwrap_or_default(),
        ))
    }

    /// Overlays the present fields onto a previously fetched movie.
    pub fn merge_into(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
    }
}

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    check_title(v, &movie.title);
    check_year(v, movie.year);
    check_runtime(v, movie.runtime);
    check_genres(v, Some(&movie.genres));
}

fn check_title(v: &mut Validator, title: &str) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );
}

fn check_year(v: &mut Validator, year: i32) {
    v.check(year != 0, "year", "must be provided");
    v.check(year >= MIN_YEAR, "year", "must be greater than 1888");
    // evaluated on every call, so the bound moves with the calendar
    v.check(
        year <= OffsetDateTime::now_utc().year(),
        "year",
        "must not be in the future",
    );
}

fn check_runtime(v: &mut Validator, runtime: Runtime) {
    v.check(runtime.minutes() != 0, "runtime", "must be provided");
    v.check(runtime.minutes() > 0, "runtime", "must be a positive integer");
}

fn check_genres(v: &mut Validator, genres: Option<&[String]>) {
    v.check(genres.is_some(), "genres", "must be provided");
    let genres = genres.unwrap_or_default();
    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}

const SELECT_FIELDS: &str = "id, created_at, title, year, runtime, genres, version";
const TITLE_CONDITION: &str = "id IN (SELECT rowid FROM movies_fts WHERE movies_fts MATCH ?)";
const GENRES_CONDITION: &str = "NOT EXISTS (SELECT 1 FROM json_each(?) AS wanted \
     WHERE wanted.value NOT IN (SELECT value FROM json_each(movies.genres)))";

/// Full text expression requiring every word of the phrase, `None` for a phrase without words.
fn title_match_expression(phrase: &str) -> Option<String> {
    let terms = phrase
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(|term| format!("\"{term}\""))
        .collect::<Vec<_>>();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}

pub type MovieRepository = MovieRepositoryImpl<Pool>;

#[derive(Clone)]
pub struct MovieRepositoryImpl<E> {
    executor: E,
    timeout: Duration,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E:
        sqlx::Executor<'c, Database = ChosenDB> + sqlx::Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn insert(&self, movie: &mut Movie) -> Result<()> {
        let genres = serde_json::to_string(&movie.genres)?;
        let (id, created_at, version): (i64, OffsetDateTime, i32) = with_timeout(
            self.timeout,
            sqlx::query_as(
                "INSERT INTO movies (title, year, runtime, genres) VALUES (?, ?, ?, ?) \
                 RETURNING id, created_at, version",
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&genres)
            .fetch_one(&self.executor),
        )
        .await?;

        movie.id = id;
        movie.created_at = Some(created_at);
        movie.version = version;
        debug!("Inserted movie {id}");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        if id < 1 {
            debug!("Invalid movie id {id}");
            return Err(Error::RecordNotFound(format!("Movie {id}")));
        }
        let sql = format!("SELECT {SELECT_FIELDS} FROM movies WHERE id = ?");
        let record = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Movie>(&sql)
                .bind(id)
                .fetch_optional(&self.executor),
        )
        .await?;

        record.ok_or_else(|| {
            debug!("Movie {id} not found");
            Error::RecordNotFound(format!("Movie {id}"))
        })
    }

    /// Replaces the stored movie if it is still at `movie.version`, then bumps the version.
    pub async fn update(&self, movie: &mut Movie) -> Result<()> {
        let genres = serde_json::to_string(&movie.genres)?;
        let new_version: Option<i32> = with_timeout(
            self.timeout,
            sqlx::query_scalar(
                "UPDATE movies SET title = ?, year = ?, runtime = ?, genres = ?, version = version + 1 \
                 WHERE id = ? AND version = ? RETURNING version",
            )
            .bind(&movie.title)
            .bind(movie.year)
            .bind(movie.runtime.minutes())
            .bind(&genres)
            .bind(movie.id)
            .bind(movie.version)
            .fetch_optional(&self.executor),
        )
        .await?;

        match new_version {
            Some(version) => {
                movie.version = version;
                Ok(())
            }
            None => {
                debug!(
                    "Update of movie {} at version {} matched no row",
                    movie.id, movie.version
                );
                Err(Error::EditConflict {
                    id: movie.id,
                    version: movie.version,
                })
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            debug!("Invalid movie id {id}");
            return Err(Error::RecordNotFound(format!("Movie {id}")));
        }
        let res = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM movies WHERE id = ?")
                .bind(id)
                .execute(&self.executor),
        )
        .await?;

        if res.rows_affected() == 0 {
            debug!("Movie {id} not found for delete");
            Err(Error::RecordNotFound(format!("Movie {id}")))
        } else {
            Ok(())
        }
    }

    /// Validates `filters` and lists one page of matching movies.
    pub async fn list_filtered(
        &self,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<Batch<Movie>> {
        let params = filters.listing_params()?;
        self.list(title, genres, &params).await
    }

    /// Lists one page of movies whose title contains every word of `title`
    /// and whose genres include all of `genres`, with the total match count.
    pub async fn list(
        &self,
        title: &str,
        genres: &[String],
        params: &ListingParams,
    ) -> Result<Batch<Movie>> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(expr) = title_match_expression(title) {
            conditions.push(TITLE_CONDITION);
            values.push(expr);
        }
        if !genres.is_empty() {
            conditions.push(GENRES_CONDITION);
            values.push(serde_json::to_string(genres)?);
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT count(*) FROM movies {where_clause}");
        let select_sql = format!(
            "SELECT {SELECT_FIELDS} FROM movies {where_clause} {order} LIMIT ? OFFSET ?",
            order = params.ordering()
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Movie>(&select_sql);
        for value in &values {
            count_query = count_query.bind(value);
            select_query = select_query.bind(value);
        }
        let select_query = select_query.bind(params.limit).bind(params.offset);

        let (total, rows) = with_timeout(self.timeout, async {
            let mut transaction = self.executor.begin().await?;
            let total = count_query.fetch_one(&mut *transaction).await?;
            let rows = select_query
                .fetch(&mut *transaction)
                .take(MAX_LIMIT)
                .try_collect::<Vec<_>>()
                .await?;
            transaction.commit().await?;
            Ok::<_, sqlx::Error>((total, rows))
        })
        .await?;

        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            rows,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}
