use clap::Parser;
use marquee_cli::{
    config::CliConfig,
    output::{error_body, error_kind},
    run::run,
};
use marquee_dal::{movie::MovieRepository, ErrorKind};
use marquee_types::{config::PoolConfig, Runtime};
use tempfile::TempDir;
use tracing_test::traced_test;

struct TestDb {
    _dir: TempDir,
    url: String,
}

impl TestDb {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("movies.db").display());
        TestDb { _dir: dir, url }
    }

    async fn exec(&self, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["marquee", args[0], "--database-url", self.url.as_str()];
        argv.extend_from_slice(&args[1..]);
        let config = CliConfig::try_parse_from(argv)?;
        run(config).await
    }

    async fn repository(&self) -> MovieRepository {
        let pool = marquee_dal::new_pool(&PoolConfig::new(&self.url))
            .await
            .unwrap();
        MovieRepository::new(pool)
    }
}

#[tokio::test]
#[traced_test]
async fn test_create_show_update_delete() {
    let db = TestDb::new();
    db.exec(&[
        "create",
        "--title",
        "Moana",
        "--year",
        "2016",
        "--runtime",
        "107 mins",
        "--genres",
        "animation,adventure",
    ])
    .await
    .unwrap();

    let repo = db.repository().await;
    let movie = repo.get(1).await.unwrap();
    assert_eq!("Moana", movie.title);
    assert_eq!(Runtime::new(107), movie.runtime);
    assert_eq!(vec!["animation", "adventure"], movie.genres);
    assert_eq!(1, movie.version);

    db.exec(&["show", "1"]).await.unwrap();

    db.exec(&["update", "1", "--runtime", "108", "--expected-version", "1"])
        .await
        .unwrap();
    let movie = repo.get(1).await.unwrap();
    assert_eq!(Runtime::new(108), movie.runtime);
    assert_eq!("Moana", movie.title);
    assert_eq!(2, movie.version);

    let err = db
        .exec(&["update", "1", "--year", "2017", "--expected-version", "1"])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::EditConflict, error_kind(&err));
    assert_eq!(2016, repo.get(1).await.unwrap().year);

    db.exec(&["delete", "1"]).await.unwrap();
    let err = db.exec(&["show", "1"]).await.unwrap_err();
    assert_eq!(ErrorKind::RecordNotFound, error_kind(&err));
    let err = db.exec(&["delete", "1"]).await.unwrap_err();
    assert_eq!(ErrorKind::RecordNotFound, error_kind(&err));
}

#[tokio::test]
#[traced_test]
async fn test_create_reports_all_invalid_fields() {
    let db = TestDb::new();
    let err = db
        .exec(&["create", "--title", "", "--runtime", "-1", "--genres", "drama,drama"])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::ValidationFailure, error_kind(&err));
    let body = error_body(&err);
    assert_eq!("must be provided", body["error"]["title"]);
    assert_eq!("must be provided", body["error"]["year"]);
    assert_eq!("must be a positive integer", body["error"]["runtime"]);
    assert_eq!("must not contain duplicate values", body["error"]["genres"]);
}

#[tokio::test]
#[traced_test]
async fn test_update_validates_merged_movie() {
    let db = TestDb::new();
    db.exec(&[
        "create", "--title", "Heat", "--year", "1995", "--runtime", "170", "--genres", "crime",
    ])
    .await
    .unwrap();

    let err = db
        .exec(&["update", "1", "--genres", "a,b,c,d,e,f"])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::ValidationFailure, error_kind(&err));
    assert_eq!(1, db.repository().await.get(1).await.unwrap().version);
}

#[tokio::test]
#[traced_test]
async fn test_invalid_ids() {
    let db = TestDb::new();
    for id in ["0", "-3"] {
        let err = db.exec(&["show", id]).await.unwrap_err();
        assert_eq!(ErrorKind::RecordNotFound, error_kind(&err));
    }
}

#[tokio::test]
#[traced_test]
async fn test_list() {
    let db = TestDb::new();
    for (title, year) in [("Alien", "1979"), ("Aliens", "1986"), ("Heat", "1995")] {
        db.exec(&[
            "create", "--title", title, "--year", year, "--runtime", "120", "--genres", "thriller",
        ])
        .await
        .unwrap();
    }

    db.exec(&["list", "--title", "alien", "--sort", "-year"])
        .await
        .unwrap();
    db.exec(&["list", "--page", "5", "--page-size", "2"])
        .await
        .unwrap();

    let err = db
        .exec(&["list", "--sort", "title; DROP TABLE movies"])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::ValidationFailure, error_kind(&err));
    assert_eq!("invalid sort value", error_body(&err)["error"]["sort"]);

    let err = db.exec(&["list", "--page-size", "101"]).await.unwrap_err();
    assert_eq!(ErrorKind::ValidationFailure, error_kind(&err));

    let batch = db
        .repository()
        .await
        .list("", &[], &Default::default())
        .await
        .unwrap();
    assert_eq!(3, batch.total);
}

#[tokio::test]
#[traced_test]
async fn test_healthcheck() {
    let db = TestDb::new();
    db.exec(&["healthcheck", "--env", "staging"]).await.unwrap();
}
