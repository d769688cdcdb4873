use common::{Config, FailurePolicy};
use reader::{ArticleExtractor, Fetcher, Pipeline, ReaderError, ReadabilityExtractor};
use std::fs;
use std::path::{Path, PathBuf};

const SYNTHETIC_PAGE: &str =
    "<html><body><script>bad()</script><p>Hello   world</p></body></html>";

/// Hands back a fixed fragment whatever the page contains.
struct FixedExtractor(&'static str);

impl ArticleExtractor for FixedExtractor {
    fn extract(&self, _document: &str, _page_url: &str) -> reader::error::Result<String> {
        Ok(self.0.to_string())
    }
}

struct Workspace {
    _dir: tempfile::TempDir,
    input: PathBuf,
    output: PathBuf,
}

fn workspace(urls: &[String]) -> Workspace {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("results.csv");
    let mut contents = urls.join("\n");
    contents.push('\n');
    fs::write(&input, contents).expect("write url list");
    Workspace { _dir: dir, input, output }
}

fn readability_pipeline() -> Pipeline {
    let fetcher = Fetcher::new(None, None).expect("build fetcher");
    Pipeline::new(fetcher, Box::new(ReadabilityExtractor))
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .expect("open results");
    reader
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_round_trip_two_urls() {
    let mut server = mockito::Server::new_async().await;
    for path in ["/a", "/b"] {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(SYNTHETIC_PAGE)
            .create_async()
            .await;
    }
    let urls = vec![format!("{}/a", server.url()), format!("{}/b", server.url())];
    let ws = workspace(&urls);

    let summary = readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect("run");

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.output_path, ws.output);

    let written = fs::read_to_string(&ws.output).expect("read results");
    assert_eq!(
        written,
        format!("{},Hello world\r\n{},Hello world\r\n", urls[0], urls[1])
    );
}

#[tokio::test]
async fn test_rows_follow_input_order() {
    let mut server = mockito::Server::new_async().await;
    let names = ["zulu", "alpha", "mike", "bravo"];
    for name in names {
        server
            .mock("GET", format!("/{}", name).as_str())
            .with_status(200)
            .with_body(format!("<html><body><p>page {}</p></body></html>", name))
            .create_async()
            .await;
    }
    let urls: Vec<String> = names
        .iter()
        .map(|n| format!("{}/{}", server.url(), n))
        .collect();
    let ws = workspace(&urls);

    readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect("run");

    let rows = read_rows(&ws.output);
    assert_eq!(rows.len(), names.len());
    for ((row, url), name) in rows.iter().zip(&urls).zip(names) {
        assert_eq!(row, &vec![url.clone(), format!("page {}", name)]);
    }
}

#[tokio::test]
async fn test_404_aborts_without_writing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/ok")
        .with_status(200)
        .with_body(SYNTHETIC_PAGE)
        .create_async()
        .await;
    server
        .mock("GET", "/gone")
        .with_status(404)
        .create_async()
        .await;
    let urls = vec![format!("{}/ok", server.url()), format!("{}/gone", server.url())];
    let ws = workspace(&urls);

    let err = readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect_err("404 must abort");

    assert!(matches!(err, ReaderError::Fetch { status: 404, .. }), "got {:?}", err);
    assert!(!ws.output.exists(), "no results file may be written");
}

#[tokio::test]
async fn test_failed_run_leaves_previous_results_untouched() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/down")
        .with_status(503)
        .create_async()
        .await;
    let ws = workspace(&[format!("{}/down", server.url())]);
    fs::write(&ws.output, "http://old.example/,stale\r\n").expect("seed results");

    let err = readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect_err("503 must abort");

    assert_eq!(err.status(), Some(503));
    assert_eq!(
        fs::read_to_string(&ws.output).expect("read results"),
        "http://old.example/,stale\r\n"
    );
}

#[tokio::test]
async fn test_blank_line_aborts_by_default() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/a")
        .with_status(200)
        .with_body(SYNTHETIC_PAGE)
        .create_async()
        .await;
    let ws = workspace(&[format!("{}/a", server.url()), String::new()]);

    let err = readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect_err("blank url cannot be fetched");

    assert_eq!(err.kind(), "network");
    assert!(!ws.output.exists());
}

#[tokio::test]
async fn test_blank_lines_skipped_when_configured() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/a")
        .with_status(200)
        .with_body(SYNTHETIC_PAGE)
        .create_async()
        .await;
    let url = format!("{}/a", server.url());
    let ws = workspace(&[String::new(), url.clone(), String::new()]);

    let summary = readability_pipeline()
        .with_skip_blank_lines(true)
        .run(&ws.input, &ws.output)
        .await
        .expect("run");

    assert_eq!(summary.rows_written, 1);
    assert_eq!(read_rows(&ws.output), vec![vec![url, "Hello world".to_string()]]);
}

#[tokio::test]
async fn test_empty_fragment_writes_empty_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/blank")
        .with_status(200)
        .with_body("<html><body></body></html>")
        .create_async()
        .await;
    let url = format!("{}/blank", server.url());
    let ws = workspace(&[url.clone()]);

    let fetcher = Fetcher::new(None, None).expect("build fetcher");
    Pipeline::new(fetcher, Box::new(FixedExtractor("")))
        .run(&ws.input, &ws.output)
        .await
        .expect("empty text is not an error");

    assert_eq!(
        fs::read_to_string(&ws.output).expect("read results"),
        format!("{},\r\n", url)
    );
}

#[tokio::test]
async fn test_record_policy_keeps_going() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/first")
        .with_status(200)
        .with_body(SYNTHETIC_PAGE)
        .create_async()
        .await;
    server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/last")
        .with_status(200)
        .with_body(SYNTHETIC_PAGE)
        .create_async()
        .await;
    let urls = vec![
        format!("{}/first", server.url()),
        format!("{}/missing", server.url()),
        format!("{}/last", server.url()),
    ];
    let ws = workspace(&urls);

    let summary = readability_pipeline()
        .with_policy(FailurePolicy::Record)
        .run(&ws.input, &ws.output)
        .await
        .expect("record policy never aborts on a url");

    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.failures, 1);

    let rows = read_rows(&ws.output);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec![urls[0].clone(), "Hello world".to_string(), String::new()]);
    assert_eq!(rows[1][0], urls[1]);
    assert_eq!(rows[1][1], "");
    assert!(rows[1][2].starts_with("fetch: "), "error column: {}", rows[1][2]);
    assert!(rows[1][2].contains("404"));
    assert_eq!(rows[2], vec![urls[2].clone(), "Hello world".to_string(), String::new()]);
}

#[tokio::test]
async fn test_extraction_error_aborts() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/empty")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;
    let ws = workspace(&[format!("{}/empty", server.url())]);

    let err = readability_pipeline()
        .run(&ws.input, &ws.output)
        .await
        .expect_err("empty page has no article");

    assert_eq!(err.kind(), "extraction");
    assert!(!ws.output.exists());
}

#[tokio::test]
async fn test_markup_error_aborts() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/binary")
        .with_status(200)
        .with_body("irrelevant")
        .create_async()
        .await;
    let ws = workspace(&[format!("{}/binary", server.url())]);

    let fetcher = Fetcher::new(None, None).expect("build fetcher");
    let err = Pipeline::new(fetcher, Box::new(FixedExtractor("<p>\u{1}\u{2}</p>")))
        .run(&ws.input, &ws.output)
        .await
        .expect_err("control characters are not markup");

    assert_eq!(err.kind(), "markup_parse");
    assert!(!ws.output.exists());
}

#[tokio::test]
async fn test_missing_url_list_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = readability_pipeline()
        .run(&dir.path().join("nope.txt"), &dir.path().join("results.csv"))
        .await
        .expect_err("missing input");

    assert_eq!(err.kind(), "io");
    assert!(err.to_string().contains("nope.txt"));
}

#[tokio::test]
async fn test_from_config_applies_pipeline_section() {
    let mut config = Config::default();
    config.fetch.timeout_seconds = Some(10);
    config.pipeline.on_error = FailurePolicy::Record;

    let pipeline = Pipeline::from_config(&config).expect("pipeline");
    assert_eq!(pipeline.policy(), FailurePolicy::Record);
}
