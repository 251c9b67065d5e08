//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and tempfile output
//! directories to test the full crawl cycle end-to-end.

use site_harvest::config::Config;
use site_harvest::output::ChannelProgress;
use site_harvest::{CrawlError, CrawlEvent, Crawler, EngineState};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILLER: &str = "Plenty of readable text so that the page clears the minimum length \
                      filter and is written to the output directory as markdown.";

/// Builds an HTML page with one long paragraph and the given links
fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{0}</title></head><body><h1>{0}</h1><p>{1}</p>{2}</body></html>",
        title, FILLER, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// Creates a test configuration rooted at the mock server, writing into `out`
fn create_test_config(server: &MockServer, out: &Path, max_pages: usize) -> Config {
    let mut config = Config::for_root(server.uri());
    config.crawler.max_pages = max_pages;
    config.crawler.concurrency = 2;
    config.crawler.request_timeout_secs = 1;
    config.output.directory = Some(out.display().to_string());
    config
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_single_page_budget() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", &["/a", "/b"])).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (progress, mut events) = ChannelProgress::channel();
    let crawler = Crawler::new(create_test_config(&server, temp.path(), 1))
        .unwrap()
        .with_progress(Arc::new(progress));

    let report = crawler.run().await.unwrap();

    assert_eq!(report.pages_saved(), 1);
    assert_eq!(report.discovered.len(), 1);
    assert_eq!(report.engine_state, EngineState::Terminated);
    assert_eq!(files_in(temp.path()), vec!["index.md"]);

    let text = fs::read_to_string(temp.path().join("index.md")).unwrap();
    assert!(text.starts_with("# Home"));
    assert!(text.contains("Plenty of readable text"));

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(last, Some(CrawlEvent::CrawlComplete { pages: 1 }));
}

#[tokio::test]
async fn test_only_in_scope_links_followed() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        page("Home", &["/a", "https://other.com/b", "/blog/c"]),
    )
    .await;
    mount_page(&server, "/a", page("A", &["/"])).await;
    Mock::given(method("GET"))
        .and(path("/blog/c"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, temp.path(), 10);
    config.exclude = vec!["blog".to_string()];
    let report = Crawler::new(config).unwrap().run().await.unwrap();

    let root = format!("{}/", server.uri());
    assert_eq!(report.discovered, vec![root.clone(), format!("{}a", root)]);
    assert_eq!(report.statistics.links_out_of_domain, 1);
    assert_eq!(report.statistics.links_excluded, 1);
    assert_eq!(files_in(temp.path()), vec!["a.md", "index.md"]);
}

#[tokio::test]
async fn test_timeout_reported_and_crawl_continues() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", &["/broken", "/c"])).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(page("Slow", &[]), "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/c", page("C", &[])).await;

    let report = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_saved(), 2);
    assert_eq!(report.statistics.pages_failed, 1);
    assert!(report.failures[0].url.ends_with("/broken"));
    assert!(report.failures[0].reason.contains("timed out"));
    assert_eq!(files_in(temp.path()), vec!["c.md", "index.md"]);
}

#[tokio::test]
async fn test_trailing_slash_deduplicated_by_default() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/docs", "/docs/"])).await;
    mount_page(&server, "/docs", page("Docs", &[])).await;
    mount_page(&server, "/docs/", page("Docs", &[])).await;

    let temp = TempDir::new().unwrap();
    let report = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.discovered.len(), 2);

    let temp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, temp.path(), 10);
    config.normalize.trim_trailing_slash = false;
    let report = Crawler::new(config).unwrap().run().await.unwrap();
    assert_eq!(report.discovered.len(), 3);
    // Both variants map to the same stem, so the second gets a suffix
    assert_eq!(files_in(temp.path()), vec!["docs.md", "docs_1.md", "index.md"]);
}

#[tokio::test]
async fn test_query_strings_distinct_unless_stripped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("Home", &["/list?x=1", "/list?x=2"])).await;
    mount_page(&server, "/list", page("List", &[])).await;

    let temp = TempDir::new().unwrap();
    let report = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.discovered.len(), 3);

    let temp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, temp.path(), 10);
    config.normalize.strip_query = true;
    let report = Crawler::new(config).unwrap().run().await.unwrap();
    assert_eq!(report.discovered.len(), 2);
}

#[tokio::test]
async fn test_filenames_unique_and_previous_runs_kept() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("index.md"), "from an earlier run").unwrap();

    mount_page(&server, "/", page("Home", &["/a/b", "/a_b"])).await;
    mount_page(&server, "/a/b", page("AB", &[])).await;
    mount_page(&server, "/a_b", page("A_B", &[])).await;

    let mut config = create_test_config(&server, temp.path(), 10);
    config.crawler.concurrency = 1;
    let report = Crawler::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.pages_saved(), 3);
    assert_eq!(
        files_in(temp.path()),
        vec!["a_b.md", "a_b_1.md", "index.md", "index_1.md"]
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("index.md")).unwrap(),
        "from an earlier run"
    );
    assert_eq!(
        report.filename_for(&format!("{}/", server.uri())),
        Some("index_1.md")
    );
}

#[tokio::test]
async fn test_root_redirect_to_other_host_followed() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let moved = format!("http://localhost:{}/home", server.address().port());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", moved.as_str()))
        .mount(&server)
        .await;
    mount_page(&server, "/home", page("Home", &["/a", "/b", "/home"])).await;
    mount_page(&server, "/a", page("A", &[])).await;
    mount_page(&server, "/b", page("B", &[])).await;

    let report = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_saved(), 3);
    assert_eq!(report.statistics.links_out_of_domain, 0);
    assert_eq!(files_in(temp.path()), vec!["a.md", "b.md", "index.md"]);
}

#[tokio::test]
async fn test_non_html_pages_not_saved() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", &["/report.pdf"])).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let report = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.pages_saved(), 1);
    assert_eq!(report.statistics.pages_failed, 1);
    assert!(report.failures[0].reason.contains("application/pdf"));
}

#[tokio::test]
async fn test_root_unreachable_is_fatal() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = Crawler::new(create_test_config(&server, temp.path(), 10))
        .unwrap()
        .run()
        .await;

    match result {
        Err(CrawlError::RootUnreachable { reason, .. }) => assert!(reason.contains("503")),
        other => panic!("expected RootUnreachable, got {:?}", other.map(|r| r.pages_saved())),
    }
}

#[tokio::test]
async fn test_invalid_root_rejected_before_crawl() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::for_root("not a url");
    config.output.directory = Some(temp.path().display().to_string());

    let result = Crawler::new(config);
    assert!(matches!(result, Err(CrawlError::Config(_))));
}
