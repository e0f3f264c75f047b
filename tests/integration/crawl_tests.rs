//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the dictionary site and run the
//! full discover -> fetch -> normalize -> merge cycle end-to-end.

use lexicon_ripple::config::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use lexicon_ripple::crawler::{run_crawl, CrawlOptions, Coordinator};
use lexicon_ripple::storage::{title_hash, EntryStore, JsonStore, TitleIndex};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at a temporary directory
fn create_test_config(base_url: &str, dir: &Path, workers: usize, paradigms: bool) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "browse_latin.php".to_string(),
            page_param: "p1".to_string(),
            pages: vec!["a".to_string()],
            subset: None,
            subset_param: "p2".to_string(),
            item_marker: "definition.php".to_string(),
            paradigm_path: paradigms.then(|| "paradigms.php".to_string()),
            paradigm_param: "p1".to_string(),
        },
        crawler: CrawlerConfig {
            workers,
            max_attempts: 2,
            retry_backoff_ms: 0,
            request_delay_ms: 0,
            progress_interval: 1,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            dictionary_dir: dir.join("dictionary").display().to_string(),
            paradigm_dir: paradigms.then(|| dir.join("paradigms").display().to_string()),
            index_path: dir.join("index.json").display().to_string(),
            link_cache_path: Some(dir.join("links.json").display().to_string()),
        },
    }
}

fn word_page(title: &str, orthography_id: Option<u64>, definitions: &[&str]) -> String {
    let id_block = orthography_id
        .map(|id| format!(r#"<div class="flash_card_orth_id">Orthography ID: {}</div>"#, id))
        .unwrap_or_default();
    let items: String = definitions
        .iter()
        .map(|d| format!("<li>{}</li>", d))
        .collect();

    format!(
        r#"<html><body>
            <div class="flash_card_title">{}</div>
            {}
            <ol class="flash_card_english_def">{}</ol>
        </body></html>"#,
        title, id_block, items
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_listing(server: &MockServer, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">entry</a>"#, l))
        .collect();

    Mock::given(method("GET"))
        .and(path("/browse_latin.php"))
        .and(query_param("p1", "a"))
        .respond_with(html(format!(
            r#"<html><body>{}<a href="browse_latin.php?p1=b">next</a></body></html>"#,
            anchors
        )))
        .mount(server)
        .await;
}

async fn mount_item(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/definition.php"))
        .and(query_param("p1", id))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn open_store(dir: &Path) -> JsonStore {
    JsonStore::open(&dir.join("dictionary"), Some(&dir.join("paradigms"))).unwrap()
}

#[tokio::test]
async fn test_full_crawl_merges_across_workers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &server,
        &["definition.php?p1=1", "definition.php?p1=2", "definition.php?p1=1"],
    )
    .await;
    mount_item(
        &server,
        "1",
        word_page("amo, amare [verb]", Some(100), &["to love (passionately) - "]),
    )
    .await;
    mount_item(&server, "2", word_page("amo", None, &["To like, to be fond of"])).await;

    Mock::given(method("GET"))
        .and(path("/paradigms.php"))
        .and(query_param("p1", "100"))
        .respond_with(html(
            r#"<html><body><table class="paradigm">
                <tr><th></th><th>Active</th></tr>
                <tr><th>1st sg</th><td>amo</td></tr>
                <tr><th>2nd sg</th><td>amas</td></tr>
            </table></body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path(), 2, true);
    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.links, 2);
    assert_eq!(report.failed_workers, 0);
    assert_eq!(report.statistics.items_processed, 2);

    let store = open_store(dir.path());
    let amo = store.get_definitions(&title_hash("amo")).unwrap().unwrap();
    assert_eq!(amo.word, "amo");
    assert_eq!(amo.definitions, set(&["to love", "to like", "to be fond of"]));

    let amare = store.get_definitions(&title_hash("amare")).unwrap().unwrap();
    assert_eq!(amare.definitions, set(&["to love"]));

    let paradigm = store.get_paradigm(&title_hash("amo")).unwrap().unwrap();
    assert_eq!(paradigm.forms, 2);
    assert_eq!(paradigm.tables["0"]["active"]["2nd sg"], set(&["amas"]));
    assert!(store.get_paradigm(&title_hash("amare")).unwrap().is_some());

    let index = TitleIndex::load(&dir.path().join("index.json")).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(&title_hash("amare")), Some("amare".to_string()));
}

#[tokio::test]
async fn test_malformed_page_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, &["definition.php?p1=7"]).await;
    mount_item(
        &server,
        "7",
        r#"<html><body><div class="flash_card_title">amo</div></body></html>"#.to_string(),
    )
    .await;

    let config = create_test_config(&server.uri(), dir.path(), 1, false);
    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.statistics.items_skipped, 1);
    assert_eq!(report.statistics.items_processed, 0);

    let store = open_store(dir.path());
    assert!(store.get_definitions(&title_hash("amo")).unwrap().is_none());
    assert_eq!(
        std::fs::read_dir(dir.path().join("dictionary")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_failures_are_contained() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, &["definition.php?p1=1", "definition.php?p1=404"]).await;
    mount_item(&server, "1", word_page("amo", None, &["to love"])).await;
    Mock::given(method("GET"))
        .and(path("/definition.php"))
        .and(query_param("p1", "404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path(), 1, false);
    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.statistics.http_errors, 1);
    assert_eq!(report.statistics.items_processed, 1);
    assert!(open_store(dir.path())
        .get_definitions(&title_hash("amo"))
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_listing_failure_yields_empty_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/browse_latin.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path(), 4, false);
    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.links, 0);
    assert!(dir.path().join("index.json").exists());
    assert!(!dir.path().join("links.json").exists());
}

#[tokio::test]
async fn test_failed_listing_is_rediscovered_next_run() {
    let dir = TempDir::new().unwrap();

    {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/browse_latin.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = create_test_config(&server.uri(), dir.path(), 1, false);
        let report = run_crawl(config, CrawlOptions::default())
            .await
            .expect("First crawl failed");
        assert_eq!(report.links, 0);
    }

    let server = MockServer::start().await;
    mount_listing(&server, &["definition.php?p1=1"]).await;
    mount_item(&server, "1", word_page("amo", None, &["to love"])).await;

    let config = create_test_config(&server.uri(), dir.path(), 1, false);
    let report = run_crawl(config, CrawlOptions { fresh: false })
        .await
        .expect("Second crawl failed");

    assert_eq!(report.links, 1);
    assert_eq!(report.statistics.entries_created, 1);
    assert!(dir.path().join("links.json").exists());
}

#[tokio::test]
async fn test_empty_cached_links_trigger_discovery() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("links.json"), r#"{"all": []}"#).unwrap();

    mount_listing(&server, &["definition.php?p1=1"]).await;
    mount_item(&server, "1", word_page("amo", None, &["to love"])).await;

    let config = create_test_config(&server.uri(), dir.path(), 1, false);
    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.links, 1);
}

#[tokio::test]
async fn test_abandoned_paradigm_is_counted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, &["definition.php?p1=1"]).await;
    mount_item(&server, "1", word_page("amo", Some(100), &["to love"])).await;

    // Point the paradigm endpoint at a closed port
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let closed = listener.local_addr().unwrap();
    drop(listener);

    let mut config = create_test_config(&server.uri(), dir.path(), 1, true);
    config.site.paradigm_path = Some(format!("http://{}/paradigms.php", closed));

    let report = run_crawl(config, CrawlOptions::default())
        .await
        .expect("Crawl failed");

    assert_eq!(report.statistics.paradigms_abandoned, 1);
    assert_eq!(report.statistics.paradigms_written, 0);
    assert_eq!(report.statistics.items_processed, 1);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(&server, &["definition.php?p1=1"]).await;
    mount_item(&server, "1", word_page("amo, amare", None, &["to love", "to like"])).await;

    let config = create_test_config(&server.uri(), dir.path(), 2, false);
    let first = run_crawl(config.clone(), CrawlOptions::default())
        .await
        .expect("First crawl failed");
    assert_eq!(first.statistics.entries_created, 2);

    let store = open_store(dir.path());
    let before = store.get_definitions(&title_hash("amo")).unwrap();

    let second = run_crawl(config, CrawlOptions { fresh: true })
        .await
        .expect("Second crawl failed");
    assert_eq!(second.statistics.entries_created, 0);
    assert_eq!(second.statistics.entries_updated, 0);
    assert_eq!(second.statistics.entries_unchanged, 2);
    assert_eq!(store.get_definitions(&title_hash("amo")).unwrap(), before);
}

#[tokio::test]
async fn test_link_cache_skips_discovery() {
    let dir = TempDir::new().unwrap();

    {
        let server = MockServer::start().await;
        mount_listing(&server, &["definition.php?p1=1"]).await;
        mount_item(&server, "1", word_page("amo", None, &["to love"])).await;

        let config = create_test_config(&server.uri(), dir.path(), 1, false);
        run_crawl(config, CrawlOptions::default())
            .await
            .expect("First crawl failed");
    }

    // No listing endpoint this time: links must come from the cache
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/browse_latin.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    mount_item(&server, "1", word_page("amo", None, &["to adore"])).await;

    let config = create_test_config(&server.uri(), dir.path(), 1, false);
    let coordinator = Coordinator::new(config, CrawlOptions::default()).expect("Setup failed");
    let report = coordinator.run().await.expect("Second crawl failed");

    assert_eq!(report.links, 1);
    assert_eq!(report.statistics.entries_updated, 1);
    assert_eq!(
        open_store(dir.path())
            .get_definitions(&title_hash("amo"))
            .unwrap()
            .unwrap()
            .definitions,
        set(&["to love", "to adore"])
    );
}
