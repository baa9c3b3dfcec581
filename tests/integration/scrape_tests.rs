//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to stand in for the search site and drive the
//! full fetch-extract-paginate cycle end-to-end, with a recording clock so no
//! test actually sleeps through backoff or page delays.

use std::io::Write;
use std::time::Duration;
use sumi_sift::config::{load_config, Config};
use sumi_sift::pacing::{FixedRandom, RecordingClock, SequenceRandom};
use sumi_sift::{Field, Scraper, SiftError, NOT_AVAILABLE};
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_AGENT: &str = "TestAgent/1.0";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = format!("{}/sch/i.html", base_url);
    config.scraper.max_attempts = 3;
    config.scraper.request_timeout_secs = 1;
    config.identity.user_agents = vec![TEST_AGENT.to_string()];
    config
}

fn create_scraper(config: Config, clock: &RecordingClock) -> Scraper<RecordingClock, FixedRandom> {
    Scraper::with_pacing(config, clock.clone(), FixedRandom::new(0, 0.0))
        .expect("Failed to create scraper")
}

/// Renders a results page with one card per title
fn listing_page(titles: &[&str]) -> String {
    let cards: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                r#"<li class="s-item">
                    <a class="s-item__link" href="https://www.ebay.com/itm/{id}?hash=item">
                        <div class="s-item__title"><span>{title}</span></div>
                    </a>
                    <span class="s-item__price">${price}.00</span>
                    <span class="s-item__location">from United States</span>
                </li>"#,
                id = 1000 + i,
                title = title,
                price = 10 * (i + 1),
            )
        })
        .collect();

    format!(
        r#"<html><head><title>Results</title></head><body><ul class="srp-results">{}</ul></body></html>"#,
        cards
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: u32, response: ResponseTemplate, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .and(query_param("_pgn", page.to_string().as_str()))
        .respond_with(response)
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_two_pages() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 1, html(listing_page(&["Camera A", "Camera B"])), 1).await;
    mount_page(&mock_server, 2, html(listing_page(&["Camera C"])), 1).await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let mut progress = Vec::new();
    let mut sink = |page: u32, total: u32| progress.push((page, total));
    let result = scraper
        .scrape("film camera", 2, Some(&mut sink))
        .await
        .expect("Scrape failed");

    let titles: Vec<&str> = result.records.iter().map(|r| r.title()).collect();
    assert_eq!(titles, vec!["Camera A", "Camera B", "Camera C"]);
    assert_eq!(result.pages_fetched, 2);
    assert!(!result.stopped_early);
    assert_eq!(progress, vec![(1, 2), (2, 2)]);

    // One inter-page pause, none after the final page
    assert_eq!(clock.waits(), vec![Duration::from_secs(2)]);

    let table = result.table.expect("Expected a table");
    let mut lines = table.lines();
    assert_eq!(
        lines.next(),
        Some("title,price,condition,shipping,location,seller_rating,bids,item_number,link,image_url")
    );
    assert_eq!(table.lines().count(), 4);
    assert!(table.contains("Camera A,$10.00,N/A,N/A,from United States,N/A,N/A,1000,"));
}

#[tokio::test]
async fn test_pagination_stops_at_first_empty_page() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 1, html(listing_page(&["A", "B", "C"])), 1).await;
    // An empty page is retried until attempts run out
    mount_page(&mock_server, 2, html(listing_page(&[])), 3).await;
    mount_page(
        &mock_server,
        3,
        html(listing_page(&["D", "E", "F", "G", "H"])),
        0,
    )
    .await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let mut progress = Vec::new();
    let mut sink = |page: u32, total: u32| progress.push((page, total));
    let result = scraper
        .scrape("lens", 3, Some(&mut sink))
        .await
        .expect("Scrape failed");

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.pages_fetched, 2);
    assert!(result.stopped_early);
    assert_eq!(progress, vec![(1, 3), (2, 3)]);

    // Page pause, then linear backoff with minimum jitter on page 2
    assert_eq!(
        clock.waits(),
        vec![
            Duration::from_secs(2),
            Duration::from_secs(11),
            Duration::from_secs(21),
        ]
    );
}

#[tokio::test]
async fn test_retry_recovers_after_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, 1, html(listing_page(&["Recovered"])), 1).await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let result = scraper.scrape("lens", 1, None).await.expect("Scrape failed");

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].title(), "Recovered");
    assert_eq!(clock.waits(), vec![Duration::from_secs(11)]);
}

#[tokio::test]
async fn test_each_retry_presents_a_fresh_identity() {
    let mock_server = MockServer::start().await;

    // The first identity is always refused, so only a re-drawn identity succeeds
    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .and(header("user-agent", "AgentOne/1.0"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .and(header("user-agent", "AgentTwo/1.0"))
        .respond_with(html(listing_page(&["Rotated"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.identity.user_agents = vec!["AgentOne/1.0".to_string(), "AgentTwo/1.0".to_string()];
    let clock = RecordingClock::new();
    let scraper = Scraper::with_pacing(config, clock.clone(), SequenceRandom::new(vec![0, 1]))
        .expect("Failed to create scraper");

    let result = scraper.scrape("lens", 1, None).await.expect("Scrape failed");

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].title(), "Rotated");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
    assert_eq!(clock.waits(), vec![Duration::from_secs(11)]);
}

#[tokio::test]
async fn test_exhausted_retries_yield_no_table() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, 1, ResponseTemplate::new(403), 3).await;
    mount_page(&mock_server, 2, html(listing_page(&["Never"])), 0).await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let result = scraper.scrape("lens", 2, None).await.expect("Scrape failed");

    assert!(result.is_empty());
    assert_eq!(result.table, None);
    assert_eq!(result.pages_fetched, 1);
    assert!(result.stopped_early);
    assert_eq!(
        clock.waits(),
        vec![Duration::from_secs(11), Duration::from_secs(21)]
    );
}

#[tokio::test]
async fn test_timeout_counts_as_failed_attempt() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        1,
        html(listing_page(&["Slow"])).set_delay(Duration::from_secs(3)),
        2,
    )
    .await;

    let mut config = create_test_config(&mock_server.uri());
    config.scraper.max_attempts = 2;
    let clock = RecordingClock::new();
    let scraper = create_scraper(config, &clock);

    let result = scraper.scrape("lens", 1, None).await.expect("Scrape failed");

    assert!(result.is_empty());
    assert_eq!(clock.waits(), vec![Duration::from_secs(11)]);
}

#[tokio::test]
async fn test_request_carries_query_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .and(query_param("_nkw", "vintage film camera"))
        .and(query_param("_sacat", "0"))
        .and(query_param("_pgn", "1"))
        .and(header("user-agent", TEST_AGENT))
        .and(header("referer", "https://www.ebay.com/"))
        .and(header("dnt", "1"))
        .respond_with(html(listing_page(&["Matched"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let result = scraper
        .scrape("  vintage   film camera ", 1, None)
        .await
        .expect("Scrape failed");

    assert_eq!(result.search_term, "vintage film camera");
    assert_eq!(result.records.len(), 1);

    let requests = mock_server.received_requests().await.unwrap();
    let url = requests[0].url.as_str();
    assert!(url.contains("_nkw=vintage+film+camera"), "{}", url);
}

#[tokio::test]
async fn test_decorative_and_partial_listings() {
    let mock_server = MockServer::start().await;

    let body = r#"<html><body><ul>
        <li class="s-item"><div class="s-item__title">Shop on eBay</div><span class="s-item__price">$20.00</span></li>
        <li class="s-item"><div class="s-item__title">Body only</div></li>
        <li class="s-item"><span class="s-item__price">$5.00</span></li>
    </ul></body></html>"#;
    mount_page(&mock_server, 1, html(body.to_string()), 1).await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    let result = scraper.scrape("body", 1, None).await.expect("Scrape failed");

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.title(), "Body only");
    for field in Field::ALL {
        if field != Field::Title {
            assert_eq!(record.get(field), NOT_AVAILABLE);
        }
    }

    let table = result.table.unwrap();
    assert_eq!(
        table.lines().nth(1),
        Some("Body only,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A,N/A")
    );
}

#[tokio::test]
async fn test_invalid_input_sends_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(listing_page(&["Unused"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let clock = RecordingClock::new();
    let scraper = create_scraper(create_test_config(&mock_server.uri()), &clock);

    assert!(matches!(
        scraper.scrape("", 1, None).await,
        Err(SiftError::EmptySearchTerm)
    ));
    assert!(matches!(
        scraper.scrape("lens", 0, None).await,
        Err(SiftError::InvalidPageCount { .. })
    ));
    assert!(clock.waits().is_empty());
}

#[tokio::test]
async fn test_configured_columns_from_file() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, html(listing_page(&["Configured"])), 1).await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[scraper]
base-url = "{}/sch/i.html"
max-attempts = 1

[identity]
user-agents = ["{}"]

[output]
columns = ["item_number", "title", "time_left"]
"#,
        mock_server.uri(),
        TEST_AGENT
    )
    .unwrap();
    file.flush().unwrap();

    let config = load_config(file.path()).expect("Failed to load config");
    let clock = RecordingClock::new();
    let scraper = create_scraper(config, &clock);

    let result = scraper.scrape("lens", 1, None).await.expect("Scrape failed");

    assert_eq!(
        result.table.as_deref(),
        Some("item_number,title,time_left\n1000,Configured,N/A\n")
    );
}
