#![allow(clippy::unwrap_used)]
// Integration tests for the bulk cause-list runner using wiremock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ecourt_api::{CauseListType, ClientConfig, CourtComplex, CourtLookupClient, MemoryTokenCache};
use ecourt_core::{BulkEvent, BulkRequest, CardStatus, CoreError, bulk};

// ── Helpers ─────────────────────────────────────────────────────────

const LISTED: &str = "<table><tr><th>Sr No</th><th>Case</th></tr>\
                      <tr><td>1</td><td>O.S./412/2018</td></tr></table>";
const NOTHING_LISTED: &str = "<table><tr><th>Sr No</th><th>Case</th></tr>\
                              <tr><td colspan=\"2\">No cases</td></tr></table>";

async fn setup() -> (MockServer, CourtLookupClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    let client =
        CourtLookupClient::new(&config, Arc::new(MemoryTokenCache::with_token("t"))).unwrap();
    (server, client)
}

fn request(delay: Duration) -> BulkRequest {
    BulkRequest {
        state_code: "13".into(),
        district_code: "4".into(),
        complex: CourtComplex {
            complex_code: "1130004".into(),
            njdg_est_code: "3,4".into(),
            court_complex_name: "District Court Ballia".into(),
        },
        cause_list_type: CauseListType::Civil,
        date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        delay,
    }
}

async fn mount_courts(server: &MockServer, court_names: &str) {
    Mock::given(method("POST"))
        .and(path("/court/names"))
        .and(body_partial_json(json!({ "court_code": "3,4" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "courtNames": court_names }
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_cause_list(server: &MockServer, court_code: &str, court_number: &str, resp: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/court/cause-list"))
        .and(body_partial_json(json!({
            "court_code": court_code,
            "court_number": court_number,
            "date": "07-03-2024",
        })))
        .respond_with(resp)
        .expect(1)
        .mount(server)
        .await;
}

fn cases(html: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "success",
        "data": { "cases": html }
    }))
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_each_court_gets_a_card() {
    let (server, client) = setup().await;

    mount_courts(&server, "0~Select#3^1~Court 1#3^2~Court 2#4^1~Court 3#4^2~Court 4").await;
    mount_cause_list(&server, "3", "1", cases(LISTED)).await;
    mount_cause_list(&server, "3", "2", cases(NOTHING_LISTED)).await;
    mount_cause_list(&server, "4", "1", ResponseTemplate::new(500).set_body_string("boom")).await;
    mount_cause_list(&server, "4", "2", ResponseTemplate::new(404)).await;

    let report = bulk::run(&client, &request(Duration::ZERO), |_| {}).await.unwrap();

    let statuses: Vec<&CardStatus> = report.cards.iter().map(|c| &c.status).collect();
    assert_eq!(statuses[0], &CardStatus::Listed);
    assert_eq!(statuses[1], &CardStatus::Empty);
    assert!(matches!(statuses[2], CardStatus::Failed { message } if message.contains("boom")));
    assert_eq!(statuses[3], &CardStatus::Empty);

    assert_eq!(report.listed(), 1);
    assert_eq!(report.empty(), 2);
    assert_eq!(report.failed(), 1);
    assert!(report.cards[0].cause_list.is_some());
    assert!(report.cards[1].cause_list.is_none());
}

#[tokio::test]
async fn test_progress_is_reported_in_order() {
    let (server, client) = setup().await;

    mount_courts(&server, "3^1~Court 1#3^2~Court 2").await;
    mount_cause_list(&server, "3", "1", cases(LISTED)).await;
    mount_cause_list(&server, "3", "2", cases(LISTED)).await;

    let mut events = Vec::new();
    bulk::run(&client, &request(Duration::ZERO), |event| {
        events.push(match event {
            BulkEvent::Started { total } => format!("started {total}"),
            BulkEvent::Fetching { index, court, .. } => format!("fetching {index} {}", court.display_name),
            BulkEvent::Finished { index, card, .. } => format!("finished {index} {:?}", card.status),
        });
    })
    .await
    .unwrap();

    assert_eq!(
        events,
        vec![
            "started 2",
            "fetching 0 Court 1",
            "finished 0 Listed",
            "fetching 1 Court 2",
            "finished 1 Listed",
        ]
    );
}

#[tokio::test]
async fn test_requests_are_spaced_by_the_delay() {
    let (server, client) = setup().await;

    mount_courts(&server, "3^1~Court 1#3^2~Court 2#3^3~Court 3").await;
    for number in ["1", "2", "3"] {
        mount_cause_list(&server, "3", number, cases(LISTED)).await;
    }

    let started = Instant::now();
    let report = bulk::run(&client, &request(Duration::from_millis(100)), |_| {})
        .await
        .unwrap();

    assert_eq!(report.cards.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_court_list_failure_aborts_the_run() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/court/names"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "bad complex" })))
        .mount(&server)
        .await;

    let err = bulk::run(&client, &request(Duration::ZERO), |_| {}).await.unwrap_err();
    assert!(
        matches!(err, CoreError::InvalidParameters { ref message } if message == "bad complex"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_complex_without_courts_is_an_empty_report() {
    let (server, client) = setup().await;

    mount_courts(&server, "0~Select Court#D~------").await;

    let report = bulk::run(&client, &request(Duration::ZERO), |_| {}).await.unwrap();
    assert!(report.cards.is_empty());
}
