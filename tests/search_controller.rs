use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use homify_client::models::PropertyType;
use homify_client::search::LOAD_ERROR;
use homify_client::{
    ApiError, ApiResult, ApiTransport, FilterUpdate, PropertyCatalog, SearchController,
    SearchHandle, SearchSnapshot,
};

const DEBOUNCE: Duration = Duration::from_millis(40);

/// One scripted response: an optional artificial latency plus the outcome
struct Scripted {
    delay: Duration,
    outcome: ApiResult<serde_json::Value>,
}

impl Scripted {
    fn ok(value: serde_json::Value) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(value),
        }
    }

    fn slow(delay: Duration, value: serde_json::Value) -> Self {
        Self {
            delay,
            outcome: Ok(value),
        }
    }

    fn error() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(ApiError::Server("500: boom".to_string())),
        }
    }
}

/// In-memory transport serving scripted pages and recording every query
#[derive(Default)]
struct FakeTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Vec<(String, String)>>>,
}

impl FakeTransport {
    fn script(&self, response: Scripted) {
        self.responses.lock().unwrap().push_back(response);
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> Vec<(String, String)> {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ApiTransport for FakeTransport {
    async fn get_json(
        &self,
        _path: &str,
        query: &[(String, String)],
    ) -> ApiResult<serde_json::Value> {
        self.requests.lock().unwrap().push(query.to_vec());
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.outcome
            }
            None => Ok(page(0, false, &[])),
        }
    }

    async fn post_json(
        &self,
        _path: &str,
        _body: serde_json::Value,
    ) -> ApiResult<serde_json::Value> {
        Ok(json!({}))
    }

    async fn delete(&self, _path: &str) -> ApiResult<()> {
        Ok(())
    }
}

fn listing(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Listing {}", id),
        "type": "APARTMENT",
        "monthly_rent": "250000.00",
        "surface": 60.0,
        "number_of_rooms": 3,
        "number_of_bedrooms": 1,
        "address": {
            "id": id,
            "street_address": "Rue 12",
            "city": "Douala",
            "postal_code": "00237",
            "district": "Akwa",
            "latitude": 4.05,
            "longitude": 9.7,
            "full_address": "Rue 12, Akwa, Douala"
        },
        "primary_photo": null,
        "furnished": false,
        "published_at": null,
        "is_favorite": false
    })
}

fn page(count: u64, has_next: bool, ids: &[i64]) -> serde_json::Value {
    json!({
        "count": count,
        "next": if has_next { Some("http://localhost:8000/api/properties/?page=2") } else { None },
        "previous": null,
        "results": ids.iter().map(|id| listing(*id)).collect::<Vec<_>>()
    })
}

fn ids_of(snapshot: &SearchSnapshot) -> Vec<i64> {
    snapshot.results.iter().map(|l| l.id).collect()
}

fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

async fn wait_for<F>(handle: &mut SearchHandle, pred: F) -> SearchSnapshot
where
    F: Fn(&SearchSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = handle.snapshot();
            if pred(&snapshot) {
                return snapshot;
            }
            handle.changed().await;
        }
    })
    .await
    .expect("timed out waiting for search state")
}

fn spawn(fake: &Arc<FakeTransport>) -> SearchHandle {
    let transport: Arc<dyn ApiTransport> = Arc::clone(fake) as Arc<dyn ApiTransport>;
    SearchController::spawn(PropertyCatalog::new(transport), DEBOUNCE)
}

#[tokio::test]
async fn rapid_filter_changes_coalesce_into_one_fetch() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(2, false, &[1, 2])));
    let mut search = spawn(&fake);

    search.update_filter(FilterUpdate::Search("a".to_string()));
    search.update_filter(FilterUpdate::Search("ab".to_string()));
    search.update_filter(FilterUpdate::City(Some("Douala".to_string())));

    let snapshot = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(ids_of(&snapshot), vec![1, 2]);

    // Quiet period: nothing else should fire
    tokio::time::sleep(DEBOUNCE * 3).await;
    assert_eq!(fake.request_count(), 1);

    // The single request carried the latest filter snapshot
    let query = fake.request(0);
    assert_eq!(query_value(&query, "search"), Some("ab"));
    assert_eq!(query_value(&query, "city"), Some("Douala"));
    assert_eq!(query_value(&query, "page"), Some("1"));
}

#[tokio::test]
async fn fresh_search_replaces_results() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(5, true, &[1, 2, 3, 4, 5])));
    let mut search = spawn(&fake);

    search.update_filter(FilterUpdate::PropertyType(Some(PropertyType::Apartment)));

    let snapshot = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(snapshot.results.len(), 5);
    assert_eq!(snapshot.count, 5);
    assert!(snapshot.has_next_page);
    assert_eq!(snapshot.filters.page, 1);
    assert_eq!(
        snapshot.filters.property_type,
        Some(PropertyType::Apartment)
    );

    let query = fake.request(0);
    assert_eq!(query_value(&query, "type"), Some("APARTMENT"));
}

#[tokio::test]
async fn load_more_appends_next_page() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(7, true, &[1, 2, 3, 4, 5])));
    fake.script(Scripted::ok(page(7, false, &[6, 7])));
    let mut search = spawn(&fake);

    let first = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(first.results.len(), 5);
    assert!(first.has_next_page);

    search.load_more();

    let second = wait_for(&mut search, |s| s.results.len() > 5).await;
    assert_eq!(ids_of(&second), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(second.count, 7);
    assert!(!second.has_next_page);

    // Load-more fetched immediately with the page advanced, same filters
    let query = fake.request(1);
    assert_eq!(query_value(&query, "page"), Some("2"));
}

#[tokio::test]
async fn load_more_without_next_page_is_a_noop() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(1, false, &[1])));
    let mut search = spawn(&fake);

    let before = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert!(!before.has_next_page);
    assert_eq!(fake.request_count(), 1);

    search.load_more();
    tokio::time::sleep(DEBOUNCE * 3).await;

    let after = search.snapshot();
    assert_eq!(fake.request_count(), 1);
    assert_eq!(after.filters.page, 1);
    assert_eq!(ids_of(&after), vec![1]);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_results() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(7, true, &[1, 2])));
    fake.script(Scripted::error());
    fake.script(Scripted::ok(page(1, false, &[9])));
    let mut search = spawn(&fake);

    let first = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(first.results.len(), 2);

    // Load-more blows up: error surfaced, results untouched
    search.load_more();
    let failed = wait_for(&mut search, |s| s.error.is_some()).await;
    assert_eq!(failed.error.as_deref(), Some(LOAD_ERROR));
    assert_eq!(ids_of(&failed), vec![1, 2]);

    // A filter change resets the page and the next success clears the error
    search.update_filter(FilterUpdate::Search("studio".to_string()));
    let recovered = wait_for(&mut search, |s| !s.loading && s.error.is_none() && s.results.len() == 1).await;
    assert_eq!(ids_of(&recovered), vec![9]);
    assert_eq!(recovered.filters.page, 1);
}

#[tokio::test]
async fn stale_response_resolving_late_is_discarded() {
    let fake = Arc::new(FakeTransport::default());
    // First snapshot's response arrives long after the second's
    fake.script(Scripted::slow(Duration::from_millis(300), page(1, false, &[99])));
    fake.script(Scripted::ok(page(1, false, &[1])));
    let mut search = spawn(&fake);

    search.update_filter(FilterUpdate::Search("old".to_string()));
    // Let the first fetch depart, then supersede it
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(20)).await;
    search.update_filter(FilterUpdate::Search("new".to_string()));

    let snapshot = wait_for(&mut search, |s| !s.results.is_empty()).await;
    assert_eq!(ids_of(&snapshot), vec![1]);
    assert_eq!(fake.request_count(), 2);

    // The slow stale response lands now; it must not clobber the results
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(ids_of(&search.snapshot()), vec![1]);
}

#[tokio::test]
async fn every_filter_change_resets_the_page() {
    let fake = Arc::new(FakeTransport::default());
    fake.script(Scripted::ok(page(7, true, &[1, 2])));
    fake.script(Scripted::ok(page(7, true, &[3, 4])));
    let mut search = spawn(&fake);

    let first = wait_for(&mut search, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(first.filters.page, 1);

    search.load_more();
    let second = wait_for(&mut search, |s| s.results.len() > 2).await;
    assert_eq!(second.filters.page, 2);

    search.update_filter(FilterUpdate::MaxPrice(Some(300_000)));
    let reset = wait_for(&mut search, |s| s.filters.max_price.is_some()).await;
    assert_eq!(reset.filters.page, 1);
}
