//! Watch-list flows with an in-process profile lookup.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use leaders_screener::data::{CompanyProfile, LookupError, ProfileLookup};
use leaders_screener::watchlist::{
    from_csv, EntryFields, Enrichment, WatchlistEntry, WatchlistError, WatchlistStore,
};

/// Mock lookup with scripted failures and delays.
#[derive(Default)]
struct MockProfiles {
    profiles: HashMap<String, CompanyProfile>,
    failures: HashMap<String, LookupError>,
    delays_ms: HashMap<String, u64>,
    requested: Mutex<Vec<String>>,
}

impl MockProfiles {
    fn profile(mut self, symbol: &str, name: &str, price: f64) -> Self {
        self.profiles.insert(
            symbol.into(),
            CompanyProfile {
                symbol: symbol.into(),
                company_name: Some(name.into()),
                sector: Some("Technology".into()),
                price: Some(price),
                pe: Some(30.0),
                market_cap: Some(1.0e12),
                dividend_yield: None,
            },
        );
        self
    }

    fn failing(mut self, symbol: &str, error: LookupError) -> Self {
        self.failures.insert(symbol.into(), error);
        self
    }

    fn delayed(mut self, symbol: &str, ms: u64) -> Self {
        self.delays_ms.insert(symbol.into(), ms);
        self
    }
}

#[async_trait]
impl ProfileLookup for MockProfiles {
    async fn fetch(&self, symbol: &str) -> Result<CompanyProfile, LookupError> {
        self.requested.lock().unwrap().push(symbol.to_string());
        if let Some(ms) = self.delays_ms.get(symbol) {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
        }
        if let Some(err) = self.failures.get(symbol) {
            return Err(err.clone());
        }
        self.profiles
            .get(symbol)
            .cloned()
            .ok_or_else(|| LookupError::Empty(symbol.to_string()))
    }
}

fn fields(allocation: f64, amount: f64, shares: u32) -> EntryFields {
    EntryFields {
        company_name: String::new(),
        sector: String::new(),
        allocation,
        investment_amount: amount,
        shares,
    }
}

fn row(symbol: &str, allocation: f64, amount: f64, shares: u32) -> WatchlistEntry {
    WatchlistEntry {
        symbol: symbol.into(),
        fields: fields(allocation, amount, shares),
        enrichment: Enrichment::default(),
    }
}

#[tokio::test]
async fn resubmitting_a_symbol_updates_in_place() {
    let lookup = MockProfiles::default().profile("AAPL", "Apple Inc.", 190.0);
    let mut store = WatchlistStore::new();

    store.submit("AAPL", fields(8.0, 6400.0, 10), &lookup).await.unwrap();
    store.submit("AAPL", fields(10.0, 7000.0, 12), &lookup).await.unwrap();

    let rows = store.export_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].fields.allocation, 10.0);
    assert_eq!(rows[0].fields.investment_amount, 7000.0);
    assert_eq!(rows[0].fields.shares, 12);
    assert_eq!(rows[0].fields.company_name, "Apple Inc.");
    assert_eq!(rows[0].enrichment.price, Some(190.0));
}

#[test]
fn upsert_is_idempotent() {
    let mut store = WatchlistStore::new();
    let enrichment = Enrichment {
        price: Some(1.0),
        ..Default::default()
    };

    store.upsert("KO", fields(8.0, 6400.0, 10), enrichment.clone()).unwrap();
    let once = store.export_rows();
    store.upsert("KO", fields(8.0, 6400.0, 10), enrichment).unwrap();

    assert_eq!(store.export_rows(), once);
}

#[test]
fn removing_absent_symbol_is_a_no_op() {
    let mut store = WatchlistStore::new();
    store.upsert("KO", fields(8.0, 6400.0, 10), Enrichment::default()).unwrap();
    let before = store.export_rows();

    assert!(!store.remove("PEP"));
    assert_eq!(store.export_rows(), before);
}

#[tokio::test]
async fn failed_enrichment_records_warning_only() {
    let lookup = MockProfiles::default().failing("BADTICKER", LookupError::Status { status: 404 });
    let mut store = WatchlistStore::new();
    store.upsert("BADTICKER", fields(8.0, 6400.0, 10), Enrichment::default()).unwrap();
    let before = store.export_rows();

    let entry = store.enrich("BADTICKER", &lookup).await.unwrap();

    assert_eq!(vec![entry], before);
    assert_eq!(store.export_rows(), before);
    let warnings = store.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].symbol, "BADTICKER");
    assert!(warnings[0].message.contains("404"));
}

#[tokio::test]
async fn hanging_lookup_is_bounded() {
    let lookup = MockProfiles::default()
        .profile("SLOW", "Slow Corp", 5.0)
        .delayed("SLOW", 5_000);
    let mut store = WatchlistStore::new().with_lookup_timeout(Duration::from_millis(50));
    store.upsert("SLOW", fields(8.0, 6400.0, 10), Enrichment::default()).unwrap();

    let entry = store.enrich("SLOW", &lookup).await.unwrap();
    assert_eq!(entry.enrichment.price, None);
    let warnings = store.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("timed out"));
}

#[tokio::test]
async fn enriching_unlisted_symbol_fails() {
    let mut store = WatchlistStore::new();
    let err = store
        .enrich("MSFT", &MockProfiles::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WatchlistError::UnknownSymbol(_)));
}

#[tokio::test]
async fn export_then_import_round_trips() {
    let lookup = MockProfiles::default()
        .profile("AAPL", "Apple Inc.", 190.0)
        .profile("MSFT", "Microsoft, Corp.", 410.25);
    let mut store = WatchlistStore::new();
    store.submit("AAPL", fields(8.0, 6400.0, 10), &lookup).await.unwrap();
    store.submit("MSFT", fields(12.5, 10000.0, 25), &lookup).await.unwrap();
    store.submit("ZZZ", fields(1.0, 1000.0, 1), &lookup).await.unwrap();

    let csv = store.export_csv().unwrap();
    assert_eq!(from_csv(&csv).unwrap(), store.export_rows());
}

#[tokio::test]
async fn bulk_import_keeps_row_order_and_collects_failures() {
    let lookup = MockProfiles::default()
        .profile("AAPL", "Apple Inc.", 190.0)
        .profile("MSFT", "Microsoft", 410.0)
        .delayed("AAPL", 60)
        .failing("DOWN", LookupError::Network("connection refused".into()));
    let mut store = WatchlistStore::new().with_concurrency(3);
    let rows = vec![
        row("aapl", 8.0, 6400.0, 10),
        row("DOWN", 8.0, 6400.0, 10),
        row("BIG", 150.0, 6400.0, 10),
        row("MSFT", 8.0, 6400.0, 10),
    ];

    let report = store.bulk_enrich_from_table(rows, &lookup).await;

    assert_eq!(report.upserted, vec!["AAPL", "DOWN", "MSFT"]);
    assert_eq!(report.failed_lookups, vec!["DOWN"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0, "BIG");

    let symbols: Vec<String> = store.export_rows().into_iter().map(|e| e.symbol).collect();
    assert_eq!(symbols, vec!["AAPL", "DOWN", "MSFT"]);
    assert_eq!(store.get("AAPL").unwrap().enrichment.price, Some(190.0));
    assert_eq!(store.get("DOWN").unwrap().enrichment, Enrichment::default());

    let requested = lookup.requested.lock().unwrap().clone();
    assert!(!requested.contains(&"BIG".to_string()));

    // One warning for the rejected row, one for the failed lookup.
    assert_eq!(store.take_warnings().len(), 2);
}

#[tokio::test]
async fn store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("industry_leaders.json");
    let lookup = MockProfiles::default().profile("AAPL", "Apple Inc.", 190.0);

    {
        let mut store = WatchlistStore::open(&path).unwrap();
        store.submit("AAPL", fields(8.0, 6400.0, 10), &lookup).await.unwrap();
        store.upsert("KO", fields(4.0, 3200.0, 50), Enrichment::default()).unwrap();
        assert!(store.remove("KO"));
        store.save().unwrap();
    }

    let reopened = WatchlistStore::open(&path).unwrap();
    assert_eq!(reopened.len(), 1);
    assert_eq!(
        reopened.get("aapl").unwrap().fields.company_name,
        "Apple Inc."
    );
}
