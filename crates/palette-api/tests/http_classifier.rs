//! Round trips between `HttpClassifier` and a real server.

use std::sync::Arc;
use std::time::Duration;

use palette_action::{
    ClassifyError, Classifier, CommandIntake, HttpClassifier, IntentKind, SubmitOutcome,
};
use palette_action::store::ActionStore;
use palette_api::{serve, AppState};
use palette_core::config::{ClassifierConfig, ServerConfig};
use palette_core::Dataset;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Start a server on an ephemeral port. Dropping the sender stops it.
async fn spawn_server(limit: u32) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(ServerConfig {
        daily_command_limit: limit,
        ..ServerConfig::default()
    });
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        serve(listener, state, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });
    (format!("http://{}", addr), tx)
}

fn classifier(base_url: &str) -> HttpClassifier {
    HttpClassifier::new(&ClassifierConfig {
        base_url: base_url.to_string(),
        ..ClassifierConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_classify_over_http() {
    let (url, _stop) = spawn_server(10).await;
    let response = classifier(&url)
        .classify("Show me enterprise users from Japan")
        .await
        .unwrap();

    assert_eq!(response.action, IntentKind::FilterSegment);
    let params = response.params.unwrap();
    assert_eq!(params["segment"], "enterprise");
    assert_eq!(params["location"], "Japan");
    let usage = response.rate_limit.unwrap();
    assert_eq!((usage.used, usage.remaining, usage.limit), (1, 9, 10));
}

#[tokio::test]
async fn test_rate_limited_after_cap() {
    let (url, _stop) = spawn_server(10).await;
    let client = classifier(&url);
    for _ in 0..10 {
        client.classify("scan logs").await.unwrap();
    }

    let err = client.classify("scan logs").await.unwrap_err();
    let ClassifyError::RateLimited(Some(usage)) = err else {
        panic!("expected rate limit with usage, got {:?}", err);
    };
    assert_eq!((usage.remaining, usage.used, usage.limit), (0, 10, 10));
}

#[tokio::test]
async fn test_closed_port_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = classifier(&format!("http://{}", addr))
        .classify("scan logs")
        .await
        .unwrap_err();
    assert!(matches!(err, ClassifyError::Unavailable(_)));
}

#[tokio::test]
async fn test_intake_over_http_reports_rate_limit() {
    let (url, _stop) = spawn_server(1).await;
    let store = ActionStore::new(&Dataset::sample(), Duration::from_secs(5));
    let intake = CommandIntake::new(store.clone(), Arc::new(classifier(&url)), 10);

    let SubmitOutcome::Published(id) = intake.submit_and_wait("scan logs").await else {
        panic!("first command should be classified");
    };
    assert_eq!(store.current_action().unwrap().kind, IntentKind::ScanAnomalies);
    store.clear_action(id);

    assert_eq!(
        intake.submit_and_wait("scan logs").await,
        SubmitOutcome::RateLimited
    );
    let snap = store.snapshot();
    assert!(snap.command.current.is_none());
    assert_eq!(
        snap.toasts.last().unwrap().message.as_deref(),
        Some("You have reached the daily limit of 1 commands.")
    );
}
