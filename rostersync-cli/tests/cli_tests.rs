use clap::Parser;
use pretty_assertions::assert_eq;
use rostersync_cli::{Args, PassOutcome, build_store, run_pass, run_periodic};
use rostersync_source::XmlApiSource;
use rostersync_sync::{MemoryStore, Reconciler, SyncError};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn parse(extra: &[&str]) -> Args {
    let mut argv = vec!["rostersync", "--table-name", "PlayerData", "--universe", "166"];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

// ── Arguments ───────────────────────────────────────────────────

#[test]
fn defaults_match_provider_limits() {
    let args = parse(&[]);
    let config = args.sync_config().unwrap();

    assert_eq!(config.table_name, "PlayerData");
    assert_eq!(config.universe, 166);
    assert_eq!(config.fetch_concurrency, 3);
    assert_eq!(config.limits.write.get(), 25);
    assert_eq!(config.limits.read.get(), 100);
    assert_eq!(config.read_pause_ms, 200);
    assert!(!args.dry_store);
    assert_eq!(args.interval_secs, None);
    assert_eq!(args.log_filter(), "info");
}

#[test]
fn overrides_reach_every_config() {
    let args = parse(&[
        "--community",
        "de",
        "--source-url",
        "http://localhost:9000/api",
        "--concurrency",
        "8",
        "--write-limit",
        "10",
        "--region",
        "eu-west-1",
        "--endpoint-url",
        "http://localhost:8000",
        "-v",
    ]);

    assert_eq!(args.sync_config().unwrap().fetch_concurrency, 8);
    assert_eq!(args.sync_config().unwrap().limits.write.get(), 10);
    let source = args.source_config();
    assert_eq!(source.community, "de");
    assert_eq!(source.base_url_for(166), "http://localhost:9000/api");
    let dynamo = args.dynamo_config();
    assert_eq!(dynamo.region.as_deref(), Some("eu-west-1"));
    assert_eq!(dynamo.endpoint_url.as_deref(), Some("http://localhost:8000"));
    assert_eq!(args.log_filter(), "debug");
}

#[test]
fn zero_limits_are_configuration_errors() {
    let args = parse(&["--read-limit", "0"]);
    let err = args.sync_config().unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}

#[test]
fn zero_concurrency_is_a_configuration_error() {
    let args = parse(&["--concurrency", "0"]);
    assert!(matches!(args.sync_config(), Err(SyncError::Config(_))));
}

#[test]
fn non_numeric_universe_is_rejected_by_the_parser() {
    assert!(Args::try_parse_from(["rostersync", "--universe", "abc"]).is_err());
}

// ── Exit status ─────────────────────────────────────────────────

#[test]
fn exit_codes() {
    assert_eq!(PassOutcome::Clean.code(), 0);
    assert_eq!(PassOutcome::Fatal.code(), 1);
    assert_eq!(PassOutcome::Incomplete.code(), 2);
    assert_eq!(
        PassOutcome::of(&Err(SyncError::Roster("down".into()))),
        PassOutcome::Fatal
    );
}

// ── End to end ──────────────────────────────────────────────────

async fn mount_universe(server: &MockServer, roster_status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/players.xml"))
        .respond_with(ResponseTemplate::new(roster_status).set_body_string(
            r#"<players><player id="1" name="alice"/><player id="2" name="bob"/></players>"#,
        ))
        .mount(server)
        .await;
    for (id, name) in [("1", "alice"), ("2", "bob")] {
        Mock::given(method("GET"))
            .and(path("/api/playerData.xml"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<playerData id="{id}" name="{name}" timestamp="1"><positions><position type="0" score="10">1</position></positions></playerData>"#
            )))
            .mount(server)
            .await;
    }
}

fn reconciler_for(server: &MockServer, store: Arc<MemoryStore>) -> Reconciler {
    let args = parse(&[
        "--dry-store",
        "--read-pause-ms",
        "0",
        "--source-url",
        &format!("{}/api", server.uri()),
    ]);
    let source = XmlApiSource::new(args.source_config()).unwrap();
    Reconciler::new(Arc::new(source), store, args.sync_config().unwrap()).unwrap()
}

#[tokio::test]
async fn dry_run_pass_is_clean() {
    let server = MockServer::start().await;
    mount_universe(&server, 200).await;
    let store = Arc::new(MemoryStore::new());

    let outcome = run_pass(&reconciler_for(&server, store.clone())).await;

    assert_eq!(outcome, PassOutcome::Clean);
    assert_eq!(store.len("PlayerData").await, 2);
}

#[tokio::test]
async fn unreachable_roster_is_fatal() {
    let server = MockServer::start().await;
    mount_universe(&server, 502).await;
    let store = Arc::new(MemoryStore::new());

    let outcome = run_pass(&reconciler_for(&server, store.clone())).await;

    assert_eq!(outcome, PassOutcome::Fatal);
    assert!(store.is_empty("PlayerData").await);
}

#[tokio::test]
async fn dry_store_needs_no_aws_environment() {
    let args = parse(&["--dry-store"]);
    let store = build_store(&args, args.sync_config().unwrap().limits).await.unwrap();
    assert_eq!(store.provider_name(), "memory");
}

// ── Periodic mode ───────────────────────────────────────────────

#[tokio::test]
async fn shutdown_during_a_pass_stops_after_that_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/players.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_string("<players></players>"),
        )
        .mount(&server)
        .await;
    let reconciler = reconciler_for(&server, Arc::new(MemoryStore::new()));

    // Fires while the first pass is still waiting on the roster.
    let shutdown = tokio::time::sleep(Duration::from_millis(50));
    let finished = tokio::time::timeout(
        Duration::from_secs(10),
        run_periodic(&reconciler, Duration::from_secs(3600), shutdown),
    )
    .await;

    assert!(finished.is_ok(), "periodic loop ignored the shutdown request");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn shutdown_before_the_first_tick_runs_no_pass() {
    let server = MockServer::start().await;
    let reconciler = reconciler_for(&server, Arc::new(MemoryStore::new()));

    run_periodic(&reconciler, Duration::from_secs(3600), std::future::ready(())).await;

    assert!(server.received_requests().await.unwrap().is_empty());
}
