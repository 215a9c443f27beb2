mod common;

use std::num::NonZeroU32;
use std::sync::Arc;

use common::{fast_config, slip_page, FakePage, SHARE_LINK};
use slip_submit::models::{CandidateLink, Outcome};
use slip_submit::orchestrator::{BetProcessor, LinkDispatcher};
use slip_submit::services::SessionManager;
use slip_submit::workflow::SlipFlow;

const SECOND_LINK: &str = "https://prizepicks.onelink.me/gCQS/shareEntry?entryId=def456";

#[tokio::test]
async fn test_dispatcher_runs_links_one_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = Arc::new(FakePage::new());
    page.route(SHARE_LINK, slip_page());
    page.route(SECOND_LINK, slip_page());

    let manager = SessionManager::with_driver(config.clone(), page.clone());
    let (handle, worker) =
        LinkDispatcher::spawn(manager, SlipFlow::new(&config), config.inter_bet_delay, 4);

    // 两个生产者同时提交
    let unit = NonZeroU32::new(1).unwrap();
    let first = handle.clone();
    let second = handle.clone();
    let (a, b) = tokio::join!(
        first.submit(CandidateLink::bare(SHARE_LINK), unit),
        second.submit(CandidateLink::bare(SECOND_LINK), unit),
    );
    assert_eq!(a.unwrap().outcome, Outcome::Confirmed);
    assert_eq!(b.unwrap().outcome, Outcome::Confirmed);

    drop((handle, first, second));
    let (mut manager, log) = worker.await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.summary().successful_bets, 2);

    // 每条链接完整走完一遍：打开、填注额、提交，没有交错
    let gotos = page.gotos();
    assert_eq!(gotos.len(), 2);
    assert_eq!(page.fills().len(), 2);
    assert_eq!(page.clicks().len(), 2);

    manager.teardown().await;
    assert_eq!(page.closes(), 1);
}

#[tokio::test]
async fn test_dispatcher_reports_closed_session() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = Arc::new(FakePage::new());

    let mut manager = SessionManager::with_driver(config.clone(), page.clone());
    manager.teardown().await;

    let (handle, worker) =
        LinkDispatcher::spawn(manager, SlipFlow::new(&config), config.inter_bet_delay, 1);
    let result = handle
        .submit(CandidateLink::bare(SHARE_LINK), NonZeroU32::new(1).unwrap())
        .await
        .unwrap();

    assert_eq!(result.outcome, Outcome::Failed);
    assert_eq!(result.error.as_deref(), Some("environment"));

    drop(handle);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_batch_processor_places_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let config = fast_config(dir.path());
    let page = Arc::new(FakePage::new());
    page.route(SHARE_LINK, slip_page());

    let manager = SessionManager::with_driver(config.clone(), page.clone());
    let mut processor = BetProcessor::with_session(config.clone(), manager);
    processor.initialize_automation().await.unwrap();

    let links = processor.filter_new_links(vec![
        CandidateLink::bare(SHARE_LINK),
        CandidateLink::bare(SHARE_LINK),
        CandidateLink::bare("https://example.com/not-a-slip"),
    ]);
    assert_eq!(links.len(), 2);

    let report = processor
        .process_links(&links, NonZeroU32::new(3).unwrap())
        .await;
    assert!(!report.validated_only);
    assert_eq!(report.successful_bets, 1);
    assert_eq!(report.failed_bets, 1);
    assert_eq!(report.results[1].error.as_deref(), Some("invalid link"));

    let saved = processor.save_report(&report).unwrap();
    assert!(saved.starts_with(&config.results_dir));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
    assert_eq!(json["total_links"], 2);

    let summary = processor.summary();
    assert_eq!(summary.total_processed, 2);
    assert!((summary.success_rate - 0.5).abs() < f64::EPSILON);

    processor.close().await;
    assert_eq!(page.closes(), 1);
}
