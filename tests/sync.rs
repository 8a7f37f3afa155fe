
use std::path::PathBuf;

use chrono::NaiveDate;

use todology::error::{FeedError, SyncError};
use todology::{Ledger, RunOutcome, Syncer};

use mocks::{feed_payload, FailureMode, RecordingSink, StaticFeed, UnavailableFeed};

/// All tests run "today" on 2016-01-31, so the eligibility cutoff is 2015-12-01
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 1, 31).unwrap()
}

fn temp_ledger_path(test_name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "todology-sync-{}-{}.json",
        test_name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

#[tokio::test]
async fn second_run_against_an_unchanged_feed_imports_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("idempotence");

    let payload = feed_payload(&[
        ("uid-a", "Essay draft", "20151102"),
        ("uid-b", "Problem set 7", "20151109"),
    ]);

    let mut first = Syncer::new(
        StaticFeed::new(&payload),
        RecordingSink::new(),
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = first.run(today()).await.unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.outcome(), RunOutcome::Imported(2));

    // A brand new run, sharing only the ledger file
    let second_sink = RecordingSink::new();
    let mut second = Syncer::new(
        StaticFeed::new(&payload),
        second_sink.clone(),
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = second.run(today()).await.unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.already_imported, 2);
    assert_eq!(summary.outcome(), RunOutcome::NothingNew);
    assert!(second_sink.created().is_empty());

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn only_events_older_than_the_cutoff_are_imported() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("eligibility");

    let payload = feed_payload(&[
        ("uid-old", "November assignment", "20151130"),
        ("uid-boundary", "December 1st assignment", "20151201"),
        ("uid-recent", "January assignment", "20160115"),
    ]);

    let mut syncer = Syncer::new(
        StaticFeed::new(&payload),
        RecordingSink::new(),
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = syncer.run(today()).await.unwrap();

    // The inequality is strict: the event starting exactly on the cutoff day stays out
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.ineligible, 2);
    assert!(syncer.ledger().contains("uid-old"));
    assert!(syncer.ledger().contains("uid-boundary") == false);

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn a_transient_failure_does_not_block_the_other_events() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("transient");

    let payload = feed_payload(&[
        ("uid-1", "First", "20151102"),
        ("uid-2", "Second", "20151103"),
        ("uid-3", "Third", "20151104"),
    ]);
    let sink = RecordingSink::new().fail_on("Second", FailureMode::Transient);

    let mut syncer = Syncer::new(
        StaticFeed::new(&payload),
        sink.clone(),
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = syncer.run(today()).await.unwrap();

    assert_eq!(sink.created_titles(), vec!["First", "Third"]);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.transient_failures, 1);
    assert_eq!(summary.permanent_failures, 0);
    assert_eq!(
        summary.outcome(),
        RunOutcome::Partial {
            imported: 2,
            failed: 1
        }
    );

    // The failed event is not recorded, so the next run will retry it
    assert!(syncer.ledger().contains("uid-1"));
    assert!(syncer.ledger().contains("uid-2") == false);
    assert!(syncer.ledger().contains("uid-3"));

    let retry_sink = RecordingSink::new();
    let mut retry = Syncer::new(
        StaticFeed::new(&payload),
        retry_sink,
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = retry.run(today()).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(retry.ledger().contains("uid-2"), true);

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn a_permanently_rejected_event_is_never_retried() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("permanent");

    let payload = feed_payload(&[("uid-bad", "Rejected assignment", "20151102")]);
    let sink = RecordingSink::new().fail_on("Rejected assignment", FailureMode::Permanent);

    let mut syncer = Syncer::new(
        StaticFeed::new(&payload),
        sink,
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = syncer.run(today()).await.unwrap();
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.permanent_failures, 1);
    // Recorded anyway, to suppress retries of a request the sink has permanently rejected
    assert!(syncer.ledger().contains("uid-bad"));

    let second_sink = RecordingSink::new();
    let mut second = Syncer::new(
        StaticFeed::new(&payload),
        second_sink.clone(),
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = second.run(today()).await.unwrap();
    assert_eq!(summary.already_imported, 1);
    assert!(second.ledger().len() == 1);
    // The rejected event never reaches the sink again
    assert!(second_sink.created().is_empty());

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn a_malformed_feed_causes_no_remote_calls_and_no_ledger_mutation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("malformed");

    let sink = RecordingSink::new();
    let mut syncer = Syncer::new(
        StaticFeed::new("this is not a calendar"),
        sink.clone(),
        Ledger::load(&ledger_path).unwrap(),
    );

    let result = syncer.run(today()).await;
    assert!(matches!(result, Err(SyncError::Feed(FeedError::Format(_)))));
    assert!(sink.created().is_empty());
    assert!(syncer.ledger().is_empty());
    // The run was a no-op from the ledger's perspective: not even an empty file was written
    assert!(ledger_path.exists() == false);
}

#[tokio::test]
async fn an_unreachable_feed_aborts_the_run() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("unreachable");

    let mut syncer = Syncer::new(
        UnavailableFeed,
        RecordingSink::new(),
        Ledger::load(&ledger_path).unwrap(),
    );

    let result = syncer.run(today()).await;
    assert!(matches!(
        result,
        Err(SyncError::Feed(FeedError::Unavailable(_)))
    ));
    assert!(ledger_path.exists() == false);
}

#[tokio::test]
async fn events_are_imported_in_ascending_date_then_uid_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("ordering");

    // Deliberately out of chronological order, with a same-day tie broken by UID
    let payload = feed_payload(&[
        ("uid-z", "Same day, later uid", "20151110"),
        ("uid-1", "Latest", "20151120"),
        ("uid-a", "Same day, earlier uid", "20151110"),
        ("uid-2", "Earliest", "20151101"),
    ]);

    let sink = RecordingSink::new();
    let mut syncer = Syncer::new(
        StaticFeed::new(&payload),
        sink.clone(),
        Ledger::load(&ledger_path).unwrap(),
    );
    syncer.run(today()).await.unwrap();

    assert_eq!(
        sink.created_titles(),
        vec![
            "Earliest",
            "Same day, earlier uid",
            "Same day, later uid",
            "Latest",
        ]
    );

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn a_restart_after_a_successful_import_does_not_resubmit_it() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("durability");

    // First run imports one event and persists it
    let payload = feed_payload(&[("uid-done", "Already handled", "20151102")]);
    let mut first = Syncer::new(
        StaticFeed::new(&payload),
        RecordingSink::new(),
        Ledger::load(&ledger_path).unwrap(),
    );
    first.run(today()).await.unwrap();
    drop(first); // the "crash": only the on-disk ledger survives

    // The restarted run sees the same event plus a new one
    let payload = feed_payload(&[
        ("uid-done", "Already handled", "20151102"),
        ("uid-new", "Newly due", "20151103"),
    ]);
    let sink = RecordingSink::new();
    let mut second = Syncer::new(
        StaticFeed::new(&payload),
        sink,
        Ledger::load(&ledger_path).unwrap(),
    );
    let summary = second.run(today()).await.unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.already_imported, 1);

    let _ = std::fs::remove_file(&ledger_path);
}

#[tokio::test]
async fn an_auth_failure_is_fatal_and_records_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let ledger_path = temp_ledger_path("auth");

    let payload = feed_payload(&[("uid-1", "First", "20151102")]);
    let sink = RecordingSink::new().fail_on("First", FailureMode::Auth);

    let mut syncer = Syncer::new(
        StaticFeed::new(&payload),
        sink,
        Ledger::load(&ledger_path).unwrap(),
    );

    let result = syncer.run(today()).await;
    assert!(matches!(result, Err(SyncError::Auth(_))));
    assert!(syncer.ledger().is_empty());
    assert!(ledger_path.exists() == false);
}
