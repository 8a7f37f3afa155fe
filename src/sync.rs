//! The orchestrator that drives one full sync run
//!
//! A run is a single, finite pass: fetch → parse → filter → dedupe → import → persist.
//! No event is retried within the same run; transient failures simply stay out of the ledger and
//! become candidates again on the next run.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::eligibility;
use crate::error::{ImportError, SyncError};
use crate::feed;
use crate::importer::TaskImporter;
use crate::traits::{FeedSource, TaskSink};
use crate::{Event, Ledger};

/// What one run achieved, as reported to the operator.
///
/// The counters are enough to decide whether the run needs manual double-checking: a non-zero
/// `permanent_failures` means some assignments were rejected by the service and will never be
/// retried automatically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Events successfully created on the remote service during this run
    pub imported: usize,
    /// Eligible events skipped because the ledger already contained them
    pub already_imported: usize,
    /// Events parsed from the feed but not yet old enough to import
    pub ineligible: usize,
    /// Events that failed with a transient error; they will be retried on the next run
    pub transient_failures: usize,
    /// Events the service permanently rejected; they were recorded to suppress further retries
    pub permanent_failures: usize,
}

impl RunSummary {
    pub fn outcome(&self) -> RunOutcome {
        if self.transient_failures > 0 || self.permanent_failures > 0 {
            RunOutcome::Partial {
                imported: self.imported,
                failed: self.transient_failures + self.permanent_failures,
            }
        } else if self.imported > 0 {
            RunOutcome::Imported(self.imported)
        } else {
            RunOutcome::NothingNew
        }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} imported, {} already imported, {} not eligible yet, {} transient failures, {} permanent failures",
            self.imported,
            self.already_imported,
            self.ineligible,
            self.transient_failures,
            self.permanent_failures
        )
    }
}

/// The coarse outcome of a run. Note that a partial failure is not a fatal one: fatal conditions
/// are reported as [`SyncError`] instead.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// Some events were imported and nothing failed
    Imported(usize),
    /// Nothing was eligible or new; the run was a no-op
    NothingNew,
    /// Some events failed (transiently or permanently), others may have succeeded
    Partial { imported: usize, failed: usize },
}

/// Drives the import pipeline over a feed source and a task sink.
///
/// The `Syncer` exclusively owns the [`Ledger`] for the duration of its runs: it is the only
/// component that records identifiers and persists the ledger file.
#[derive(Debug)]
pub struct Syncer<F, S>
where
    F: FeedSource,
    S: TaskSink,
{
    feed: F,
    sink: S,
    importer: TaskImporter,
    ledger: Ledger,
}

impl<F, S> Syncer<F, S>
where
    F: FeedSource,
    S: TaskSink,
{
    pub fn new(feed: F, sink: S, ledger: Ledger) -> Self {
        Self {
            feed,
            sink,
            importer: TaskImporter::new(),
            ledger,
        }
    }

    /// Returns the import ledger in its current in-memory state
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Perform one sync run against the current local date
    pub async fn run_now(&mut self) -> Result<RunSummary, SyncError> {
        self.run(chrono::Local::now().date_naive()).await
    }

    /// Perform one sync run.
    ///
    /// `today` is captured once for the whole run, so every event is filtered against the same
    /// cutoff. A feed error aborts the run before any remote task is created and before any
    /// ledger mutation. Per-event import failures are isolated: one bad event never blocks the
    /// import of the others.
    pub async fn run(&mut self, today: NaiveDate) -> Result<RunSummary, SyncError> {
        log::info!("Starting a sync run (today is {})", today);

        // FETCH + PARSE. Nothing has been mutated yet, so failures here leave no trace.
        let payload = self.feed.fetch().await?;
        let events = feed::parse(&payload)?;
        log::debug!("Feed contains {} events", events.len());

        let mut summary = RunSummary::default();

        // FILTER against a cutoff computed once per run
        let cutoff = eligibility::cutoff(today);
        log::debug!("Importing events that started before {}", cutoff);
        let mut candidates: Vec<&Event> = Vec::new();
        for event in &events {
            if eligibility::is_eligible(cutoff, event) == false {
                summary.ineligible += 1;
            } else if self.ledger.contains(event.uid()) {
                // DEDUPE: ledger membership is only ever checked among eligible events
                log::debug!("Skipping {}: already imported", event.uid());
                summary.already_imported += 1;
            } else {
                candidates.push(event);
            }
        }

        // Deterministic processing order, for reproducible runs and readable logs
        candidates.sort_by(|a, b| {
            a.start_date()
                .cmp(&b.start_date())
                .then_with(|| a.uid().cmp(b.uid()))
        });

        // IMPORT, persisting after every success so that an interrupted run loses at most the
        // in-flight event
        for event in candidates {
            match self.importer.import(&self.sink, event).await {
                Ok(task_id) => {
                    log::info!("Imported \"{}\" as remote task {}", event.title(), task_id);
                    self.ledger.record(event.uid());
                    self.ledger.persist()?;
                    summary.imported += 1;
                }
                Err(ImportError::Transient(reason)) => {
                    log::warn!(
                        "Transient failure importing \"{}\": {}. It will be retried on the next run.",
                        event.title(),
                        reason
                    );
                    summary.transient_failures += 1;
                }
                Err(ImportError::Permanent(reason)) => {
                    log::warn!(
                        "The task service permanently rejected \"{}\": {}. It will not be retried.",
                        event.title(),
                        reason
                    );
                    // Recorded anyway, so the same doomed request is not re-submitted forever
                    self.ledger.record(event.uid());
                    self.ledger.persist()?;
                    summary.permanent_failures += 1;
                }
                Err(ImportError::Auth(reason)) => {
                    // No point trying the remaining events with rejected credentials
                    return Err(SyncError::Auth(reason));
                }
            }
        }

        // PERSIST: final flush as a safety net (the per-success persist above is the primary
        // durability mechanism)
        self.ledger.persist()?;

        log::info!("Sync run finished: {}", summary);
        Ok(summary)
    }
}
