//! # Poller
//! One monitoring cycle: search every category, enrich the newest records,
//! rank everything by decision date and notify what has not been sent yet.
//! [`Poller::run`] repeats cycles on an interval until cancelled, or returns
//! after one cycle in test and single-shot runs.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::browse::{Browser, Page};
use crate::config::Settings;
use crate::crawl::{enrich_details, search_category};
use crate::notify::{format_message, Notifier};
use crate::rank::rank;
use crate::record::CaseRecord;
use crate::seen::{SeenSet, SeenStore};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_cycles_total", "Completed polling cycles.");
        describe_counter!("monitor_listings_total", "Listing records parsed.");
        describe_counter!(
            "monitor_detail_failures_total",
            "Detail views that timed out or failed."
        );
        describe_counter!(
            "monitor_category_errors_total",
            "Category searches that failed outright."
        );
        describe_counter!("monitor_notifications_total", "Notifications dispatched.");
        describe_gauge!("monitor_last_cycle_ts", "Unix ts when the last cycle finished.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dry run: newest `count` records are sent regardless of history.
    Test,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: Mode,
    pub count: usize,
    /// Stop after one cycle (CI / scheduled runs).
    pub single_shot: bool,
}

impl RunPlan {
    pub fn test(count: usize) -> Self {
        Self {
            mode: Mode::Test,
            count: count.max(1),
            single_shot: true,
        }
    }

    pub fn production(single_shot: bool) -> Self {
        Self {
            mode: Mode::Production,
            count: 1,
            single_shot,
        }
    }

    pub fn is_test(&self) -> bool {
        self.mode == Mode::Test
    }

    pub fn runs_once(&self) -> bool {
        self.is_test() || self.single_shot
    }

    /// Records taken from each category search.
    pub fn fetch_count(&self, continuous: usize) -> usize {
        if self.runs_once() {
            self.count
        } else {
            continuous
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub collected: usize,
    /// Case numbers in the order they were sent.
    pub dispatched: Vec<String>,
    pub skipped: usize,
}

/// Records considered for dispatch, newest first.
///
/// Test runs take the newest `count`. Production takes everything, or with
/// `stop_at_first_seen` only the records newer than the first one already in
/// `seen`.
pub fn select_window<'a>(
    ranked: &'a [CaseRecord],
    plan: &RunPlan,
    seen: &SeenSet,
    stop_at_first_seen: bool,
) -> &'a [CaseRecord] {
    match plan.mode {
        Mode::Test => &ranked[..plan.count.min(ranked.len())],
        Mode::Production if stop_at_first_seen => {
            let cut = ranked
                .iter()
                .position(|r| seen.contains(&r.case_number))
                .unwrap_or(ranked.len());
            &ranked[..cut]
        }
        Mode::Production => ranked,
    }
}

/// Send the window oldest-first.
///
/// In production every sent case number is added to `seen` and persisted right
/// away; already-seen ones are skipped. Delivery failures are logged and the
/// case still counts as sent, so a broken transport never causes a resend storm.
pub async fn dispatch(
    window: &[CaseRecord],
    plan: &RunPlan,
    seen: &mut SeenSet,
    store: &SeenStore,
    notifier: &dyn Notifier,
) -> (Vec<String>, usize) {
    let mut sent = Vec::new();
    let mut skipped = 0usize;

    for rec in window.iter().rev() {
        if !plan.is_test() && seen.contains(&rec.case_number) {
            tracing::debug!(case_number = %rec.case_number, "already notified");
            skipped += 1;
            continue;
        }

        tracing::info!(
            case_number = %rec.case_number,
            committee = rec.committee_label(),
            "dispatching notification"
        );
        if let Err(e) = notifier.send(&format_message(rec)).await {
            tracing::warn!(notifier = notifier.name(), case_number = %rec.case_number, "send failed: {e:#}");
        }
        counter!("monitor_notifications_total").increment(1);
        sent.push(rec.case_number.clone());

        if !plan.is_test() {
            seen.insert(rec.case_number.clone());
            if let Err(e) = store.save(seen).await {
                tracing::warn!(path = %store.path().display(), "persist seen-case state: {e:#}");
            }
        }
    }

    (sent, skipped)
}

pub struct Poller {
    browser: Arc<dyn Browser>,
    notifier: Arc<dyn Notifier>,
    store: SeenStore,
    settings: Settings,
    plan: RunPlan,
}

impl Poller {
    pub fn new(
        browser: Arc<dyn Browser>,
        notifier: Arc<dyn Notifier>,
        settings: Settings,
        plan: RunPlan,
    ) -> Self {
        let store = SeenStore::new(settings.state_path.clone()).with_capacity(settings.seen_capacity);
        Self {
            browser,
            notifier,
            store,
            settings,
            plan,
        }
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    /// Search every configured category in order and enrich each one's newest records.
    /// A failing category contributes nothing; the rest still run.
    pub async fn collect(&self, page: &mut dyn Page) -> Vec<CaseRecord> {
        let per_category = self.plan.fetch_count(self.settings.continuous_fetch_count);
        let mut all = Vec::new();

        for category in &self.settings.categories {
            tracing::info!(category = %category, per_category, "searching category");
            match search_category(&mut *page, &self.settings, *category).await {
                Ok(mut records) => {
                    rank(&mut records);
                    records.truncate(per_category);
                    enrich_details(&mut *page, &self.settings, &mut records).await;
                    all.extend(records);
                }
                Err(e) => {
                    counter!("monitor_category_errors_total").increment(1);
                    tracing::warn!(category = %category, "category search failed: {e:#}");
                }
            }
            sleep(self.settings.category_pause()).await;
        }

        all
    }

    /// Run exactly one cycle. Only failing to open a page is an error.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        ensure_metrics_described();

        let mut seen = self.store.load().await;
        tracing::info!(
            categories = self.settings.categories.len(),
            seen = seen.len(),
            mode = ?self.plan.mode,
            "starting cycle"
        );

        let mut page = self.browser.new_page().await.context("launch browser page")?;
        let mut records = self.collect(page.as_mut()).await;
        drop(page);

        rank(&mut records);
        let window = select_window(&records, &self.plan, &seen, self.settings.stop_at_first_seen);
        let (dispatched, skipped) =
            dispatch(window, &self.plan, &mut seen, &self.store, self.notifier.as_ref()).await;

        counter!("monitor_cycles_total").increment(1);
        gauge!("monitor_last_cycle_ts").set(chrono::Utc::now().timestamp() as f64);

        let report = CycleReport {
            collected: records.len(),
            dispatched,
            skipped,
        };
        tracing::info!(
            collected = report.collected,
            dispatched = report.dispatched.len(),
            skipped = report.skipped,
            "cycle finished"
        );
        Ok(report)
    }

    /// Cycle until `cancel` fires, waiting the poll interval in between.
    /// Test and single-shot plans return after the first cycle.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        loop {
            self.run_cycle().await?;

            if self.plan.runs_once() {
                if self.plan.is_test() {
                    tracing::info!("test run finished");
                } else {
                    tracing::info!("single-shot run finished");
                }
                return Ok(());
            }

            tracing::info!(
                interval_secs = self.settings.poll_interval_secs,
                "waiting for next cycle"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("stop requested");
                    return Ok(());
                }
                _ = sleep(self.settings.poll_interval()) => {}
            }
        }
    }
}
