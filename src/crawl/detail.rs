use metrics::counter;
use tokio::time::{sleep, timeout};

use crate::browse::{Page, ResponseMatch};
use crate::config::Settings;
use crate::extract::extract_detail;
use crate::record::CaseRecord;

/// Open the detail view of every record in turn and merge matter/summary into it.
///
/// Records are never dropped here. On a timeout or failed response the record
/// keeps its listing-only fields. After every attempt the page's overlay state
/// is cleared and a short pause lets the layout settle.
pub async fn enrich_details(page: &mut dyn Page, settings: &Settings, records: &mut [CaseRecord]) {
    let total = records.len();
    let expect = ResponseMatch::ok(settings.detail_response.as_str());

    for (i, rec) in records.iter_mut().enumerate() {
        tracing::info!(case_number = %rec.case_number, "[{}/{}] fetching detail", i + 1, total);
        let selector = settings.detail_selector(&rec.case_number);

        match timeout(settings.detail_timeout(), page.click_and_await(&selector, &expect)).await {
            Ok(Ok(body)) => {
                let fields = extract_detail(&body);
                if fields.is_empty() {
                    tracing::warn!(case_number = %rec.case_number, "detail view had no matter/summary");
                }
                fields.apply_to(rec);
            }
            Ok(Err(e)) => {
                counter!("monitor_detail_failures_total").increment(1);
                tracing::warn!(case_number = %rec.case_number, "detail fetch failed: {e:#}");
            }
            Err(_) => {
                counter!("monitor_detail_failures_total").increment(1);
                tracing::warn!(
                    case_number = %rec.case_number,
                    timeout_secs = settings.detail_timeout_secs,
                    "detail response timed out"
                );
            }
        }

        if let Err(e) = page.reset_interaction_surface().await {
            tracing::warn!("overlay reset failed: {e:#}");
        }
        sleep(settings.detail_pause()).await;
    }
}
