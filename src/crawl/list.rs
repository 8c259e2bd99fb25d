use anyhow::{Context, Result};
use metrics::counter;
use tokio::time::timeout;

use crate::browse::{Page, ResponseMatch};
use crate::config::Settings;
use crate::extract::listing_records;
use crate::record::{CaseRecord, Category};

/// Run one category search on `page` and return the listed records, in page order.
///
/// Only navigation and input failures are errors. A listing response that
/// does not arrive in time is replaced by the page's current markup.
pub async fn search_category(
    page: &mut dyn Page,
    settings: &Settings,
    category: Category,
) -> Result<Vec<CaseRecord>> {
    tracing::info!(category = %category, url = %settings.search_url, "opening search page");
    timeout(settings.navigation_timeout(), page.goto(&settings.search_url))
        .await
        .with_context(|| format!("navigation to {} timed out", settings.search_url))??;

    page.fill(&settings.query_selector, category.keyword())
        .await
        .context("fill search query")?;

    let expect = ResponseMatch::ok(settings.list_response.as_str());
    let markup = match timeout(
        settings.list_timeout(),
        page.click_and_await(&settings.search_button_selector, &expect),
    )
    .await
    {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            tracing::warn!(category = %category, "listing response failed, using current page: {e:#}");
            page.content().await.context("read fallback page content")?
        }
        Err(_) => {
            tracing::warn!(
                category = %category,
                timeout_secs = settings.list_timeout_secs,
                "listing response timed out, using current page"
            );
            page.content().await.context("read fallback page content")?
        }
    };

    let records = listing_records(&markup);
    counter!("monitor_listings_total").increment(records.len() as u64);
    tracing::info!(category = %category, found = records.len(), "listing parsed");
    Ok(records)
}
