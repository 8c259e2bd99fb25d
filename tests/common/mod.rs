// tests/common/mod.rs
// Scripted stand-in for the registry: canned listing per search keyword and
// canned detail views per case number.
#![allow(dead_code)]

use anyhow::{anyhow, bail, Result};
use judgment_monitor::browse::{Browser, Page, ResponseMatch};
use judgment_monitor::{Category, Settings};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct Entry {
    pub case_number: &'static str,
    pub date: &'static str,
    pub result: &'static str,
}

pub fn entry(case_number: &'static str, date: &'static str) -> Entry {
    Entry {
        case_number,
        date,
        result: "기각",
    }
}

pub fn listing_html(entries: &[Entry]) -> String {
    let mut out = String::from("<div class=\"searchList\">");
    for e in entries {
        out.push_str(&format!(
            r##"<dl class="C_Cts"><dt class="tit">
                 <a href="#none" data-k2="{cn}"><strong>중앙노동위원회</strong>
                   <span>{cn}</span><span>{cn} 구제 재심신청</span></a>
                 <em class="date">{date}</em><em class="date">| {res}</em>
               </dt></dl>"##,
            cn = e.case_number,
            date = e.date,
            res = e.result
        ));
    }
    out.push_str("</div>");
    out
}

pub fn detail_html(case_number: &str) -> String {
    format!(
        r#"<table><tr><th>판정사항</th><td>{case_number} 판정사항</td></tr>
           <tr><th>판정요지</th><td>{case_number} 판정요지</td></tr></table>"#
    )
}

#[derive(Default)]
pub struct FakeSite {
    /// Search page markup shown right after navigation.
    pub landing: String,
    pub listings: HashMap<String, String>,
    pub details: HashMap<String, String>,
    /// Keywords whose listing response never arrives.
    pub stalled_listings: HashSet<String>,
    /// Keywords whose search box cannot be filled.
    pub broken_search: HashSet<String>,
    pub failing_details: HashSet<String>,
    pub stalled_details: HashSet<String>,
    pub detail_clicks: Mutex<Vec<String>>,
    pub resets: AtomicUsize,
}

impl FakeSite {
    pub fn with_listing(mut self, category: Category, entries: &[Entry]) -> Self {
        for e in entries {
            self.details
                .insert(e.case_number.to_string(), detail_html(e.case_number));
        }
        self.listings
            .insert(category.keyword().to_string(), listing_html(entries));
        self
    }

    pub fn detail_clicks(&self) -> Vec<String> {
        self.detail_clicks.lock().unwrap().clone()
    }
}

pub struct FakeBrowser {
    pub site: Arc<FakeSite>,
    pub pages_opened: AtomicUsize,
    pub fail_launch: bool,
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            pages_opened: AtomicUsize::new(0),
            fail_launch: false,
        }
    }
}

#[async_trait::async_trait]
impl Browser for FakeBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>> {
        if self.fail_launch {
            bail!("browser executable not found");
        }
        self.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            site: self.site.clone(),
            query: None,
            current: String::new(),
            overlay_open: false,
        }))
    }
}

struct FakePage {
    site: Arc<FakeSite>,
    query: Option<String>,
    current: String,
    overlay_open: bool,
}

fn case_from_selector(selector: &str) -> Option<String> {
    let start = selector.find("data-k2=\"")? + "data-k2=\"".len();
    let end = selector[start..].find('"')? + start;
    Some(selector[start..end].to_string())
}

#[async_trait::async_trait]
impl Page for FakePage {
    async fn goto(&mut self, _url: &str) -> Result<()> {
        self.current = self.site.landing.clone();
        self.query = None;
        self.overlay_open = false;
        Ok(())
    }

    async fn fill(&mut self, _selector: &str, value: &str) -> Result<()> {
        if self.site.broken_search.contains(value) {
            bail!("search box not found");
        }
        self.query = Some(value.to_string());
        Ok(())
    }

    async fn click_and_await(&mut self, selector: &str, expect: &ResponseMatch) -> Result<String> {
        if expect.url_contains.contains("list") {
            let q = self.query.clone().unwrap_or_default();
            if self.site.stalled_listings.contains(&q) {
                return std::future::pending::<Result<String>>().await;
            }
            let body = self
                .site
                .listings
                .get(&q)
                .cloned()
                .unwrap_or_else(|| listing_html(&[]));
            self.current = body.clone();
            return Ok(body);
        }

        if self.overlay_open {
            bail!("click intercepted by open overlay");
        }
        let case = case_from_selector(selector).ok_or_else(|| anyhow!("bad selector {selector}"))?;
        self.site.detail_clicks.lock().unwrap().push(case.clone());
        if self.site.stalled_details.contains(&case) {
            self.overlay_open = true;
            return std::future::pending::<Result<String>>().await;
        }
        self.overlay_open = true;
        if self.site.failing_details.contains(&case) {
            bail!("detail.do returned 500");
        }
        self.site
            .details
            .get(&case)
            .cloned()
            .ok_or_else(|| anyhow!("no detail for {case}"))
    }

    async fn content(&mut self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn reset_interaction_surface(&mut self) -> Result<()> {
        self.overlay_open = false;
        self.site.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Defaults with no pauses and short timeouts, state under `dir`.
pub fn fast_settings(dir: &Path, categories: &[Category]) -> Settings {
    Settings {
        categories: categories.to_vec(),
        state_path: dir.join("last_case.json"),
        category_pause_ms: 0,
        detail_pause_ms: 0,
        list_timeout_secs: 1,
        detail_timeout_secs: 1,
        navigation_timeout_secs: 1,
        ..Settings::default()
    }
}

/// Case numbers in the order messages were recorded.
pub fn sent_cases(messages: &[String]) -> Vec<String> {
    messages
        .iter()
        .map(|m| {
            m.lines()
                .find_map(|l| l.strip_prefix("🔢 사건번호: "))
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}
