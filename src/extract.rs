//! # Field extraction
//! Turns registry markup into [`CaseRecord`] fields.
//!
//! Nothing here returns an error: a fragment that lacks an expected element
//! simply leaves the corresponding field as `None`. The only hard requirement
//! is the case number; listing fragments without one are dropped by
//! [`listing_records`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::record::CaseRecord;

pub const MATTER_LABEL: &str = "판정사항";
pub const SUMMARY_LABEL: &str = "판정요지";

static LISTING: Lazy<Selector> = Lazy::new(|| Selector::parse("dl.C_Cts").unwrap());
static TITLE_DT: Lazy<Selector> = Lazy::new(|| Selector::parse("dt.tit").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static STRONG: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").unwrap());
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").unwrap());
static DATE_EM: Lazy<Selector> = Lazy::new(|| Selector::parse("em.date").unwrap());
static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// Decode HTML entities, strip tags, trim surrounding whitespace.
pub fn clean_text(s: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*?>").unwrap());
    let decoded = html_escape::decode_html_entities(s);
    RE_TAGS.replace_all(&decoded, "").trim().to_string()
}

fn cleaned(s: &str) -> Option<String> {
    let c = clean_text(s);
    (!c.is_empty()).then_some(c)
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Summary fields of one search-result entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFields {
    pub case_number: Option<String>,
    pub title: Option<String>,
    pub committee: Option<String>,
    pub decision_date: Option<String>,
    pub decision_result: Option<String>,
}

impl ListingFields {
    /// `None` when the case number could not be found.
    pub fn into_record(self) -> Option<CaseRecord> {
        let case_number = self.case_number?;
        let mut rec = CaseRecord::new(case_number);
        rec.title = self.title;
        rec.committee = self.committee;
        rec.decision_date = self.decision_date;
        rec.decision_result = self.decision_result;
        Some(rec)
    }
}

fn extract_listing_fragment(dl: ElementRef<'_>) -> ListingFields {
    let mut out = ListingFields::default();
    let Some(dt) = dl.select(&TITLE_DT).next() else {
        return out;
    };

    if let Some(a) = dt.select(&ANCHOR).next() {
        out.committee = a
            .select(&STRONG)
            .next()
            .and_then(|s| cleaned(&element_text(s)));

        let mut spans = a.select(&SPAN);
        out.case_number = spans.next().and_then(|s| cleaned(&element_text(s)));
        out.title = spans.next().and_then(|s| cleaned(&element_text(s)));
    }

    let mut dates = dt.select(&DATE_EM);
    out.decision_date = dates.next().and_then(|e| cleaned(&element_text(e)));
    out.decision_result = dates
        .next()
        .and_then(|e| cleaned(&element_text(e).replace('|', "")));

    out
}

/// All listing fragments in document order, including ones without a case number.
pub fn extract_listing(html: &str) -> Vec<ListingFields> {
    let doc = Html::parse_document(html);
    doc.select(&LISTING).map(extract_listing_fragment).collect()
}

/// Listing fragments that carry a case number, as records.
pub fn listing_records(html: &str) -> Vec<CaseRecord> {
    extract_listing(html)
        .into_iter()
        .filter_map(ListingFields::into_record)
        .collect()
}

/// Expanded content of one case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub matter: Option<String>,
    pub summary: Option<String>,
}

impl DetailFields {
    pub fn is_empty(&self) -> bool {
        self.matter.is_none() && self.summary.is_none()
    }

    /// Overwrite only the fields that were found.
    pub fn apply_to(self, rec: &mut CaseRecord) {
        if let Some(m) = self.matter {
            rec.decision_matter = Some(m);
        }
        if let Some(s) = self.summary {
            rec.decision_summary = Some(s);
        }
    }
}

pub fn extract_detail(html: &str) -> DetailFields {
    let doc = Html::parse_document(html);
    DetailFields {
        matter: find_labeled_value(&doc, MATTER_LABEL),
        summary: find_labeled_value(&doc, SUMMARY_LABEL),
    }
}

/// The element's text when it is its only content, descending through
/// single-child wrappers. `None` as soon as text and markup are mixed.
fn sole_text(el: ElementRef<'_>) -> Option<String> {
    let mut children = el.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match only.value().as_text() {
        Some(t) => Some(t.to_string()),
        None => ElementRef::wrap(only).and_then(sole_text),
    }
}

/// Descendant text with every fragment trimmed, concatenated.
fn visible_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

fn is_th(el: &ElementRef<'_>) -> bool {
    el.value().name() == "th"
}

/// Value cell for a `th` label: the first `td` after it in document order.
///
/// A header whose sole content is exactly `label` wins, so `판정요지` never
/// matches `판정요지 원문` or `판정요지 <em>(원문)</em>`. Only when none exists
/// is a header accepted whose trimmed text fragments concatenate to `label`.
pub fn find_labeled_value(doc: &Html, label: &str) -> Option<String> {
    let cells: Vec<ElementRef<'_>> = doc.select(&CELLS).collect();

    let header = cells
        .iter()
        .position(|c| is_th(c) && sole_text(*c).is_some_and(|t| t.trim() == label))
        .or_else(|| {
            cells.iter().position(|c| {
                is_th(c) && element_text(*c).contains(label) && visible_text(*c) == label
            })
        })?;

    cells[header + 1..]
        .iter()
        .find(|c| c.value().name() == "td")
        .and_then(|td| cleaned(&element_text(*td)))
}
