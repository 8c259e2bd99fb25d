//! # Case records
//! One adjudicated case as scraped from the registry, plus the fixed set of
//! case categories the monitor searches.
//!
//! Fields the markup did not provide stay `None`; the `*_label` accessors
//! render them with the placeholder text used in notifications.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "최신 판정 사례";
pub const DEFAULT_COMMITTEE: &str = "중앙노동위원회";
pub const DEFAULT_RESULT: &str = "결과 미표기";
pub const DEFAULT_DATE: &str = "날짜 미표기";
pub const NO_DETAIL: &str = "상세 내용 없음";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_number: String,
    pub title: Option<String>,
    pub committee: Option<String>,
    pub decision_result: Option<String>,
    /// Raw `YYYY.MM.DD` text as shown on the listing.
    pub decision_date: Option<String>,
    pub decision_matter: Option<String>,
    pub decision_summary: Option<String>,
}

impl CaseRecord {
    /// Listing-only record: matter/summary are filled later by the detail fetch.
    pub fn new(case_number: impl Into<String>) -> Self {
        Self {
            case_number: case_number.into(),
            title: None,
            committee: None,
            decision_result: None,
            decision_date: None,
            decision_matter: None,
            decision_summary: None,
        }
    }

    pub fn title_label(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn committee_label(&self) -> &str {
        self.committee.as_deref().unwrap_or(DEFAULT_COMMITTEE)
    }

    pub fn result_label(&self) -> &str {
        self.decision_result.as_deref().unwrap_or(DEFAULT_RESULT)
    }

    pub fn date_label(&self) -> &str {
        self.decision_date.as_deref().unwrap_or(DEFAULT_DATE)
    }

    pub fn matter_label(&self) -> &str {
        self.decision_matter.as_deref().unwrap_or(NO_DETAIL)
    }

    pub fn summary_label(&self) -> &str {
        self.decision_summary.as_deref().unwrap_or(NO_DETAIL)
    }

    /// True once a detail fetch has contributed at least one field.
    pub fn has_detail(&self) -> bool {
        self.decision_matter.is_some() || self.decision_summary.is_some()
    }
}

/// Case-type keyword typed into the registry search box.
///
/// Declaration order is the order categories are searched in each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    UnfairDismissal,
    UnfairLaborPractice,
    Discrimination,
    BargainingChannel,
    BargainingUnit,
    FairRepresentation,
    CollectiveAgreement,
    Damages,
    Resolution,
    ShutdownAllowance,
    AccidentCompensation,
    SickLeave,
    LaborManagementCouncil,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::UnfairDismissal,
        Category::UnfairLaborPractice,
        Category::Discrimination,
        Category::BargainingChannel,
        Category::BargainingUnit,
        Category::FairRepresentation,
        Category::CollectiveAgreement,
        Category::Damages,
        Category::Resolution,
        Category::ShutdownAllowance,
        Category::AccidentCompensation,
        Category::SickLeave,
        Category::LaborManagementCouncil,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Category::UnfairDismissal => "부해",
            Category::UnfairLaborPractice => "부노",
            Category::Discrimination => "차별",
            Category::BargainingChannel => "교섭",
            Category::BargainingUnit => "단위",
            Category::FairRepresentation => "공정",
            Category::CollectiveAgreement => "단협",
            Category::Damages => "손해",
            Category::Resolution => "의결",
            Category::ShutdownAllowance => "휴업",
            Category::AccidentCompensation => "재해",
            Category::SickLeave => "상병",
            Category::LaborManagementCouncil => "노협",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| c.keyword() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::from_keyword(&value).ok_or_else(|| format!("unknown case category: {value}"))
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.keyword().to_string()
    }
}
