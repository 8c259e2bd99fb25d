pub mod telegram;

use anyhow::Result;
use std::sync::Mutex;

use crate::record::CaseRecord;

pub use telegram::TelegramNotifier;

/// Max characters of the decision summary carried in a message.
pub const SUMMARY_LIMIT: usize = 1000;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Plain-text body for one newly published decision.
pub fn format_message(rec: &CaseRecord) -> String {
    let summary: String = rec.summary_label().chars().take(SUMMARY_LIMIT).collect();
    format!(
        "🚨 [노동위원회 판정·결정요지 신규 업데이트]\n\n\
         🏢 위원회: {}\n\
         🔢 사건번호: {}\n\
         📅 판정일: {}\n\
         ⚖️ 판정결과: {}\n\
         📝 제목: {}\n\n\
         ✅ [판정사항]\n{}\n\n\
         📖 [판정요지]\n{}",
        rec.committee_label(),
        rec.case_number,
        rec.date_label(),
        rec.result_label(),
        rec.title_label(),
        rec.matter_label(),
        summary,
    )
}

// --- Test helper ---
/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
