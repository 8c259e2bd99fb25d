use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::Notifier;
use crate::config::Transport;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    transport: Transport,
    client: Client,
    api_base: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            client: Client::new(),
            api_base: API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Transport::from_env())
    }

    /// Optional builder for tests/tools
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_enabled()
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let Transport::Telegram { token, chat_id } = &self.transport else {
            tracing::warn!("Telegram disabled (TELEGRAM_TOKEN / CHAT_ID not set); message dropped");
            return Ok(());
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), token);
        tracing::debug!(chat_id = %chat_id, "sending telegram message");

        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .form(&[("chat_id", chat_id.as_str()), ("text", text)])
            .send()
            .await
            .context("telegram post")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("telegram HTTP {status}: {body}"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_transport_is_a_noop() {
        let n = TelegramNotifier::new(Transport::Disabled).with_api_base("http://127.0.0.1:9");
        assert!(!n.is_enabled());
        n.send("hello").await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        let n = TelegramNotifier::new(Transport::Telegram {
            token: "1:a".into(),
            chat_id: "2".into(),
        })
        .with_api_base("http://127.0.0.1:9")
        .with_timeout(2);
        assert!(n.send("hello").await.is_err());
    }
}
