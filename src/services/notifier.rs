use async_trait::async_trait;
use reqwest::Url;
use std::fmt::Write;
use thiserror::Error;

use crate::analytics::AlertDecision;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram sendMessage returned {0}")]
    Rejected(String),

    #[error("invalid Telegram URL: {0}")]
    InvalidUrl(String),
}

/// Destination for alert messages.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Telegram notification service. The response body is ignored.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(http: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http,
            bot_token,
            chat_id,
        }
    }
}

#[async_trait]
impl AlertSink for Notifier {
    /// Send a plain-text Telegram message to the configured chat.
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let url = send_message_url(&self.bot_token, &self.chat_id, message)?;
        let resp = self.http.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(resp.status().to_string()));
        }

        Ok(())
    }
}

/// `sendMessage` URL with `chat_id` and `text` form-encoded into the query.
pub fn send_message_url(bot_token: &str, chat_id: &str, text: &str) -> Result<Url, NotifyError> {
    Url::parse_with_params(
        &format!("https://api.telegram.org/bot{bot_token}/sendMessage"),
        &[("chat_id", chat_id), ("text", text)],
    )
    .map_err(|e| NotifyError::InvalidUrl(e.to_string()))
}

/// Format an open interest alert listing every asset that crossed both gates.
pub fn format_open_interest_alert(decision: &AlertDecision) -> String {
    let mut message = String::from("Open interest alert");
    for delta in decision.exceeded() {
        let _ = write!(
            message,
            "\n{} net exposure moved {} USD ({}): {} -> {}",
            delta.asset,
            delta.absolute_delta.round_dp(2),
            delta.relative_delta,
            delta.net_previous.round_dp(2),
            delta.net_current.round_dp(2),
        );
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AssetDelta, RelativeDelta};
    use crate::models::Asset;
    use rust_decimal::Decimal;

    fn delta(asset: Asset, previous: i64, current: i64, exceeded: bool) -> AssetDelta {
        let previous = Decimal::from(previous);
        let current = Decimal::from(current);
        let absolute_delta = (current - previous).abs();
        AssetDelta {
            asset,
            net_previous: previous,
            net_current: current,
            absolute_delta,
            relative_delta: if previous.is_zero() {
                RelativeDelta::Unbounded
            } else {
                RelativeDelta::Finite(absolute_delta / previous.abs())
            },
            exceeded,
        }
    }

    #[test]
    fn test_alert_lists_only_exceeded_assets() {
        let decision = AlertDecision {
            assets: [
                delta(Asset::Sol, 50_000_000, 61_000_000, true),
                delta(Asset::Btc, 50_000_000, 56_000_000, false),
                delta(Asset::Eth, 0, -25_000_000, true),
            ],
        };
        let message = format_open_interest_alert(&decision);

        assert_eq!(
            message,
            "Open interest alert\n\
             SOL net exposure moved 11000000 USD (22.00%): 50000000 -> 61000000\n\
             ETH net exposure moved 25000000 USD (n/a): 0 -> -25000000"
        );
        assert!(!message.contains("BTC"));
    }

    #[test]
    fn test_send_message_url_encodes_query() {
        let url = send_message_url("123:ABC", "-100123", "SOL moved +11% & more\nline").unwrap();

        assert_eq!(url.host_str(), Some("api.telegram.org"));
        assert_eq!(url.path(), "/bot123:ABC/sendMessage");
        assert_eq!(
            url.query(),
            Some("chat_id=-100123&text=SOL+moved+%2B11%25+%26+more%0Aline")
        );

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("chat_id".to_string(), "-100123".to_string()),
                ("text".to_string(), "SOL moved +11% & more\nline".to_string()),
            ]
        );
    }
}
