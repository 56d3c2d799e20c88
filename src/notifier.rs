//! Chat notifications
//!
//! [`Messenger`] abstracts the chat service; [`TelegramBot`] implements it
//! against the Telegram Bot API. [`Notifier`] binds a messenger to the
//! configured chat and makes every send fire-and-forget: failures are logged
//! and swallowed so a rejected message never aborts a poll cycle.

use crate::config::TelegramConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// A chat service that can deliver plain-text messages
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `chat_id`
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()>;
}

/// `sendMessage` request body
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API response is wrapped in
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client
pub struct TelegramBot {
    /// HTTP client with the configured request timeout
    http_client: reqwest::Client,

    /// Full `sendMessage` URL, token included
    send_message_url: String,
}

impl TelegramBot {
    /// Create a new bot handle
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            send_message_url: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                token
            ),
        })
    }
}

#[async_trait]
impl Messenger for TelegramBot {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let response = self
            .http_client
            .post(&self.send_message_url)
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            // The URL embeds the bot token; keep it out of the error message
            .map_err(|e| Error::Network(e.without_url()))?;

        let status = response.status();
        let body: Option<BotApiResponse> = response.json().await.ok();

        match body {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiResponse { description, .. }) => Err(Error::Delivery(format!(
                "Telegram returned status {}: {}",
                status.as_u16(),
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(Error::Delivery(format!(
                "Telegram returned status {} with an unreadable body",
                status.as_u16()
            ))),
        }
    }
}

/// Sends notifications to the configured chat
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    chat_id: String,
}

impl Notifier {
    /// Bind a messenger to a chat
    pub fn new(messenger: Arc<dyn Messenger>, chat_id: impl Into<String>) -> Self {
        Self {
            messenger,
            chat_id: chat_id.into(),
        }
    }

    /// Chat the notifications go to
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send `message`, returning whether it was delivered
    ///
    /// Never fails: delivery errors are logged and swallowed, and there is no
    /// retry.
    pub async fn send(&self, message: &str) -> bool {
        match self.messenger.send_message(&self.chat_id, message).await {
            Ok(()) => {
                debug!(chat_id = %self.chat_id, "Message sent");
                true
            }
            Err(e) => {
                error!(
                    chat_id = %self.chat_id,
                    error = %e,
                    code = e.error_code(),
                    transient = e.is_transient(),
                    "Failed to send message"
                );
                false
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn bot_for(server: &MockServer) -> TelegramBot {
        let config = TelegramConfig {
            api_base: server.uri(),
            timeout: Duration::from_secs(5),
        };
        TelegramBot::new(&config, "123:secret").unwrap()
    }

    #[tokio::test]
    async fn test_send_message_posts_to_bot_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:secret/sendMessage"))
            .and(body_json(serde_json::json!({"chat_id": "42", "text": "hello"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true, "result": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        bot_for(&server).send_message("42", "hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_message_rejected_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = bot_for(&server).send_message("42", "hello").await.unwrap_err();
        match err {
            Error::Delivery(message) => {
                assert!(message.contains("chat not found"));
                assert!(!message.contains("secret"));
            }
            other => panic!("expected delivery error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_message_unreadable_body_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = bot_for(&server).send_message("42", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Delivery(ref m) if m.contains("502")));
    }

    #[tokio::test]
    async fn test_send_message_not_ok_with_200_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false,
                "description": "Bad Request: message text is empty"
            })))
            .mount(&server)
            .await;

        let err = bot_for(&server).send_message("42", "").await.unwrap_err();
        assert!(matches!(err, Error::Delivery(ref m) if m.contains("message text is empty")));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_send_message_connection_refused_is_transient_network_error() {
        // Bind then drop so nothing listens on the port
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = TelegramConfig {
            api_base: format!("http://127.0.0.1:{port}"),
            timeout: Duration::from_secs(5),
        };
        let bot = TelegramBot::new(&config, "123:secret").unwrap();

        let err = bot.send_message("42", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.is_transient());
        assert!(!err.to_string().contains("secret"));
    }

    struct FlakyMessenger {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Messenger for FlakyMessenger {
        async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Delivery("Forbidden: bot was blocked by the user".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notifier_delivers_to_configured_chat() {
        let messenger = Arc::new(FlakyMessenger {
            fail: false,
            sent: Mutex::new(vec![]),
        });
        let notifier = Notifier::new(messenger.clone(), "42");

        assert!(notifier.send("status changed").await);
        assert_eq!(
            *messenger.sent.lock().unwrap(),
            vec![("42".to_string(), "status changed".to_string())]
        );
    }

    #[tokio::test]
    async fn test_notifier_swallows_delivery_failures() {
        let notifier = Notifier::new(
            Arc::new(FlakyMessenger {
                fail: true,
                sent: Mutex::new(vec![]),
            }),
            "42",
        );

        assert!(!notifier.send("status changed").await);
    }
}
