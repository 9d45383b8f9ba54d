use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{MessageInput, NluClient, NluError, NluResponse};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::CoreError;

const DEFAULT_VERSION: &str = "2018-09-20";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings for the Watson Assistant v1 message API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatsonConfig {
    pub url: String,
    pub api_key: String,
    pub workspace_id: String,
    pub version: String,
    pub timeout_ms: u64,
}

impl WatsonConfig {
    /// Reads `STOCKASK_NLU_*` variables, loading a `.env` file first when present.
    pub fn from_env() -> Result<Self, CoreError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| CoreError::Config(format!("{key} must be set")))
        };

        let url = required("STOCKASK_NLU_URL")?;
        let api_key = required("STOCKASK_NLU_API_KEY")?;
        let workspace_id = required("STOCKASK_NLU_WORKSPACE_ID")?;
        let version = lookup("STOCKASK_NLU_VERSION")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| String::from(DEFAULT_VERSION));
        let timeout_ms = match lookup("STOCKASK_NLU_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CoreError::Config(format!(
                    "STOCKASK_NLU_TIMEOUT_MS must be a whole number of milliseconds: '{raw}'"
                ))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            url: url.trim_end_matches('/').to_owned(),
            api_key,
            workspace_id,
            version,
            timeout_ms,
        })
    }

    pub fn message_url(&self) -> String {
        format!(
            "{}/v1/workspaces/{}/message?version={}",
            self.url,
            urlencoding::encode(&self.workspace_id),
            urlencoding::encode(&self.version)
        )
    }
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    input: MessageInputRef<'a>,
}

#[derive(Serialize)]
struct MessageInputRef<'a> {
    text: &'a str,
}

/// [`NluClient`] backed by a Watson Assistant workspace.
#[derive(Clone)]
pub struct WatsonAssistant {
    config: WatsonConfig,
    http_client: Arc<dyn HttpClient>,
}

impl WatsonAssistant {
    pub fn new(config: WatsonConfig) -> Result<Self, NluError> {
        let transport = ReqwestHttpClient::new().map_err(|e| NluError::unavailable(e.to_string()))?;
        Ok(Self::with_http_client(config, Arc::new(transport)))
    }

    pub fn with_http_client(config: WatsonConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    async fn send(&self, text: &str) -> Result<NluResponse, NluError> {
        let body = serde_json::to_string(&MessageRequest {
            input: MessageInputRef { text },
        })
        .map_err(|e| NluError::invalid_response(format!("failed to encode message: {e}")))?;

        let request = HttpRequest::post_json(self.config.message_url(), body)
            .basic_auth("apikey", &self.config.api_key)
            .with_timeout_ms(self.config.timeout_ms);

        debug!(workspace = %self.config.workspace_id, "sending message to watson assistant");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| NluError::unavailable(format!("watson unreachable: {e}")))?;

        match response.status {
            401 | 403 => {
                return Err(NluError::unauthorized(format!(
                    "watson rejected credentials with status {}",
                    response.status
                )));
            }
            status if !response.is_success() => {
                return Err(NluError::unavailable(format!(
                    "watson returned status {status}"
                )));
            }
            _ => {}
        }

        let mut parsed: NluResponse = serde_json::from_str(&response.body).map_err(|e| {
            NluError::invalid_response(format!("failed to parse watson response: {e}"))
        })?;

        if parsed.input.text.is_empty() {
            parsed.input = MessageInput {
                text: text.to_owned(),
            };
        }

        debug!(
            entities = parsed.entities.len(),
            intents = parsed.intents.len(),
            "watson message parsed"
        );
        Ok(parsed)
    }
}

impl NluClient for WatsonAssistant {
    fn message<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<NluResponse, NluError>> + Send + 'a>> {
        Box::pin(self.send(text))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse, StaticHttpClient};
    use crate::nlu::NluErrorKind;
    use crate::Entity;

    fn config() -> WatsonConfig {
        WatsonConfig {
            url: String::from("https://nlu.example.test/assistant"),
            api_key: String::from("secret"),
            workspace_id: String::from("ws-1"),
            version: String::from(DEFAULT_VERSION),
            timeout_ms: 250,
        }
    }

    #[test]
    fn config_requires_credentials_and_applies_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STOCKASK_NLU_URL", "https://nlu.example.test/assistant/"),
            ("STOCKASK_NLU_API_KEY", "secret"),
            ("STOCKASK_NLU_WORKSPACE_ID", "ws-1"),
        ]);
        let loaded = WatsonConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_owned()))
            .expect("complete config");
        assert_eq!(loaded.url, "https://nlu.example.test/assistant");
        assert_eq!(loaded.version, "2018-09-20");
        assert_eq!(loaded.timeout_ms, 10_000);

        let err = WatsonConfig::from_lookup(|key| {
            (key != "STOCKASK_NLU_API_KEY")
                .then(|| vars.get(key).map(|v| (*v).to_owned()))
                .flatten()
        })
        .expect_err("missing key");
        assert!(err.to_string().contains("STOCKASK_NLU_API_KEY"));
    }

    #[tokio::test]
    async fn posts_text_with_basic_auth() {
        let http = Arc::new(StaticHttpClient::responding(HttpResponse::ok_json(
            r#"{"input":{"text":"max of AAPL"},"entities":[{"entity":"company","value":"AAPL","confidence":1}],"intents":[]}"#,
        )));
        let client = WatsonAssistant::with_http_client(config(), http.clone());

        let response = client.message("max of AAPL").await.expect("message succeeds");
        assert_eq!(response.values_of(Entity::Company).next(), Some("AAPL"));

        let sent = http.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url,
            "https://nlu.example.test/assistant/v1/workspaces/ws-1/message?version=2018-09-20"
        );
        assert_eq!(sent[0].body, r#"{"input":{"text":"max of AAPL"}}"#);
        assert!(sent[0]
            .headers
            .get("authorization")
            .is_some_and(|value| value.starts_with("Basic ")));
        assert_eq!(sent[0].timeout_ms, 250);
    }

    #[tokio::test]
    async fn maps_failures_to_error_kinds() {
        let unauthorized = WatsonAssistant::with_http_client(
            config(),
            Arc::new(StaticHttpClient::responding(HttpResponse::with_status(401, "{}"))),
        );
        let err = unauthorized.message("hi").await.expect_err("must fail");
        assert_eq!(err.kind(), NluErrorKind::Unauthorized);

        let down = WatsonAssistant::with_http_client(
            config(),
            Arc::new(StaticHttpClient::failing(HttpError::Connect(String::from(
                "connection refused",
            )))),
        );
        let err = down.message("hi").await.expect_err("must fail");
        assert_eq!(err.kind(), NluErrorKind::Unavailable);

        let garbled = WatsonAssistant::with_http_client(
            config(),
            Arc::new(StaticHttpClient::responding(HttpResponse::ok_json("not json"))),
        );
        let err = garbled.message("hi").await.expect_err("must fail");
        assert_eq!(err.kind(), NluErrorKind::InvalidResponse);
    }
}
