use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Message;
use crate::providers::http_errors::{
    is_transient_request_error, is_transient_status, model_api_request_error,
};

const BASE_RETRY_DELAY: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

enum AttemptError {
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

fn chat_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

/// Sends `messages` to the chat completions endpoint and returns the reply text.
///
/// Timeouts, connection failures and transient statuses are retried up to
/// `cfg.max_retries` times with exponential backoff.
pub async fn chat(client: &Client, cfg: &Config, messages: &[Message]) -> Result<String> {
    chat_with_backoff(client, cfg, messages, BASE_RETRY_DELAY).await
}

async fn chat_with_backoff(
    client: &Client,
    cfg: &Config,
    messages: &[Message],
    base_delay: Duration,
) -> Result<String> {
    let api_url = chat_url(&cfg.base_url);
    let body = ChatCompletionRequest {
        model: &cfg.model,
        messages,
    };

    let mut attempt: u32 = 0;
    loop {
        debug!(
            api_url = %api_url,
            model = %cfg.model,
            message_count = messages.len(),
            attempt = attempt + 1,
            "sending chat completion request"
        );

        match send_once(client, cfg, &api_url, &body).await {
            Ok(content) => return Ok(content),
            Err(AttemptError::Transient(err)) if attempt < cfg.max_retries => {
                let delay = backoff_delay(base_delay, attempt);
                warn!(
                    api_url = %api_url,
                    attempt = attempt + 1,
                    max_retries = cfg.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient chat failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(AttemptError::Transient(err)) | Err(AttemptError::Fatal(err)) => return Err(err),
        }
    }
}

async fn send_once(
    client: &Client,
    cfg: &Config,
    api_url: &str,
    body: &ChatCompletionRequest<'_>,
) -> std::result::Result<String, AttemptError> {
    let response = client
        .post(api_url)
        .bearer_auth(&cfg.api_key)
        .json(body)
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, model = %cfg.model, error = %err, "chat request failed");
            let transient = is_transient_request_error(&err);
            let mapped = model_api_request_error(err, api_url, cfg.model_timeout_secs);
            if transient {
                AttemptError::Transient(mapped)
            } else {
                AttemptError::Fatal(mapped)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        let response_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read response body>".to_string());
        warn!(
            api_url = %api_url,
            model = %cfg.model,
            status = %status,
            response_body_len = response_body.len(),
            "chat API returned non-success status"
        );
        let err = anyhow!(
            "Chat request failed with status {}: {}",
            status,
            response_body
        );
        return Err(if is_transient_status(status) {
            AttemptError::Transient(err)
        } else {
            AttemptError::Fatal(err)
        });
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .context("Failed to parse chat completion response")
        .map_err(AttemptError::Fatal)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AttemptError::Fatal(anyhow!("Chat completion response had no content")))?;

    debug!(
        model = %cfg.model,
        response_len = content.len(),
        "received chat completion"
    );
    Ok(content)
}
