use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{FetchWindow, MailSettings, Message, MessageRef};
use crate::services::capabilities::MessageSource;

const DEFAULT_SUBJECT: &str = "No Subject";

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<ListedMessage>,
}

#[derive(Debug, Deserialize)]
struct ListedMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageResponse {
    id: String,
    #[serde(default)]
    snippet: String,
    internal_date: Option<String>,
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<MessageHeader>,
}

#[derive(Debug, Deserialize)]
struct MessageHeader {
    name: String,
    value: String,
}

/// Gmail REST message source. The caller supplies a valid OAuth access token.
pub struct GmailSource {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    access_token: String,
}

impl GmailSource {
    pub fn new(settings: &MailSettings) -> Result<Self> {
        if settings.access_token.trim().is_empty() {
            return Err(Error::Config("mail access token is missing".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            user_id: settings.user_id.clone(),
            access_token: settings.access_token.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::transport(format!("mail API request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::transport(format!("mail API error {}: {}", status, text)));
        }
        decode(&text)
    }
}

fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text)
        .map_err(|e| Error::transport(format!("unexpected mail API response: {}", e)))
}

/// Gmail search query for the window's lower bound.
pub fn search_query(window: &FetchWindow) -> String {
    window
        .since
        .map(|since| format!("after:{}", since.timestamp()))
        .unwrap_or_default()
}

/// The message date anchors relative deadlines, so a message without a
/// readable `internalDate` is rejected rather than dated now.
fn message_from_response(response: MessageResponse) -> Result<Message> {
    let subject = response
        .payload
        .as_ref()
        .and_then(|p| p.headers.iter().find(|h| h.name.eq_ignore_ascii_case("Subject")))
        .map(|h| h.value.clone())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

    let source_date = response
        .internal_date
        .as_deref()
        .and_then(parse_internal_date)
        .ok_or_else(|| {
            Error::transport(format!(
                "message {} has no usable internalDate ({:?})",
                response.id, response.internal_date
            ))
        })?;

    Ok(Message {
        id: response.id,
        subject,
        body_snippet: response.snippet,
        source_date,
    })
}

/// `internalDate` is epoch milliseconds encoded as a string.
fn parse_internal_date(value: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = value.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[async_trait]
impl MessageSource for GmailSource {
    async fn list(&self, window: &FetchWindow) -> Result<Vec<MessageRef>> {
        let url = format!("{}/users/{}/messages", self.base_url, self.user_id);
        let query = search_query(window);
        log::info!("listing messages with query {:?} (limit {})", query, window.limit);

        let listed: ListResponse = self
            .get_json(
                &url,
                &[("maxResults", window.limit.to_string()), ("q", query)],
            )
            .await?;

        Ok(listed
            .messages
            .into_iter()
            .map(|m| MessageRef { id: m.id })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Message> {
        let url = format!("{}/users/{}/messages/{}", self.base_url, self.user_id, id);
        let response: MessageResponse = self.get_json(&url, &[]).await?;
        message_from_response(response)
    }
}
