use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::AISettings;
use crate::services::capabilities::ContentAnalyzer;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Serialize)]
struct AnalyzeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnalyzeMessage>,
}

#[derive(Debug, Clone, Serialize)]
struct AnalyzeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// Content analyzer backed by the Anthropic Messages API.
pub struct AnthropicAnalyzer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicAnalyzer {
    pub fn new(settings: &AISettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(Error::Config("analyzer API key is missing".to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }
}

pub fn build_prompt(subject: &str, body: &str, reference_date: DateTime<Utc>) -> String {
    format!(
        "Analyze the following email for any mentions of tasks or to-dos for the recipient.\n\
If there are no tasks with deadlines, respond with only the word \"No\".\n\
If there are tasks with deadlines, list each task in the format:\n\
\"YYYY-MM-DD HH:mm:ss | Give a short, 1-sentence description of the task, as described in the email\"\n\n\
Always use the format YYYY-MM-DD HH:mm:ss for the date, even if the year is not explicitly mentioned (assume current year in that case). \
If time is not mentioned, assume 23:59:00. Respond in 24-hour time. Punctuation within the sentence is ok, but do not end the sentence with a period.\n\
If you can detect that a task is present but cannot detect what the deadline should be (for example, if the deadline is stated as \"next time we meet\"), \
or if there is no deadline present at all, instead of YYYY-MM-DD HH:mm:ss, just say \"Unknown | *task description*\".\n\
Write tasks the way they would appear on a to-do list. For example, if the email says \"I'd love it if you completed worksheet 5.2 by Tuesday!\", \
the task should be something like \"Finish Worksheet 5.2\".\n\
For emails that are replies to other emails, answer only for the most recent email body. For tasks due \"in the afternoon\", set the deadline to 17:00:00.\n\n\
Each email may have more than one task, each with its own deadline. Put each task on its own line. Resolve holidays and events such as Halloween, Christmas or the New Year to dates.\n\n\
In all cases, respond with ONLY either \"No\" or the formatted lines. Never include explanations, prefaces or filler.\n\n\
Calculate relative dates based on the email sent date: {}.\n\n\
Email Subject: {}\n\
Email Body: {}",
        reference_date.to_rfc3339(),
        subject,
        body
    )
}

#[async_trait]
impl ContentAnalyzer for AnthropicAnalyzer {
    async fn analyze(
        &self,
        subject: &str,
        body: &str,
        reference_date: DateTime<Utc>,
    ) -> Result<String> {
        let request = AnalyzeRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![AnalyzeMessage {
                role: "user".to_string(),
                content: build_prompt(subject, body, reference_date),
            }],
        };

        log::debug!("analyzing message {:?}", subject);
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(format!("analyzer request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::transport(format!("analyzer API error {}: {}", status, text)));
        }

        let parsed: AnalyzeResponse = serde_json::from_str(&text)
            .map_err(|e| Error::transport(format!("unexpected analyzer response: {}", e)))?;
        let answer = first_text(&parsed)
            .ok_or_else(|| Error::transport("analyzer returned no text content"))?;
        log::debug!("analysis for {:?}: {}", subject, answer);
        Ok(answer)
    }
}

fn first_text(response: &AnalyzeResponse) -> Option<String> {
    response
        .content
        .iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text.as_deref())
        .map(|text| text.trim().to_string())
}
