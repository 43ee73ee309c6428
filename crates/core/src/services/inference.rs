use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ImproveConfig;
use crate::model::{ImprovementRequest, ImprovementResult};

const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant that improves the readability of \
decompiled code. Rename variables based on their usage. Do not modify function names and do not \
add any Explanation section. Only Return the improved code.";
const USER_INSTRUCTION: &str = "Improve the readability of the following code by renaming \
variables based on their usage. Do not modify function names.";
const COMMENTS_INSTRUCTION: &str = " Add comments to explain each code block.";
const USER_CLOSING: &str = " Only return the improved code:";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Request to endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected response shape: {0}")]
    Malformed(String),
}

/// One chat message in the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self { role: role.to_string(), content }
    }
}

/// JSON body POSTed to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}

/// Build the system + user message pair for a request.
pub fn build_messages(request: &ImprovementRequest) -> Vec<ChatMessage> {
    let comments = if request.add_comments { COMMENTS_INSTRUCTION } else { "" };
    let system = format!("{SYSTEM_INSTRUCTION}{comments}");
    let user = format!("{USER_INSTRUCTION}{comments}{USER_CLOSING}\n\n{}", request.source_code);
    vec![ChatMessage::new("system", system), ChatMessage::new("user", user)]
}

/// Seam between the orchestrator and whatever rewrites the code.
///
/// Implementations always return a result; failures degrade to the original
/// source rather than aborting the run.
pub trait CodeImprover {
    fn improve(&self, request: &ImprovementRequest) -> ImprovementResult;
}

/// Blocking client for an OpenAI-style chat-completion endpoint.
pub struct ChatCompletionClient {
    http: Client,
    endpoint_url: String,
    api_key: String,
    model_id: String,
}

impl ChatCompletionClient {
    pub fn new(config: &ImproveConfig) -> Result<Self, InferenceError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            endpoint_url: config.endpoint_url.clone(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
        })
    }

    /// Rewrite `code`, returning the model's reply verbatim or `code`
    /// unchanged if the call fails for any reason.
    pub fn improve_code(&self, code: &str, add_comments: bool) -> String {
        let request = ImprovementRequest::new(code, add_comments);
        match self.try_improve(&request) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::error!(error = %err, "improvement request failed; keeping original code");
                code.to_string()
            }
        }
    }

    /// Single POST with no retry; returns `choices[0].message.content`.
    pub fn try_improve(&self, request: &ImprovementRequest) -> Result<String, InferenceError> {
        let body = ChatRequest { model: &self.model_id, messages: build_messages(request) };
        tracing::info!(
            endpoint = %self.endpoint_url,
            model = %self.model_id,
            "sending code for improvement"
        );

        let response =
            self.http.post(&self.endpoint_url).bearer_auth(&self.api_key).json(&body).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Status { status: status.as_u16(), body });
        }

        let text = response.text()?;
        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| InferenceError::Malformed("response contained no choices".to_string()))
    }
}

impl CodeImprover for ChatCompletionClient {
    fn improve(&self, request: &ImprovementRequest) -> ImprovementResult {
        ImprovementResult::new(self.improve_code(&request.source_code, request.add_comments))
    }
}
