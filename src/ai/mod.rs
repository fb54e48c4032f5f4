//! Task generation module.
//!
//! A project's initial tasks can be generated from a natural-language prompt.
//! The model is asked for a JSON array of tasks with due dates relative to
//! today, and its reply is parsed into [`NewTask`] values.

mod error;

pub use error::AiError;

use crate::backend::NewTask;
use crate::config::AiConfig;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::*;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

/// Produces text for a prompt.
///
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError>;
}

/// Client for the Gemini `generateContent` endpoint.
///
pub struct Gemini {
    base_url: String,
    model: String,
    api_key: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl Gemini {
    /// Returns a new instance for the configuration, or an error when no API
    /// key is configured.
    ///
    pub fn new(config: &AiConfig) -> Result<Gemini, AiError> {
        let api_key = config.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        Ok(Gemini {
            base_url: config.endpoint.trim_end_matches('/').to_owned(),
            model: config.model.to_owned(),
            api_key: api_key.to_owned(),
            http_client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl TextGenerator for Gemini {
    async fn generate_text(&self, prompt: &str) -> Result<String, AiError> {
        debug!("Requesting completion from model {}...", self.model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            error!("Generation failed with status {}: {}", status, message);
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        body.candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .ok_or_else(|| AiError::InvalidResponse("no candidates returned".to_string()))
    }
}

/// A task as described by the model.
///
#[derive(Deserialize)]
struct GeneratedTask {
    content: String,
    #[serde(default)]
    due_date: Option<String>,
}

/// Wrap the user's description in generation instructions.
///
pub fn build_prompt(description: &str, now: DateTime<Utc>) -> String {
    format!(
        "Generate a list of tasks for the following project and return them as JSON.\n\
         Project: {}\n\
         Each task must match the schema {{ \"content\": string, \"due_date\": string | null }}.\n\
         Requirements:\n\
         1. Tasks must be concrete and follow the project description.\n\
         2. Set \"due_date\" as an ISO 8601 date relative to today, {}, or null when no date fits.\n\
         3. Return only a JSON array of tasks.",
        description.trim(),
        now.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Strip a surrounding markdown code fence, if any.
///
fn strip_code_fence(reply: &str) -> &str {
    let fence = match Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$") {
        Ok(fence) => fence,
        Err(e) => {
            warn!("Failed to compile code fence pattern: {}", e);
            return reply.trim();
        }
    };
    fence
        .captures(reply)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
        .unwrap_or_else(|| reply.trim())
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc())
        })
}

/// Parse a model reply into new tasks. Blank tasks are dropped and
/// unparseable dates become undated tasks.
///
pub fn parse_tasks(reply: &str) -> Result<Vec<NewTask>, AiError> {
    let generated: Vec<GeneratedTask> = serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
    Ok(generated
        .into_iter()
        .filter(|task| !task.content.trim().is_empty())
        .map(|task| {
            let due_date = task.due_date.as_deref().and_then(parse_date);
            if task.due_date.is_some() && due_date.is_none() {
                warn!("Dropping unreadable due date for task '{}'", task.content);
            }
            NewTask {
                content: task.content.trim().to_owned(),
                due_date,
                completed: false,
                project_id: None,
            }
        })
        .collect())
}

/// Generate the initial tasks of a project from its description.
///
pub async fn generate_project_tasks<G: TextGenerator + ?Sized>(
    generator: &G,
    description: &str,
    now: DateTime<Utc>,
) -> Result<Vec<NewTask>, AiError> {
    if description.trim().is_empty() {
        return Err(AiError::EmptyPrompt);
    }
    info!("Generating tasks from prompt...");
    let reply = generator.generate_text(&build_prompt(description, now)).await?;
    let tasks = parse_tasks(&reply)?;
    info!("Generated {} tasks.", tasks.len());
    Ok(tasks)
}
