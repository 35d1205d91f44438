//! OpenAI suitability classifier.

use std::time::Duration;

use jobscrape_core::{ClassificationLabel, Classifier, JobRecord};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ServiceError;

// ============================================================================
// Constants
// ============================================================================

/// Chat completions endpoint.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Screening instructions sent ahead of each listing.
pub const SCREENING_PROMPT: &str = r#"
You are an expert in job screening for travelers. Your goal is to evaluate whether a job offer in Australia is suitable for a backpacker on a Working Holiday Visa, looking for temporary work.

SALARY/HOURLY RATE RULES:
- AUTOMATICALLY REJECT any job offering over $80,000 annual salary or over $60 per hour
- AUTOMATICALLY ACCEPT any job offering under $35 per hour (respond "yes")

REQUIRED KEYWORDS (if any of these are present, the job should be accepted):
No experience, Warehouse, Cleaning, Cleaner, Labourer, Pick, Packer, Process worker, Factory, Traffic controller, Kitchen hand, Unskilled, General hand, Farm hand, Picking, Fruit picking, Grower, Packing, Roadhouse, Housekeeping, Hospitality

EXCLUSION KEYWORDS (if any of these are present, the job should be rejected):
Senior, Experienced, Manager, Managers, Director, Supervisor

EVALUATION PROCESS:
1. First check salary/hourly rate - apply automatic rules above
2. Check for exclusion keywords - if found, respond "no"
3. Check for required keywords - if found, respond "yes"
4. For remaining jobs, evaluate if suitable for backpacker profile (manual, low-skilled, temporary work in farming, hospitality, cleaning, warehouse, construction, etc.)

Analyze the job offer below and reply with only one word, chosen from the following:

yes - the job clearly fits a backpacker profile
no - the job is not suitable for a backpacker
maybe - the job might be suitable, but some important information is missing or unclear

Do not include any other words, explanation, or formatting in your answer.

Here is the job offer:
"#;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifies listings through the OpenAI chat completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    /// Creates a classifier with the default endpoint and a 60 s timeout.
    ///
    /// # Errors
    ///
    /// Fails if the key is empty or the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_timeout(api_key, model, Duration::from_secs(60))
    }

    /// Creates a classifier with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the key is empty or the HTTP client cannot be built.
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ServiceError::MissingConfig("OpenAI API key"));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: OPENAI_ENDPOINT.to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Overrides the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The user message for a listing.
    pub fn user_message(job: &JobRecord) -> String {
        format!(
            "{SCREENING_PROMPT}\n\n Title: {}\n\n Salary: {}\n\nDescription: {}",
            job.title.as_deref().unwrap_or_default(),
            job.salary.as_deref().unwrap_or("N/A"),
            job.description.as_deref().unwrap_or_default(),
        )
    }

    fn headers(&self) -> Result<HeaderMap, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| ServiceError::Credentials("API key is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// Sends one listing and returns the raw answer.
    async fn ask(&self, job: &JobRecord) -> Result<String, ServiceError> {
        let user = Self::user_message(job);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a helpful assistant.",
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::InvalidResponse("no choices in completion".into()))
    }
}

impl Classifier for OpenAiClassifier {
    #[instrument(skip(self, job), fields(url = %job.url))]
    async fn classify(&self, job: &JobRecord) -> ClassificationLabel {
        if job.has_empty_description() {
            debug!("Empty description, labelling no");
            return ClassificationLabel::No;
        }

        match self.ask(job).await {
            Ok(answer) => {
                let label = ClassificationLabel::from_answer(&answer);
                if label == ClassificationLabel::Error {
                    warn!(answer = %answer.trim(), "Unexpected classifier answer");
                } else {
                    debug!(label = %label, "Classified");
                }
                label
            }
            Err(e) => {
                warn!(error = %e, "Classification request failed");
                ClassificationLabel::Error
            }
        }
    }
}
