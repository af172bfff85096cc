use crate::analysis::{analyze_history, trend_summary};
use crate::error::AiError;
use crate::models::{
    ChartPoint, CoachProfile, DashboardSnapshot, DishNutrition, GeneratedWorkout, PastWorkout,
};
use crate::parse::{extract_json, parse_tips, strip_quotes};
use crate::prompts;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use trai_domain::enums::ProgressMetric;

/// Connection settings for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub api_key: String,
    /// e.g. `https://api.groq.com/openai/v1`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Groq chat-completions client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AiClient {
    http: Client,
    endpoint: String,
    settings: AiSettings,
}

impl AiClient {
    /// # Errors
    /// [`AiError::Http`] when the TLS backend cannot be initialised.
    pub fn new(settings: AiSettings) -> Result<Self, AiError> {
        let http = Client::builder().timeout(settings.timeout).build().map_err(|source| {
            AiError::Http { source, context: Some("Building HTTP client".into()) }
        })?;
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        Ok(Self { http, endpoint, settings })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Sends one user message and returns the first choice's text.
    ///
    /// # Errors
    /// [`AiError::Timeout`], [`AiError::Http`], [`AiError::Status`] for non-200 answers and
    /// [`AiError::InvalidResponse`] when `choices[0].message.content` is missing.
    #[instrument(skip_all, fields(model = %self.settings.model, prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map_or(body, |e| e.error.message);
            warn!(status = status.as_u16(), %message, "AI provider rejected request");
            return Err(AiError::Status { status: status.as_u16(), message: message.into() });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                AiError::InvalidResponse {
                    message: e.to_string().into(),
                    context: Some("decoding completion".into()),
                }
            }
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(AiError::InvalidResponse {
                message: "completion has no choices[0].message.content".into(),
                context: None,
            })?;

        debug!(elapsed_ms = started.elapsed().as_millis(), reply_len = text.len(), "AI reply");
        Ok(text)
    }

    fn transport_error(&self, e: reqwest::Error) -> AiError {
        if e.is_timeout() {
            AiError::Timeout { seconds: self.settings.timeout.as_secs() }
        } else {
            AiError::Http { source: e, context: Some(self.endpoint.clone().into()) }
        }
    }

    /// Up to three short tips for the profile page.
    ///
    /// # Errors
    /// Transport errors, or [`AiError::InvalidResponse`] when no tip could be parsed.
    pub async fn profile_tips(&self, profile: &CoachProfile) -> Result<Vec<String>, AiError> {
        let reply = self.complete(&prompts::profile_tips(profile)).await?;
        let tips = parse_tips(&reply);
        if tips.is_empty() {
            return Err(AiError::InvalidResponse {
                message: "no tips in reply".into(),
                context: Some(reply.into()),
            });
        }
        Ok(tips)
    }

    /// Nutrition of `grams` of the named dish.
    ///
    /// # Errors
    /// Transport errors, or [`AiError::InvalidResponse`] if any of the four figures is missing.
    pub async fn analyze_dish(&self, name: &str, grams: f64) -> Result<DishNutrition, AiError> {
        let reply = self.complete(&prompts::dish_nutrition(name, grams)).await?;
        extract_json(&reply)
    }

    /// # Errors
    /// Transport errors, or [`AiError::InvalidResponse`] for a reply that is not a workout.
    pub async fn generate_workout(
        &self,
        profile: &CoachProfile,
        muscle_group: &str,
        history: &[PastWorkout],
    ) -> Result<GeneratedWorkout, AiError> {
        let analysis = analyze_history(history, muscle_group);
        let reply = self.complete(&prompts::workout(profile, muscle_group, &analysis)).await?;
        extract_json(&reply)
    }

    /// Dashboard greeting with surrounding quotes removed.
    ///
    /// # Errors
    /// Transport errors.
    pub async fn greeting(
        &self,
        profile: &CoachProfile,
        week: &DashboardSnapshot,
    ) -> Result<String, AiError> {
        let reply = self.complete(&prompts::greeting(profile, week)).await?;
        Ok(strip_quotes(&reply))
    }

    /// Short commentary on a progress series. An empty series never reaches the model.
    ///
    /// # Errors
    /// Transport errors.
    pub async fn progress_analysis(
        &self,
        points: &[ChartPoint],
        metric: ProgressMetric,
        profile: &CoachProfile,
    ) -> Result<String, AiError> {
        if points.is_empty() {
            return Ok(start_tracking_message(&profile.name));
        }
        let trend = trend_summary(points, metric);
        let prompt = prompts::progress(profile, metric.as_ref(), points, trend.as_deref());
        let reply = self.complete(&prompt).await?;
        Ok(strip_quotes(&reply))
    }
}

/// Reply for a series with no data yet.
#[must_use]
pub fn start_tracking_message(name: &str) -> String {
    format!("{name}, start tracking your progress to get personal recommendations!")
}
