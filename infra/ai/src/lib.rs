//! # AI
//!
//! Client for Groq's OpenAI-compatible chat-completions API plus the prompt
//! builders and reply parsers behind TrAi's coaching features: profile tips,
//! dish nutrition estimates, workout generation, dashboard greetings and
//! progress commentary.
//!
//! The client is optional at the application level: without an API key no
//! [`AiClient`] is built and callers fall back to deterministic text.

mod analysis;
mod client;
mod error;
mod models;
mod parse;
mod prompts;

pub use analysis::{HistoryAnalysis, analyze_history, trend_summary};
pub use client::{AiClient, AiSettings, start_tracking_message};
pub use error::{AiError, AiErrorExt};
pub use models::{
    ChartPoint, CoachProfile, DashboardSnapshot, DishNutrition, GeneratedExercise,
    GeneratedWorkout, PastExercise, PastWorkout,
};
pub use parse::{extract_json, parse_tips, strip_quotes};
