//! Practice text supply.
//!
//! A [`TextSource`] always answers: the remote generator falls back to the
//! bundled pool on any failure, so callers never see an error.

use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::difficulty::Difficulty;

static TEXTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources/texts");

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextSourceError {
    #[error("no api key configured")]
    Disabled,
    #[error("text generation returned an empty response")]
    EmptyResponse,
    #[error("text generation failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub trait TextSource: Send + Sync {
    fn fetch_practice_text(&self, difficulty: Difficulty) -> String;
}

/// Locally bundled texts, one pool per difficulty
#[derive(Debug, Clone)]
pub struct FallbackTexts {
    pools: HashMap<Difficulty, Vec<String>>,
}

impl FallbackTexts {
    pub fn bundled() -> Self {
        let pools = Difficulty::ALL
            .iter()
            .map(|&difficulty| {
                let mut pool = TEXTS_DIR
                    .get_file(file_name(difficulty))
                    .and_then(|f| f.contents_utf8())
                    .map(parse_pool)
                    .unwrap_or_default();
                if pool.is_empty() {
                    pool.push(builtin_text(difficulty).to_string());
                }
                (difficulty, pool)
            })
            .collect();
        Self { pools }
    }

    pub fn pool(&self, difficulty: Difficulty) -> &[String] {
        self.pools
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn pick(&self, difficulty: Difficulty) -> String {
        self.pool(difficulty)
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| builtin_text(difficulty).to_string())
    }
}

impl Default for FallbackTexts {
    fn default() -> Self {
        Self::bundled()
    }
}

fn file_name(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Novice => "novice.txt",
        Difficulty::Intermediate => "intermediate.txt",
        Difficulty::Advanced => "advanced.txt",
        Difficulty::Master => "master.txt",
    }
}

fn builtin_text(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Novice => "the quick brown fox jumps over the lazy dog simple words are easy to type and good for practice",
        Difficulty::Intermediate => "Practice makes perfect. Typing is a skill that improves with time and consistent effort. Keep your hands relaxed.",
        Difficulty::Advanced => "The concept of quantum entanglement implies that particles can share a state even when separated by vast distances, challenging classical physics.",
        Difficulty::Master => "function debounce(func, wait) { let timeout; return function(...args) { clearTimeout(timeout); timeout = setTimeout(() => func.apply(this, args), wait); }; }",
    }
}

fn parse_pool(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(collapse_whitespace)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip code fences a model may wrap around its answer and flatten the text
/// onto one line.
pub fn clean_generated_text(raw: &str) -> String {
    collapse_whitespace(&raw.replace("```", ""))
}

pub fn prompt_for(difficulty: Difficulty, topic: Option<&str>) -> String {
    let base = match difficulty {
        Difficulty::Novice => "Generate 30 simple, common English words in lowercase, separated by spaces. No punctuation.",
        Difficulty::Intermediate => "Generate 3 sentences of moderate difficulty with standard punctuation. About 40 words total.",
        Difficulty::Advanced => "Generate a complex paragraph about science, technology, or history. Use advanced vocabulary and varied punctuation. About 60 words.",
        Difficulty::Master => "Generate a snippet of text that includes technical jargon, numbers, symbols, and mixed case letters. It can be pseudo-code or a technical definition. About 50 words.",
    };
    match topic.map(str::trim).filter(|t| !t.is_empty()) {
        Some(topic) => format!("{base} The topic is: {topic}. Reply with the text only."),
        None => format!("{base} Reply with the text only."),
    }
}

/// Never leaves the machine
#[derive(Debug, Clone, Default)]
pub struct OfflineTextSource {
    fallback: FallbackTexts,
}

impl OfflineTextSource {
    pub fn new(fallback: FallbackTexts) -> Self {
        Self { fallback }
    }
}

impl TextSource for OfflineTextSource {
    fn fetch_practice_text(&self, difficulty: Difficulty) -> String {
        self.fallback.pick(difficulty)
    }
}

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeminiConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("NEONTYPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let model = env::var("NEONTYPE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Remote generator speaking the `generateContent` API
pub struct GeminiTextSource {
    client: reqwest::blocking::Client,
    config: GeminiConfig,
    topic: Option<String>,
    fallback: FallbackTexts,
}

impl GeminiTextSource {
    pub fn new(
        config: GeminiConfig,
        topic: Option<String>,
        fallback: FallbackTexts,
    ) -> Result<Self, TextSourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            config,
            topic,
            fallback,
        })
    }

    /// One request, no retry
    pub fn generate(&self, difficulty: Difficulty) -> Result<String, TextSourceError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let payload = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt_for(difficulty, self.topic.as_deref()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(TextSourceError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json()?;
        extract_text(body)
    }
}

impl TextSource for GeminiTextSource {
    fn fetch_practice_text(&self, difficulty: Difficulty) -> String {
        match self.generate(difficulty) {
            Ok(text) => {
                tracing::debug!(target: "text_source", %difficulty, chars = text.len(), "text_generated");
                text
            }
            Err(e) => {
                tracing::warn!(target: "text_source", %difficulty, error = %e, "text_generation_failed");
                self.fallback.pick(difficulty)
            }
        }
    }
}

/// Pick the text source for this run
pub fn build_source(offline: bool, topic: Option<String>) -> Arc<dyn TextSource> {
    let fallback = FallbackTexts::bundled();
    if offline {
        return Arc::new(OfflineTextSource::new(fallback));
    }
    let Some(config) = GeminiConfig::from_env() else {
        tracing::warn!(target: "text_source", error = %TextSourceError::Disabled, "using_bundled_texts");
        return Arc::new(OfflineTextSource::new(fallback));
    };
    match GeminiTextSource::new(config, topic, fallback.clone()) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            tracing::warn!(target: "text_source", error = %e, "using_bundled_texts");
            Arc::new(OfflineTextSource::new(fallback))
        }
    }
}

fn extract_text(body: GenerateResponse) -> Result<String, TextSourceError> {
    let raw: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = clean_generated_text(&raw);
    if text.is_empty() {
        return Err(TextSourceError::EmptyResponse);
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
