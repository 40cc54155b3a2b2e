// content-analyzer-rs/src/handler.rs
// Content analysis pipeline: normalize -> validate -> truncate -> prompt -> invoke -> parse

use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::model_client::{ModelError, ModelInvoker, MODEL_LABEL};

/// Content beyond this many characters is cut off before prompting.
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Note attached to the fallback analysis when the model reply is not JSON.
pub const FALLBACK_NOTE: &str = "Response was not in JSON format";

/// Analysis failure kinds, split into client fault (NoContent) and server
/// fault (everything else) so the HTTP mapping stays explicit.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("No content provided")]
    NoContent,

    #[error("Invalid request body: {0}")]
    MalformedEnvelope(serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AnalyzerError {
    pub fn status(&self) -> StatusCode {
        match self {
            AnalyzerError::NoContent => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to HTTP status code and error response body.
    pub fn to_response(&self) -> (StatusCode, Json<Value>) {
        match self {
            AnalyzerError::NoContent => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No content provided" })),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "message": other.to_string(),
                })),
            ),
        }
    }
}

/// Per-request metadata returned alongside the analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisMetadata {
    pub content_length: usize,
    pub truncated: bool,
    pub timestamp: String,
    pub model: &'static str,
}

/// Successful analysis envelope.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub analysis: Value,
    pub metadata: AnalysisMetadata,
}

/// Normalize the two supported invocation shapes into a single payload.
///
/// Gateway triggers deliver the payload JSON-encoded under a `body` key;
/// direct invocations put the fields at the top level. An already-decoded
/// `body` object is accepted as the payload directly.
pub fn normalize_event(event: &Value) -> Result<Value, AnalyzerError> {
    match event.get("body") {
        Some(Value::String(raw)) => {
            serde_json::from_str(raw).map_err(AnalyzerError::MalformedEnvelope)
        }
        Some(body) => Ok(body.clone()),
        None => Ok(event.clone()),
    }
}

/// Cap content at MAX_CONTENT_CHARS characters. Returns the effective content
/// and whether the cap was applied.
pub fn truncate_content(content: &str) -> (String, bool) {
    if content.chars().count() > MAX_CONTENT_CHARS {
        (content.chars().take(MAX_CONTENT_CHARS).collect(), true)
    } else {
        (content.to_string(), false)
    }
}

/// Embed the effective content in the fixed SEO analysis prompt.
pub fn build_prompt(content: &str) -> String {
    format!(
        r#"Analyze the following content for SEO optimization and provide actionable recommendations.

Content to analyze:
{content}

Please provide a comprehensive SEO analysis in the following JSON format:
{{
  "keyword_analysis": {{
    "primary_keywords": ["list of 3-5 main keywords/phrases found"],
    "keyword_density_issues": "brief assessment of keyword usage"
  }},
  "readability": {{
    "score": "simple assessment like 'Good', 'Needs Improvement', or 'Excellent'",
    "issues": ["list of readability problems if any"]
  }},
  "title_tag": {{
    "current": "extract if present, otherwise 'Not found'",
    "suggestion": "improved title under 60 characters"
  }},
  "meta_description": {{
    "current": "extract if present, otherwise 'Not found'",
    "suggestion": "improved meta description under 155 characters"
  }},
  "content_structure": {{
    "headings_assessment": "brief comment on heading structure",
    "paragraph_assessment": "brief comment on paragraph length"
  }},
  "top_recommendations": [
    "specific actionable recommendation 1",
    "specific actionable recommendation 2",
    "specific actionable recommendation 3",
    "specific actionable recommendation 4",
    "specific actionable recommendation 5"
  ]
}}

Provide ONLY the JSON object, no additional text."#
    )
}

/// Parse the model completion, falling back to a raw-text wrapper when the
/// reply is not valid JSON. Non-conforming model output is not an error.
pub fn parse_completion(completion: &str) -> Value {
    match serde_json::from_str::<Value>(completion) {
        Ok(analysis) => analysis,
        Err(_) => {
            log::warn!("Model reply was not valid JSON, returning raw-text fallback");
            json!({
                "raw_analysis": completion,
                "note": FALLBACK_NOTE,
            })
        }
    }
}

/// Run the full analysis pipeline for one inbound event.
pub async fn analyze(
    event: &Value,
    model: &dyn ModelInvoker,
) -> Result<AnalysisReport, AnalyzerError> {
    let payload = normalize_event(event)?;

    let content = payload
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(AnalyzerError::NoContent);
    }

    let (effective, truncated) = truncate_content(content);
    let content_length = effective.chars().count();

    log::info!(
        "Analyzing content: {} chars, truncated={}",
        content_length,
        truncated
    );

    let prompt = build_prompt(&effective);
    let completion = model.invoke(&prompt).await?;
    let analysis = parse_completion(&completion);

    Ok(AnalysisReport {
        analysis,
        metadata: AnalysisMetadata {
            content_length,
            truncated,
            timestamp: Utc::now().to_rfc3339(),
            model: MODEL_LABEL,
        },
    })
}
