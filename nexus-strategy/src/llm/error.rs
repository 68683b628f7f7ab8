use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Failure class that drives the batch analyzer's recovery path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The model id is permanently bad: advance the model chain, no backoff
    NotFound,
    /// Per-model request quota tripped: advance model, then split or back off
    RateLimited,
    /// Token/usage quota exhausted: split multi-item batches
    QuotaExhausted,
    /// Anything else: back off and retry
    Other,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Transient remote error: {0}")]
    Transient(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response mismatch: got {got} analyses for {expected} items")]
    ResponseMismatch { expected: usize, got: usize },

    #[error("No price data for {0}")]
    NoPriceData(String),
}

impl AnalysisError {
    /// Classify a provider error message into the failure taxonomy
    ///
    /// Checks are ordered: a 429 mentioning quota is a rate limit, not a
    /// quota exhaustion.
    pub fn from_remote_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if message.contains("404")
            || message.contains("NOT_FOUND")
            || lower.contains("model_not_found")
            || lower.contains("does not exist")
        {
            AnalysisError::ModelNotFound(message)
        } else if message.contains("429")
            || message.contains("RESOURCE_EXHAUSTED")
            || lower.contains("rate limit")
            || lower.contains("rate_limit")
        {
            AnalysisError::RateLimited(message)
        } else if lower.contains("quota") {
            AnalysisError::QuotaExhausted(message)
        } else {
            AnalysisError::Transient(message)
        }
    }

    /// Classify a non-success HTTP response from the provider
    ///
    /// Reads the structured error object in either the OpenAI shape
    /// (`{"error": {...}}`) or the Gemini array shape
    /// (`[{"error": {...}}]`). Falls back to text classification when the
    /// body carries no recognizable code.
    pub fn from_http_failure(status: u16, body: &str) -> Self {
        let detail = ProviderError::parse(body);
        let numeric_code = detail.code.as_ref().and_then(Value::as_u64);
        let code = detail.code.as_ref().and_then(Value::as_str).unwrap_or_default();
        let provider_status = detail.status.as_deref().unwrap_or_default();
        let error_type = detail.error_type.as_deref().unwrap_or_default();

        let message = match detail.message.as_deref() {
            Some(text) if !text.is_empty() => format!("HTTP {}: {}", status, text),
            _ => format!("HTTP {}: {}", status, body.trim()),
        };

        if status == 404
            || numeric_code == Some(404)
            || provider_status == "NOT_FOUND"
            || code == "model_not_found"
        {
            AnalysisError::ModelNotFound(message)
        } else if code == "insufficient_quota" || error_type == "insufficient_quota" {
            AnalysisError::QuotaExhausted(message)
        } else if status == 429
            || numeric_code == Some(429)
            || provider_status == "RESOURCE_EXHAUSTED"
            || code == "rate_limit_exceeded"
        {
            AnalysisError::RateLimited(message)
        } else {
            Self::from_remote_message(message)
        }
    }

    /// Recovery class of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::ModelNotFound(_) => FailureKind::NotFound,
            AnalysisError::RateLimited(_) => FailureKind::RateLimited,
            AnalysisError::QuotaExhausted(_) => FailureKind::QuotaExhausted,
            AnalysisError::Transient(_)
            | AnalysisError::MalformedResponse(_)
            | AnalysisError::ResponseMismatch { .. }
            | AnalysisError::NoPriceData(_) => FailureKind::Other,
        }
    }
}

/// Provider error object; `code` is numeric on Gemini and a string on OpenAI
#[derive(Debug, Default, Deserialize)]
struct ProviderError {
    code: Option<Value>,
    status: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ProviderError,
}

// The array shape must be tried first: serde accepts a sequence for a struct.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Wrapped(Vec<ErrorEnvelope>),
    Single(ErrorEnvelope),
}

impl ProviderError {
    fn parse(body: &str) -> Self {
        match serde_json::from_str::<ErrorPayload>(body) {
            Ok(ErrorPayload::Single(envelope)) => envelope.error,
            Ok(ErrorPayload::Wrapped(envelopes)) => envelopes
                .into_iter()
                .next()
                .map(|envelope| envelope.error)
                .unwrap_or_default(),
            Err(_) => ProviderError::default(),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::MalformedResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_found() {
        let err = AnalysisError::from_remote_message(
            "404 NOT_FOUND: models/gemini-9 is not found for API version v1beta",
        );
        assert_eq!(err.kind(), FailureKind::NotFound);

        let err = AnalysisError::from_remote_message("The model `gpt-5-mini` does not exist");
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[test]
    fn test_classify_rate_limit_before_quota() {
        let err = AnalysisError::from_remote_message(
            "429 RESOURCE_EXHAUSTED: You exceeded your current quota",
        );
        assert_eq!(err.kind(), FailureKind::RateLimited);
    }

    #[test]
    fn test_classify_quota() {
        let err = AnalysisError::from_remote_message("Daily token Quota exceeded for project");
        assert_eq!(err.kind(), FailureKind::QuotaExhausted);
    }

    #[test]
    fn test_classify_other() {
        let err = AnalysisError::from_remote_message("connection reset by peer");
        assert_eq!(err, AnalysisError::Transient("connection reset by peer".to_string()));
        assert_eq!(err.kind(), FailureKind::Other);
    }

    const GEMINI_NOT_FOUND: &str = r#"{"error": {"code": 404,
        "message": "models/gemini-9 is not found for API version v1beta",
        "status": "NOT_FOUND"}}"#;

    #[test]
    fn test_http_gemini_object_not_found() {
        let err = AnalysisError::from_http_failure(404, GEMINI_NOT_FOUND);
        assert_eq!(
            err,
            AnalysisError::ModelNotFound(
                "HTTP 404: models/gemini-9 is not found for API version v1beta".to_string()
            )
        );
    }

    #[test]
    fn test_http_gemini_array_not_found() {
        let body = format!("[{}]", GEMINI_NOT_FOUND);
        assert_eq!(
            AnalysisError::from_http_failure(404, &body).kind(),
            FailureKind::NotFound
        );
        // the body alone is enough, whatever status a gateway reports
        assert_eq!(
            AnalysisError::from_http_failure(400, &body).kind(),
            FailureKind::NotFound
        );
    }

    #[test]
    fn test_http_gemini_array_resource_exhausted() {
        let body = r#"[{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED",
            "message": "Resource has been exhausted (e.g. check quota)."}}]"#;
        assert_eq!(
            AnalysisError::from_http_failure(429, body).kind(),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn test_http_openai_codes() {
        let rate = r#"{"error": {"message": "Rate limit reached for requests",
            "type": "requests", "param": null, "code": "rate_limit_exceeded"}}"#;
        assert_eq!(
            AnalysisError::from_http_failure(429, rate).kind(),
            FailureKind::RateLimited
        );

        let quota = r#"{"error": {"message": "You exceeded your current quota",
            "type": "insufficient_quota", "param": null, "code": "insufficient_quota"}}"#;
        assert_eq!(
            AnalysisError::from_http_failure(429, quota).kind(),
            FailureKind::QuotaExhausted
        );

        let missing = r#"{"error": {"message": "The model `gpt-9` does not exist",
            "type": "invalid_request_error", "param": null, "code": "model_not_found"}}"#;
        assert_eq!(
            AnalysisError::from_http_failure(400, missing).kind(),
            FailureKind::NotFound
        );
    }

    #[test]
    fn test_http_unstructured_body() {
        let err = AnalysisError::from_http_failure(502, "<html>Bad Gateway</html>");
        assert_eq!(
            err,
            AnalysisError::Transient("HTTP 502: <html>Bad Gateway</html>".to_string())
        );
        assert_eq!(
            AnalysisError::from_http_failure(429, "").kind(),
            FailureKind::RateLimited
        );
    }

    #[test]
    fn test_mismatch_message() {
        let err = AnalysisError::ResponseMismatch { expected: 3, got: 2 };
        assert_eq!(err.to_string(), "Response mismatch: got 2 analyses for 3 items");
    }
}
