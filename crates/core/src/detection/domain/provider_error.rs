use thiserror::Error;

/// Failure reported by a recognition provider.
///
/// Never escapes the pipeline: the detection aggregator turns every variant
/// into an empty result.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("provider response could not be parsed: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
