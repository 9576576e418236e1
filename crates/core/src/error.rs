use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Prerequisite checks failed. Raised before any remote call is made.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A creating call against the remote platform failed.
    #[error("Remote API error during {step}: {message}")]
    RemoteApi { step: String, message: String },

    /// The image-to-video fallback failed.
    #[error("Media conversion error: {0}")]
    Conversion(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Ad copy or media required by the launch is missing.
    #[error("Missing launch content: {0}")]
    MissingContent(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    pub fn remote(step: impl Into<String>, source: &anyhow::Error) -> Self {
        Self::RemoteApi {
            step: step.into(),
            message: format!("{source:#}"),
        }
    }
}
