use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::models::InvalidTimestamp;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response had no content")]
    EmptyBody,

    #[error(transparent)]
    Timestamp(#[from] InvalidTimestamp),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

impl ApiError {
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.detail)
            .filter(|detail| !detail.trim().is_empty())
            .unwrap_or_else(|| {
                format!(
                    "API request failed: {}",
                    status.canonical_reason().unwrap_or(status.as_str())
                )
            });

        Self::Status { status, message }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}
