//! The ads backend capability the core depends on, plus the translation of
//! its structured error codes into user-facing guidance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use adpilot_core::{CampaignPayload, Objective};

/// Canonical metadata for a validated library track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicMetadata {
    pub music_id: String,
    pub title: String,
    pub artist: String,
    pub duration_secs: u32,
    pub status: String,
}

/// Receipt for a custom upload. The minted id is usable immediately even
/// though processing finishes asynchronously on the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub music_id: String,
    pub file_name: String,
    pub status: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReceipt {
    pub campaign_id: String,
    pub campaign_name: String,
    pub status: String,
    pub dashboard_url: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidMusicId,
    CopyrightClaim,
    GeoRestricted,
    DurationInvalid,
    RateLimitExceeded,
    AuthenticationFailed,
    InvalidAdvertiser,
    ValidationFailed,
    UploadUnsupported,
    ServerError,
    NetworkError,
    Timeout,
}

impl ApiErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidMusicId => "invalid_music_id",
            Self::CopyrightClaim => "copyright_claim",
            Self::GeoRestricted => "geo_restricted",
            Self::DurationInvalid => "duration_invalid",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::AuthenticationFailed => "authentication_failed",
            Self::InvalidAdvertiser => "invalid_advertiser",
            Self::ValidationFailed => "validation_failed",
            Self::UploadUnsupported => "upload_unsupported",
            Self::ServerError => "server_error",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
        }
    }

    /// Fixed, user-facing explanation for each code. No raw code strings:
    /// this text is shown to the end user verbatim.
    fn explanation(&self) -> &'static str {
        match self {
            Self::InvalidMusicId => {
                "That music id doesn't exist in the music library. It may have been typed \
                 incorrectly, removed from the library, or belong to a different platform."
            }
            Self::CopyrightClaim => {
                "This track has active copyright restrictions and cannot be used in \
                 advertisements. Ads using it would be rejected."
            }
            Self::GeoRestricted => {
                "This track is not licensed in every region your ads would target. The \
                 platform requires music to be available in all target markets."
            }
            Self::DurationInvalid => {
                "This track is longer than the 60 seconds ads allow. Longer tracks cause \
                 playback issues."
            }
            Self::RateLimitExceeded => {
                "Too many requests in a short window. This is a temporary restriction; it \
                 clears on its own."
            }
            Self::AuthenticationFailed => {
                "The access token was rejected. It may have expired or been revoked."
            }
            Self::InvalidAdvertiser => {
                "The advertiser account id was not recognized by the ads platform."
            }
            Self::ValidationFailed => {
                "The ads platform rejected the request. One or more fields did not pass its \
                 checks."
            }
            Self::UploadUnsupported => {
                "Custom music uploads are not available through this connection."
            }
            Self::ServerError => "The ads platform had an internal problem handling the request.",
            Self::NetworkError => "The ads platform could not be reached.",
            Self::Timeout => "The request to the ads platform timed out.",
        }
    }
}

/// Structured failure from the ads backend. Always recoverable at the
/// conversation level; the orchestrator turns it into guidance text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{} : {message}", code.as_str())]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub suggestion: String,
}

impl ApiError {
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self { code, message: message.into(), suggestion: suggestion.into() }
    }

    /// User-facing explanation plus suggestion. Raw error codes never appear
    /// in this text.
    pub fn explain(&self) -> String {
        format!("{}\n\nTip: {}", self.code.explanation(), self.suggestion)
    }

    /// Concrete next steps for a failed music resolution. Proceeding without
    /// music is offered only when the objective allows it.
    pub fn music_recovery_options(&self, objective: Option<Objective>) -> Vec<String> {
        let mut options = vec![
            "Try a different music id".to_string(),
            "Upload custom music instead".to_string(),
        ];
        if matches!(objective, Some(Objective::Traffic)) {
            options.push("Proceed without music (your Traffic campaign allows it)".to_string());
        }
        options
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Abstract ads backend: music validation, music upload, and campaign
/// creation. Implemented by the in-process mock and the real TikTok
/// Marketing API client.
#[async_trait]
pub trait AdsApi: Send + Sync {
    async fn validate_music(&self, music_id: &str) -> ApiResult<MusicMetadata>;
    async fn upload_music(&self, file_name: &str) -> ApiResult<UploadReceipt>;
    async fn create_campaign(&self, payload: &CampaignPayload) -> ApiResult<CampaignReceipt>;
}
