//! Client for the real TikTok Marketing API.
//!
//! Success is signalled by `code == 0` in the response envelope; non-zero
//! codes are mapped onto the shared error taxonomy. Music uploads have no
//! public endpoint, and music ids can only be fully verified during campaign
//! creation, so `validate_music` is a format check here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use adpilot_core::config::TikTokConfig;
use adpilot_core::{CampaignPayload, Objective};

use crate::auth::AccessToken;
use crate::port::{
    AdsApi, ApiError, ApiErrorCode, ApiResult, CampaignReceipt, MusicMetadata, UploadReceipt,
};

pub const DEFAULT_BASE_URL: &str = "https://business-api.tiktok.com/open_api/v1.3";

/// Tokens older than this are treated as needing re-authentication.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

pub struct TikTokAdsClient {
    http: reqwest::Client,
    base_url: String,
    token: AccessToken,
    advertiser_id: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl TikTokAdsClient {
    pub fn new(config: &TikTokConfig) -> ApiResult<Self> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: &TikTokConfig, base_url: &str) -> ApiResult<Self> {
        let token = AccessToken::issued_now(config.access_token.clone(), DEFAULT_TOKEN_TTL_SECS);
        Self::with_token(config, base_url, token)
    }

    pub fn with_token(
        config: &TikTokConfig,
        base_url: &str,
        token: AccessToken,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|source| {
                ApiError::new(
                    ApiErrorCode::NetworkError,
                    format!("could not construct HTTP client: {source}"),
                    "Check the runtime environment and try again",
                )
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            advertiser_id: config.advertiser_id.clone(),
        })
    }

    /// Expiry is checked locally before every request so a stale token fails
    /// fast instead of burning a round trip.
    fn bearer(&self) -> ApiResult<&str> {
        if self.token.is_expired() {
            return Err(ApiError::new(
                ApiErrorCode::AuthenticationFailed,
                "Access token has expired",
                "Re-authenticate using the OAuth flow and restart with the new token",
            ));
        }
        Ok(self.token.expose())
    }

    /// Credential smoke test against the advertiser info endpoint.
    pub async fn test_connection(&self) -> ApiResult<String> {
        let endpoint = format!("{}/advertiser/info/", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .header("Access-Token", self.bearer()?)
            .query(&[("advertiser_ids", &self.advertiser_id)])
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: Envelope = response.json().await.map_err(transport_error)?;

        if envelope.code == 0 {
            Ok("Connected to TikTok Marketing API".to_string())
        } else {
            Err(map_api_error(envelope.code, envelope.message.as_deref().unwrap_or("")))
        }
    }
}

#[async_trait]
impl AdsApi for TikTokAdsClient {
    async fn validate_music(&self, music_id: &str) -> ApiResult<MusicMetadata> {
        // No validation endpoint exists; the id is fully verified when the
        // campaign is created.
        if music_id.trim().len() < 5 {
            return Err(ApiError::new(
                ApiErrorCode::InvalidMusicId,
                format!("Music id '{music_id}' is too short to be valid"),
                "Provide a full TikTok music id (for example MUS_12345)",
            ));
        }
        Ok(MusicMetadata {
            music_id: music_id.trim().to_string(),
            title: "Unverified track".to_string(),
            artist: "Unknown".to_string(),
            duration_secs: 0,
            status: "format_valid".to_string(),
        })
    }

    async fn upload_music(&self, _file_name: &str) -> ApiResult<UploadReceipt> {
        Err(ApiError::new(
            ApiErrorCode::UploadUnsupported,
            "The Marketing API has no public music upload endpoint",
            "Upload the track in TikTok Ads Manager, then provide its music id here",
        ))
    }

    async fn create_campaign(&self, payload: &CampaignPayload) -> ApiResult<CampaignReceipt> {
        let endpoint = format!("{}/campaign/create/", self.base_url);
        let body = json!({
            "advertiser_id": self.advertiser_id,
            "campaign_name": payload.campaign_name,
            "objective_type": objective_type(payload.objective),
            "budget_mode": "BUDGET_MODE_INFINITE",
            "operation_status": "ENABLE",
        });

        tracing::info!(campaign_name = %payload.campaign_name, "creating campaign");

        let response = self
            .http
            .post(&endpoint)
            .header("Access-Token", self.bearer()?)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let envelope: Envelope = response.json().await.map_err(transport_error)?;

        if envelope.code != 0 {
            let error = map_api_error(envelope.code, envelope.message.as_deref().unwrap_or(""));
            tracing::warn!(code = envelope.code, "campaign creation rejected");
            return Err(error);
        }

        let campaign_id = envelope
            .data
            .as_ref()
            .and_then(|data| data.get("campaign_id"))
            .map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| {
                ApiError::new(
                    ApiErrorCode::ServerError,
                    "campaign created but no campaign_id was returned",
                    "Check the campaign list in TikTok Ads Manager",
                )
            })?;

        tracing::info!(%campaign_id, "campaign created");
        Ok(CampaignReceipt {
            campaign_id: campaign_id.clone(),
            campaign_name: payload.campaign_name.clone(),
            status: "active".to_string(),
            dashboard_url: format!("https://ads.tiktok.com/i18n/campaign/{campaign_id}"),
            message: "Campaign created successfully on TikTok!".to_string(),
        })
    }
}

fn objective_type(objective: Objective) -> &'static str {
    match objective {
        Objective::Traffic => "TRAFFIC",
        Objective::Conversions => "CONVERSIONS",
    }
}

fn transport_error(source: reqwest::Error) -> ApiError {
    if source.is_timeout() {
        ApiError::new(
            ApiErrorCode::Timeout,
            "Request timed out",
            "Check your internet connection and retry",
        )
    } else {
        ApiError::new(
            ApiErrorCode::NetworkError,
            format!("Network error: {source}"),
            "Verify connectivity (and VPN, if one is required) and retry",
        )
    }
}

/// Translation table for the backend's numeric error codes.
fn map_api_error(code: i64, message: &str) -> ApiError {
    match code {
        40001 => ApiError::new(
            ApiErrorCode::AuthenticationFailed,
            format!("Invalid or expired access token: {message}"),
            "Re-authenticate using the OAuth flow",
        ),
        40002 => ApiError::new(
            ApiErrorCode::InvalidAdvertiser,
            format!("Invalid advertiser id: {message}"),
            "Verify the advertiser id in the configuration",
        ),
        40100 => ApiError::new(
            ApiErrorCode::ValidationFailed,
            format!("Request validation failed: {message}"),
            "Check that all required fields are provided",
        ),
        50000 => ApiError::new(
            ApiErrorCode::ServerError,
            format!("TikTok server error: {message}"),
            "Retry after a few minutes",
        ),
        other => ApiError::new(
            ApiErrorCode::ServerError,
            format!("TikTok API error ({other}): {message}"),
            "Consult the Marketing API documentation for this code",
        ),
    }
}
