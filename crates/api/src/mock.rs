//! In-process mock of the ads backend.
//!
//! Behaves like the real backend at the contract level: same result shapes,
//! same error codes, same rate limiting. Failure scenarios are triggered by
//! sentinel inputs so conversations and tests are deterministic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;

use adpilot_core::CampaignPayload;

use crate::port::{
    AdsApi, ApiError, ApiErrorCode, ApiResult, CampaignReceipt, MusicMetadata, UploadReceipt,
};
use crate::rate_limit::RateLimiter;

/// Music ids that always fail with a specific scenario, standing in for the
/// real backend's unpredictable rejections.
pub const CLAIMED_MUSIC_ID: &str = "MUS_CLAIMED";
pub const GEOFENCED_MUSIC_ID: &str = "MUS_GEOFENCED";
pub const OVERLONG_MUSIC_ID: &str = "MUS_TOOLONG";

struct LibraryTrack {
    title: &'static str,
    artist: &'static str,
    duration_secs: u32,
}

pub struct MockAdsApi {
    library: HashMap<&'static str, LibraryTrack>,
    limiter: Mutex<RateLimiter>,
    upload_seq: AtomicU64,
}

impl Default for MockAdsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdsApi {
    pub fn new() -> Self {
        Self::with_limits(RateLimiter::default())
    }

    pub fn with_rate_limit(max_requests: usize, window: Duration) -> Self {
        Self::with_limits(RateLimiter::new(max_requests, window))
    }

    fn with_limits(limiter: RateLimiter) -> Self {
        let mut library = HashMap::new();
        library.insert(
            "MUS_12345",
            LibraryTrack { title: "Trending Beat 2024", artist: "DJ Fresh", duration_secs: 30 },
        );
        library.insert(
            "MUS_67890",
            LibraryTrack { title: "Viral Dance Track", artist: "Sound Wave", duration_secs: 25 },
        );
        library.insert(
            "MUS_11111",
            LibraryTrack { title: "Chill Vibes", artist: "Ambient Artists", duration_secs: 45 },
        );
        library.insert(
            "MUSIC_99999",
            LibraryTrack { title: "Popular Song", artist: "Top Charts", duration_secs: 35 },
        );
        Self { library, limiter: Mutex::new(limiter), upload_seq: AtomicU64::new(0) }
    }

    fn check_rate_limit(&self) -> ApiResult<()> {
        let mut limiter = match self.limiter.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if limiter.try_acquire(Instant::now()) {
            Ok(())
        } else {
            Err(ApiError::new(
                ApiErrorCode::RateLimitExceeded,
                "Too many requests. Rate limit: 10 requests per minute",
                "Wait a moment before making more requests",
            ))
        }
    }

    fn scenario_for_music_id(&self, music_id: &str) -> Option<ApiError> {
        match music_id {
            CLAIMED_MUSIC_ID => Some(ApiError::new(
                ApiErrorCode::CopyrightClaim,
                "This music has active copyright restrictions and cannot be used in ads",
                "Choose royalty-free music or upload original content",
            )),
            GEOFENCED_MUSIC_ID => Some(ApiError::new(
                ApiErrorCode::GeoRestricted,
                "Music is not available in your target advertising region",
                "Select music that's available globally or change your target region",
            )),
            OVERLONG_MUSIC_ID => Some(ApiError::new(
                ApiErrorCode::DurationInvalid,
                "Music duration exceeds the maximum allowed for ads (60 seconds)",
                "Choose a shorter track or trim your music to under 60 seconds",
            )),
            _ => None,
        }
    }
}

#[async_trait]
impl AdsApi for MockAdsApi {
    async fn validate_music(&self, music_id: &str) -> ApiResult<MusicMetadata> {
        tracing::info!(music_id, "mock: validating music id");
        self.check_rate_limit()?;

        if let Some(error) = self.scenario_for_music_id(music_id) {
            return Err(error);
        }

        match self.library.get(music_id) {
            Some(track) => Ok(MusicMetadata {
                music_id: music_id.to_string(),
                title: track.title.to_string(),
                artist: track.artist.to_string(),
                duration_secs: track.duration_secs,
                status: "approved".to_string(),
            }),
            None => Err(ApiError::new(
                ApiErrorCode::InvalidMusicId,
                format!("Music ID '{music_id}' does not exist in the music library"),
                "Verify the music id or choose a track from the music catalog",
            )),
        }
    }

    async fn upload_music(&self, file_name: &str) -> ApiResult<UploadReceipt> {
        tracing::info!(file_name, "mock: uploading custom music");
        self.check_rate_limit()?;

        let lowered = file_name.to_ascii_lowercase();
        if lowered.contains("claimed") {
            return Err(ApiError::new(
                ApiErrorCode::CopyrightClaim,
                "Uploaded track matched copyrighted content",
                "Upload original content or licensed music",
            ));
        }
        if lowered.contains("toolong") {
            return Err(ApiError::new(
                ApiErrorCode::DurationInvalid,
                "Uploaded track exceeds the maximum ad duration (60 seconds)",
                "Trim the file to under 60 seconds and upload again",
            ));
        }

        let sequence = self.upload_seq.fetch_add(1, Ordering::Relaxed);
        Ok(UploadReceipt {
            music_id: format!("MUS_CUSTOM_{}", 10_000 + sequence),
            file_name: file_name.to_string(),
            status: "processing".to_string(),
            message: "Music uploaded successfully. Processing may take 1-2 minutes.".to_string(),
        })
    }

    async fn create_campaign(&self, payload: &CampaignPayload) -> ApiResult<CampaignReceipt> {
        tracing::info!(campaign_name = %payload.campaign_name, "mock: submitting campaign");
        self.check_rate_limit()?;

        let campaign_id = format!("CAMP_{}", rand::thread_rng().gen_range(100_000..=999_999));
        let dashboard_url = format!("https://ads.tiktok.com/campaigns/{campaign_id}");
        Ok(CampaignReceipt {
            campaign_id,
            campaign_name: payload.campaign_name.clone(),
            status: "active".to_string(),
            dashboard_url,
            message: "Campaign created successfully!".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use adpilot_core::{CampaignPayload, Objective};

    use super::{MockAdsApi, CLAIMED_MUSIC_ID, GEOFENCED_MUSIC_ID, OVERLONG_MUSIC_ID};
    use crate::port::{AdsApi, ApiErrorCode};

    fn payload() -> CampaignPayload {
        CampaignPayload::assemble(
            Some("Summer Sale"),
            Some(Objective::Traffic),
            Some("Get 50% off!"),
            Some("Shop Now"),
            None,
        )
        .expect("fixture payload")
    }

    #[tokio::test]
    async fn library_track_validates_with_metadata() {
        let api = MockAdsApi::new();
        let metadata = api.validate_music("MUS_12345").await.expect("known id");
        assert_eq!(metadata.title, "Trending Beat 2024");
        assert_eq!(metadata.artist, "DJ Fresh");
        assert_eq!(metadata.duration_secs, 30);
        assert_eq!(metadata.status, "approved");
    }

    #[tokio::test]
    async fn unregistered_id_fails_with_invalid_music_id() {
        let api = MockAdsApi::new();
        let error = api.validate_music("MUS_00000").await.expect_err("unknown id");
        assert_eq!(error.code, ApiErrorCode::InvalidMusicId);
        // The explanation shown to users must not contain the raw code.
        assert!(!error.explain().contains("invalid_music_id"));
    }

    #[tokio::test]
    async fn sentinel_ids_map_to_their_scenarios() {
        let api = MockAdsApi::new();
        let cases = [
            (CLAIMED_MUSIC_ID, ApiErrorCode::CopyrightClaim),
            (GEOFENCED_MUSIC_ID, ApiErrorCode::GeoRestricted),
            (OVERLONG_MUSIC_ID, ApiErrorCode::DurationInvalid),
        ];
        for (id, expected) in cases {
            let error = api.validate_music(id).await.expect_err("sentinel id");
            assert_eq!(error.code, expected, "for sentinel {id}");
        }
    }

    #[tokio::test]
    async fn upload_mints_processing_music_id() {
        let api = MockAdsApi::new();
        let first = api.upload_music("brand_anthem.mp3").await.expect("upload");
        let second = api.upload_music("brand_anthem_v2.mp3").await.expect("upload");

        assert!(first.music_id.starts_with("MUS_CUSTOM_"));
        assert_eq!(first.status, "processing");
        assert_ne!(first.music_id, second.music_id);
    }

    #[tokio::test]
    async fn upload_sentinel_file_names_fail() {
        let api = MockAdsApi::new();
        let error = api.upload_music("claimed_song.mp3").await.expect_err("sentinel upload");
        assert_eq!(error.code, ApiErrorCode::CopyrightClaim);
        let error = api.upload_music("toolong_mix.wav").await.expect_err("sentinel upload");
        assert_eq!(error.code, ApiErrorCode::DurationInvalid);
    }

    #[tokio::test]
    async fn campaign_creation_returns_receipt() {
        let api = MockAdsApi::new();
        let receipt = api.create_campaign(&payload()).await.expect("create");
        assert!(receipt.campaign_id.starts_with("CAMP_"));
        assert_eq!(receipt.campaign_name, "Summer Sale");
        assert_eq!(receipt.status, "active");
        assert!(receipt.dashboard_url.contains(&receipt.campaign_id));
    }

    #[tokio::test]
    async fn rate_limit_applies_across_operations() {
        let api = MockAdsApi::with_rate_limit(2, Duration::from_secs(60));
        api.validate_music("MUS_12345").await.expect("first request");
        api.upload_music("track.mp3").await.expect("second request");

        let error = api.create_campaign(&payload()).await.expect_err("over the limit");
        assert_eq!(error.code, ApiErrorCode::RateLimitExceeded);
    }
}
