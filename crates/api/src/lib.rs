//! Ads backend port and its two implementations.
//!
//! The orchestrator depends only on the [`AdsApi`] trait. `MockAdsApi` is a
//! deterministic in-process stand-in with the same contract, error codes,
//! and rate limiting as the real backend; `TikTokAdsClient` talks to the
//! TikTok Marketing API over HTTP.

pub mod auth;
pub mod mock;
pub mod port;
pub mod rate_limit;
pub mod real;

pub use auth::AccessToken;
pub use mock::MockAdsApi;
pub use port::{
    AdsApi, ApiError, ApiErrorCode, ApiResult, CampaignReceipt, MusicMetadata, UploadReceipt,
};
pub use rate_limit::RateLimiter;
pub use real::TikTokAdsClient;
