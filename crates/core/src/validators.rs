//! Field-level business rules and the full-campaign validation pass.
//!
//! Every function here is pure and idempotent. Validators return
//! `Ok(normalized_value)` so callers always work with the trimmed form that
//! will be submitted, and `Err(message)` with text that can be shown to the
//! user verbatim.

use crate::domain::campaign::Objective;

pub const AD_TEXT_MAX_CHARS: usize = 100;
pub const CAMPAIGN_NAME_MIN_CHARS: usize = 3;

pub fn validate_campaign_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Campaign name cannot be empty".to_string());
    }
    if trimmed.chars().count() < CAMPAIGN_NAME_MIN_CHARS {
        return Err(format!(
            "Campaign name must be at least {CAMPAIGN_NAME_MIN_CHARS} characters (current: {})",
            trimmed.chars().count()
        ));
    }
    Ok(trimmed.to_string())
}

pub fn validate_objective(raw: &str) -> Result<Objective, String> {
    Objective::parse(raw).ok_or_else(|| {
        format!("Invalid objective: '{raw}'. Valid options: Traffic, Conversions")
    })
}

pub fn validate_ad_text(text: &str) -> Result<String, String> {
    if text.trim().is_empty() {
        return Err("Ad text cannot be empty".to_string());
    }
    let length = text.chars().count();
    if length > AD_TEXT_MAX_CHARS {
        return Err(format!(
            "Ad text too long: {length} characters (max: {AD_TEXT_MAX_CHARS}). \
             Please shorten by {} characters",
            length - AD_TEXT_MAX_CHARS
        ));
    }
    Ok(text.trim().to_string())
}

pub fn validate_cta(cta: &str) -> Result<String, String> {
    let trimmed = cta.trim();
    if trimmed.is_empty() {
        return Err("CTA cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// The music requirement check. This is the requirement rule only; whether a
/// supplied id actually exists is the ads backend's call.
pub fn validate_music_for_objective(
    objective: Objective,
    music_id: Option<&str>,
) -> Result<String, String> {
    let has_music = music_id.is_some_and(|id| !id.trim().is_empty());

    if objective.music_required() && !has_music {
        return Err(
            "Music is REQUIRED for Conversions campaigns. Conversions campaigns need \
             engaging music to drive user action. You can provide an existing music id \
             or upload custom music."
                .to_string(),
        );
    }

    if has_music {
        Ok("Music id provided".to_string())
    } else {
        Ok("No music is fine for Traffic campaigns (optional)".to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl CampaignValidation {
    pub fn error_lines(&self) -> String {
        self.errors.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n")
    }
}

/// Runs every field validator plus the music requirement and collects all
/// failures in field order (name, objective, ad text, cta, music). Never
/// short-circuits: the user gets the complete correction list in one turn.
pub fn validate_complete_campaign(
    campaign_name: &str,
    objective: &str,
    ad_text: &str,
    cta: &str,
    music_id: Option<&str>,
) -> CampaignValidation {
    let mut errors = Vec::new();

    if let Err(message) = validate_campaign_name(campaign_name) {
        errors.push(message);
    }

    let parsed_objective = match validate_objective(objective) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.push(message);
            None
        }
    };

    if let Err(message) = validate_ad_text(ad_text) {
        errors.push(message);
    }

    if let Err(message) = validate_cta(cta) {
        errors.push(message);
    }

    // The requirement is evaluated against whatever objective parses right
    // now, not against the one in effect when music was collected.
    if let Some(objective) = parsed_objective {
        if let Err(message) = validate_music_for_objective(objective, music_id) {
            errors.push(message);
        }
    }

    CampaignValidation { is_valid: errors.is_empty(), errors }
}
