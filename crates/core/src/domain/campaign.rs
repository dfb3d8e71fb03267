use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validators::{self, CampaignValidation};

/// Campaign objective. The objective decides whether music is mandatory:
/// Conversions campaigns must carry a music id, Traffic campaigns may go
/// without one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    Traffic,
    Conversions,
}

impl Objective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traffic => "Traffic",
            Self::Conversions => "Conversions",
        }
    }

    /// Case-sensitive by contract with the ads backend.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Traffic" => Some(Self::Traffic),
            "Conversions" => Some(Self::Conversions),
            _ => None,
        }
    }

    pub fn music_required(&self) -> bool {
        matches!(self, Self::Conversions)
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three mutually exclusive music resolution paths, plus the undecided
/// starting point. Modeled as a sum type so "upload chosen but a stale id
/// from a different path attached" cannot be represented.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MusicPlan {
    #[default]
    Undecided,
    ExistingId(String),
    CustomUpload(String),
    NoMusic,
}

impl MusicPlan {
    pub fn describe(&self) -> String {
        match self {
            Self::Undecided => "not decided yet".to_string(),
            Self::ExistingId(id) => format!("existing track {id}"),
            Self::CustomUpload(file) => format!("custom upload {file}"),
            Self::NoMusic => "no music".to_string(),
        }
    }
}

/// Fully validated campaign payload, the only shape the ads port accepts.
///
/// `assemble` re-runs the complete validation pass, so a payload can only
/// exist for state that would also pass finalization. Mis-routed submit
/// actions fail here loudly instead of reaching the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPayload {
    pub campaign_name: String,
    pub objective: Objective,
    pub ad_text: String,
    pub cta: String,
    pub music_id: Option<String>,
}

impl CampaignPayload {
    pub fn assemble(
        campaign_name: Option<&str>,
        objective: Option<Objective>,
        ad_text: Option<&str>,
        cta: Option<&str>,
        music_id: Option<&str>,
    ) -> Result<Self, CampaignValidation> {
        let objective_raw = objective.map(|o| o.as_str().to_string()).unwrap_or_default();
        let validation = validators::validate_complete_campaign(
            campaign_name.unwrap_or_default(),
            &objective_raw,
            ad_text.unwrap_or_default(),
            cta.unwrap_or_default(),
            music_id,
        );
        if !validation.is_valid {
            return Err(validation);
        }

        // Validation passed, so none of the defaults below are reachable.
        Ok(Self {
            campaign_name: campaign_name.unwrap_or_default().trim().to_string(),
            objective: objective.unwrap_or(Objective::Traffic),
            ad_text: ad_text.unwrap_or_default().trim().to_string(),
            cta: cta.unwrap_or_default().trim().to_string(),
            music_id: music_id.map(str::trim).filter(|id| !id.is_empty()).map(str::to_string),
        })
    }
}
