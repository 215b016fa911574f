use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Request payloads ============

/// Body of `POST /api/check-spam`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamCheckRequest {
    /// The number whose reputation is being checked.
    pub phone_number: Option<String>,
    /// Optional second line forwarded to the add-on as `secondary_address`.
    pub secondary_phone_number: Option<String>,
}

/// Body of `POST /api/verify`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// `send` or `verify`.
    pub action: Option<String>,
    pub phone_number: Option<String>,
    /// The submitted passcode; required for `verify`.
    pub code: Option<String>,
}

// ============ Response payloads ============

/// Overall reputation of a number, and of each synthesized carrier entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReputationStatus {
    Clean,
    Flagged,
}

/// Per-carrier status entry in the spam-check response.
#[derive(Debug, Clone, Serialize)]
pub struct CarrierStatus {
    pub name: String,
    pub status: ReputationStatus,
}

/// Provider score passthrough (`null` when the add-on omitted it).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpamData {
    pub nomorobo_score: Value,
}

/// Successful spam-check result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamCheckResponse {
    pub status: ReputationStatus,
    pub risk_score: u8,
    pub carriers: Vec<CarrierStatus>,
    pub time_checked: DateTime<Utc>,
    pub recommendations: Vec<String>,
    pub raw_data: RawSpamData,
}

/// Successful verification result. `valid` is only present for the `verify`
/// action.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    pub status: String,
}

// ============ Spam score mapping ============

pub const FLAGGED_RISK_SCORE: u8 = 85;
pub const CLEAN_RISK_SCORE: u8 = 10;

/// The carrier list is illustrative placeholder data shown by the frontend,
/// not independently sourced per-carrier intelligence.
pub const CARRIER_NAMES: [&str; 3] = ["AT&T", "Verizon", "T-Mobile"];

pub const FLAGGED_RECOMMENDATIONS: [&str; 4] = [
    "Immediate number remediation required",
    "Implement branded caller ID solutions",
    "Register with carrier reputation systems",
    "Consider number rotation strategy",
];

pub const CLEAN_RECOMMENDATIONS: [&str; 3] = [
    "Continue monitoring your number",
    "Use branded caller ID to increase answer rates",
    "Maintain consistent calling patterns",
];

/// Maps the Nomorobo score to the application's reputation fields.
///
/// The mapping is binary: a score of exactly 1 means confirmed spam; any
/// other value, including a missing score, is treated as clean.
pub fn assess_spam_score(score: Option<i64>) -> (ReputationStatus, u8) {
    if score == Some(1) {
        (ReputationStatus::Flagged, FLAGGED_RISK_SCORE)
    } else {
        (ReputationStatus::Clean, CLEAN_RISK_SCORE)
    }
}

impl SpamCheckResponse {
    /// Builds the full response from the raw provider score and the lookup's
    /// creation timestamp.
    pub fn from_score(score: Value, time_checked: DateTime<Utc>) -> Self {
        let (status, risk_score) = assess_spam_score(score.as_i64());

        let recommendations = match status {
            ReputationStatus::Flagged => FLAGGED_RECOMMENDATIONS.as_slice(),
            ReputationStatus::Clean => CLEAN_RECOMMENDATIONS.as_slice(),
        };

        Self {
            status,
            risk_score,
            carriers: CARRIER_NAMES
                .iter()
                .map(|name| CarrierStatus {
                    name: name.to_string(),
                    status,
                })
                .collect(),
            time_checked,
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
            raw_data: RawSpamData {
                nomorobo_score: score,
            },
        }
    }
}
