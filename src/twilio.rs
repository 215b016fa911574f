use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Error raised by the Twilio REST client.
///
/// `Rest` is the provider-level rejection (the API answered with an error
/// document); handlers surface it to callers. The other variants are local
/// failures and are treated as internal errors.
#[derive(Debug)]
pub enum TwilioError {
    /// The API returned a non-success status.
    Rest {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    /// The request never produced a usable response.
    Transport(String),
    /// A success response whose body could not be decoded.
    Decode(String),
}

impl fmt::Display for TwilioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TwilioError::Rest {
                status,
                code: Some(code),
                message,
            } => write!(f, "Twilio error {} (HTTP {}): {}", code, status, message),
            TwilioError::Rest {
                status,
                code: None,
                message,
            } => write!(f, "Twilio returned HTTP {}: {}", status, message),
            TwilioError::Transport(msg) => write!(f, "Twilio request failed: {}", msg),
            TwilioError::Decode(msg) => write!(f, "Failed to parse Twilio response: {}", msg),
        }
    }
}

impl std::error::Error for TwilioError {}

/// Twilio error document returned with non-success statuses.
#[derive(Debug, Deserialize)]
struct TwilioErrorDoc {
    code: Option<i64>,
    message: Option<String>,
}

/// A phone-number lookup, with add-on results left as raw JSON keyed by
/// add-on identifier (the shape varies per add-on).
#[derive(Debug, Clone)]
pub struct PhoneNumberLookup {
    pub phone_number: Option<String>,
    pub add_ons: Option<Value>,
    pub date_created: DateTime<Utc>,
}

/// An issued one-time-passcode verification.
#[derive(Debug, Clone, Deserialize)]
pub struct Verification {
    pub status: String,
}

/// The outcome of checking a submitted one-time passcode.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationCheck {
    pub status: String,
    pub valid: bool,
}

/// Client for the Twilio Lookup and Verify REST APIs.
///
/// Authenticates every request with HTTP basic auth (account SID / auth
/// token). Base URLs are injected from configuration so tests can point the
/// client at a local mock.
#[derive(Clone)]
pub struct TwilioClient {
    client: reqwest::Client,
    lookup_base_url: String,
    verify_base_url: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioClient {
    /// Creates a new `TwilioClient` from application configuration.
    pub fn new(config: &Config) -> Result<Self, TwilioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TwilioError::Transport(format!("Failed to create Twilio client: {}", e))
            })?;

        Ok(Self {
            client,
            lookup_base_url: config.lookup_base_url.clone(),
            verify_base_url: config.verify_base_url.clone(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
        })
    }

    /// Fetches phone-number metadata via the Lookup API.
    ///
    /// # Arguments
    ///
    /// * `phone_number` - The number to look up, as received from the caller.
    /// * `add_ons` - Add-on identifiers to attach (`AddOns` query parameter).
    /// * `add_on_params` - Add-on-scoped key/value options, already in wire
    ///   form (e.g. `AddOns.<sid>.secondary_address`).
    pub async fn lookup_phone_number(
        &self,
        phone_number: &str,
        add_ons: &[&str],
        add_on_params: &[(String, String)],
    ) -> Result<PhoneNumberLookup, TwilioError> {
        let mut params: Vec<(String, String)> = add_ons
            .iter()
            .map(|sid| ("AddOns".to_string(), sid.to_string()))
            .collect();
        params.extend_from_slice(add_on_params);

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/PhoneNumbers/{}", self.lookup_base_url, phone_number),
            &params,
        )
        .map_err(|e| TwilioError::Transport(format!("Failed to build lookup URL: {}", e)))?;

        tracing::info!("Twilio Lookup: fetching {}", phone_number);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| TwilioError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        let doc: Value = response
            .json()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))?;

        Ok(PhoneNumberLookup {
            phone_number: doc
                .get("phone_number")
                .and_then(Value::as_str)
                .map(String::from),
            add_ons: doc.get("add_ons").cloned(),
            date_created: Utc::now(),
        })
    }

    /// Starts a verification: the service sends a one-time passcode to `to`
    /// over the given channel.
    pub async fn start_verification(
        &self,
        service_sid: &str,
        to: &str,
        channel: &str,
    ) -> Result<Verification, TwilioError> {
        let url = format!(
            "{}/v2/Services/{}/Verifications",
            self.verify_base_url, service_sid
        );

        tracing::info!("Twilio Verify: sending {} code to {}", channel, to);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("Channel", channel)])
            .send()
            .await
            .map_err(|e| TwilioError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }

    /// Checks a submitted one-time passcode against a pending verification.
    pub async fn check_verification(
        &self,
        service_sid: &str,
        to: &str,
        code: &str,
    ) -> Result<VerificationCheck, TwilioError> {
        let url = format!(
            "{}/v2/Services/{}/VerificationCheck",
            self.verify_base_url, service_sid
        );

        tracing::info!("Twilio Verify: checking code for {}", to);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("Code", code)])
            .send()
            .await
            .map_err(|e| TwilioError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }

    /// Turns a non-success response into a `TwilioError::Rest`, extracting
    /// the error document's message when the body carries one.
    async fn rest_error(response: reqwest::Response) -> TwilioError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<TwilioErrorDoc>(&body) {
            Ok(doc) => TwilioError::Rest {
                status,
                code: doc.code,
                message: doc.message.unwrap_or(body),
            },
            Err(_) => TwilioError::Rest {
                status,
                code: None,
                message: body,
            },
        }
    }
}
