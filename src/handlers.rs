use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::twilio::TwilioClient;
use axum::{
    http::{header, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum::extract::State;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Twilio Lookup and Verify APIs.
    pub twilio: TwilioClient,
}

/// Builds the API router: the two endpoints plus health, wrapped in the
/// body-size limit, request tracing, and the fixed CORS response headers.
///
/// The header layers are overriding and sit outermost; every response,
/// including errors, carries the full CORS set.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/check-spam", post(check_spam).options(preflight))
        .route("/api/verify", post(verify).options(preflight))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(1024 * 1024)))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
}

/// CORS preflight: 200 with an empty body. The headers come from the router
/// layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-phone-trust-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/check-spam
///
/// Looks up a phone number's spam reputation via the Nomorobo Spam Score
/// add-on and remaps the add-on result into the frontend's risk-assessment
/// payload.
pub async fn check_spam(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<SpamCheckResponse>, AppError> {
    tracing::info!("POST /api/check-spam");

    let request: SpamCheckRequest = serde_json::from_str(&body)?;

    let Some(phone_number) = request.phone_number.filter(|p| !p.is_empty()) else {
        return Err(AppError::BadRequest("Phone number is required".to_string()));
    };

    let config = &state.config;
    if config.twilio_account_sid.is_empty() || config.twilio_auth_token.is_empty() {
        return Err(AppError::ConfigError);
    }

    let addon_sid = config.nomorobo_addon_sid.as_str();
    let mut add_on_params = Vec::new();
    if let Some(secondary) = request.secondary_phone_number.filter(|p| !p.is_empty()) {
        add_on_params.push((
            format!("AddOns.{}.secondary_address", addon_sid),
            secondary,
        ));
    }

    let lookup = state
        .twilio
        .lookup_phone_number(&phone_number, &[addon_sid], &add_on_params)
        .await
        .map_err(|e| AppError::upstream("Failed to check phone number", e))?;

    // Add-on results are keyed by the add-on SID
    let addon_result = lookup
        .add_ons
        .as_ref()
        .and_then(|a| a.get("results"))
        .and_then(|r| r.get(addon_sid));

    let successful = addon_result
        .and_then(|r| r.get("status"))
        .and_then(Value::as_str)
        == Some("successful");
    if !successful {
        let details = addon_result
            .cloned()
            .unwrap_or_else(|| Value::String("No result from Nomorobo".to_string()));
        return Err(AppError::SpamScoreUnavailable(details));
    }

    let score = addon_result
        .and_then(|r| r.get("result"))
        .and_then(|r| r.get("score"))
        .cloned()
        .unwrap_or(Value::Null);

    tracing::info!("Spam check complete for {}: score {}", phone_number, score);

    Ok(Json(SpamCheckResponse::from_score(
        score,
        lookup.date_created,
    )))
}

/// POST /api/verify
///
/// Dispatches on `action`: `send` issues an SMS one-time passcode, `verify`
/// checks a submitted passcode. The pending-code state lives entirely in the
/// provider's verification service.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<VerificationOutcome>, AppError> {
    tracing::info!("POST /api/verify");

    let request: VerifyRequest = serde_json::from_str(&body)?;

    let Some(action) = request.action.filter(|a| !a.is_empty()) else {
        return Err(AppError::BadRequest("Action is required".to_string()));
    };

    let config = &state.config;
    if config.twilio_account_sid.is_empty()
        || config.twilio_auth_token.is_empty()
        || config.twilio_verify_service_sid.is_empty()
    {
        return Err(AppError::ConfigError);
    }
    let service_sid = config.twilio_verify_service_sid.as_str();

    match action.as_str() {
        "send" => {
            let Some(phone_number) = request.phone_number.filter(|p| !p.is_empty()) else {
                return Err(AppError::BadRequest("Phone number is required".to_string()));
            };

            let verification = state
                .twilio
                .start_verification(service_sid, &phone_number, "sms")
                .await
                .map_err(|e| AppError::upstream("Failed to send verification code", e))?;

            tracing::info!(
                "Verification code sent to {}: {}",
                phone_number,
                verification.status
            );

            Ok(Json(VerificationOutcome {
                success: true,
                valid: None,
                status: verification.status,
            }))
        }
        "verify" => {
            let (Some(phone_number), Some(code)) = (
                request.phone_number.filter(|p| !p.is_empty()),
                request.code.filter(|c| !c.is_empty()),
            ) else {
                return Err(AppError::BadRequest(
                    "Phone number and verification code are required".to_string(),
                ));
            };

            let check = state
                .twilio
                .check_verification(service_sid, &phone_number, &code)
                .await
                .map_err(|e| AppError::upstream("Failed to verify code", e))?;

            tracing::info!(
                "Verification check for {}: valid={} status={}",
                phone_number,
                check.valid,
                check.status
            );

            Ok(Json(VerificationOutcome {
                success: true,
                valid: Some(check.valid),
                status: check.status,
            }))
        }
        _ => Err(AppError::BadRequest("Invalid action".to_string())),
    }
}
