/// Integration tests with a mocked Twilio API
/// Tests the provider client's encoding and decoding without hitting the
/// real Lookup/Verify services
use rust_phone_trust_api::config::Config;
use rust_phone_trust_api::twilio::{TwilioClient, TwilioError};
use wiremock::matchers::{basic_auth, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDON_SID: &str = "XE0123456789abcdef0123456789abcdef";
const VERIFY_SID: &str = "VA0123456789abcdef0123456789abcdef";

/// Helper function to create test config
fn create_test_config(lookup_base_url: String, verify_base_url: String) -> Config {
    Config {
        port: 8080,
        twilio_account_sid: "ACtest".to_string(),
        twilio_auth_token: "test_token".to_string(),
        nomorobo_addon_sid: ADDON_SID.to_string(),
        twilio_verify_service_sid: VERIFY_SID.to_string(),
        lookup_base_url,
        verify_base_url,
    }
}

fn lookup_body(status: &str, score: i64) -> serde_json::Value {
    serde_json::json!({
        "caller_name": null,
        "country_code": "US",
        "phone_number": "+15551234567",
        "national_format": "(555) 123-4567",
        "add_ons": {
            "status": "successful",
            "message": null,
            "code": null,
            "results": {
                ADDON_SID: {
                    "request_sid": "XR0123456789abcdef0123456789abcdef",
                    "status": status,
                    "message": null,
                    "code": null,
                    "result": { "status": "success", "score": score }
                }
            }
        }
    })
}

#[tokio::test]
async fn test_lookup_success_with_addon_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/PhoneNumbers/+15551234567"))
        .and(query_param("AddOns", ADDON_SID))
        .and(basic_auth("ACtest", "test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body("successful", 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let lookup = client
        .lookup_phone_number("+15551234567", &[ADDON_SID], &[])
        .await
        .unwrap();

    assert_eq!(lookup.phone_number.as_deref(), Some("+15551234567"));
    let score = lookup
        .add_ons
        .as_ref()
        .and_then(|a| a.get("results"))
        .and_then(|r| r.get(ADDON_SID))
        .and_then(|r| r.get("result"))
        .and_then(|r| r.get("score"))
        .and_then(|s| s.as_i64());
    assert_eq!(score, Some(1));
}

#[tokio::test]
async fn test_lookup_forwards_addon_scoped_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/PhoneNumbers/+15551234567"))
        .and(query_param("AddOns", ADDON_SID))
        .and(query_param(
            format!("AddOns.{}.secondary_address", ADDON_SID),
            "+15559876543",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_body("successful", 0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let params = vec![(
        format!("AddOns.{}.secondary_address", ADDON_SID),
        "+15559876543".to_string(),
    )];
    let result = client
        .lookup_phone_number("+15551234567", &[ADDON_SID], &params)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_lookup_rejection_extracts_error_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/PhoneNumbers/+1999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 20404,
            "message": "The requested resource /PhoneNumbers/+1999 was not found",
            "more_info": "https://www.twilio.com/docs/errors/20404",
            "status": 404
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let err = client
        .lookup_phone_number("+1999", &[ADDON_SID], &[])
        .await
        .unwrap_err();

    match err {
        TwilioError::Rest {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, Some(20404));
            assert!(message.contains("was not found"));
        }
        other => panic!("Expected Rest error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_rejection_with_unparseable_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/PhoneNumbers/+15551234567"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let err = client
        .lookup_phone_number("+15551234567", &[ADDON_SID], &[])
        .await
        .unwrap_err();

    match err {
        TwilioError::Rest {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 502);
            assert_eq!(code, None);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("Expected Rest error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_start_verification_posts_form_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/Services/{}/Verifications", VERIFY_SID)))
        .and(basic_auth("ACtest", "test_token"))
        .and(body_string_contains("Channel=sms"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "sid": "VE0123456789abcdef0123456789abcdef",
            "service_sid": VERIFY_SID,
            "to": "+15551234567",
            "channel": "sms",
            "status": "pending",
            "valid": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let verification = client
        .start_verification(VERIFY_SID, "+15551234567", "sms")
        .await
        .unwrap();

    assert_eq!(verification.status, "pending");
}

#[tokio::test]
async fn test_check_verification_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/Services/{}/VerificationCheck", VERIFY_SID)))
        .and(body_string_contains("Code=123456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sid": "VE0123456789abcdef0123456789abcdef",
            "service_sid": VERIFY_SID,
            "to": "+15551234567",
            "channel": "sms",
            "status": "approved",
            "valid": true
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let check = client
        .check_verification(VERIFY_SID, "+15551234567", "123456")
        .await
        .unwrap();

    assert!(check.valid);
    assert_eq!(check.status, "approved");
}

#[tokio::test]
async fn test_check_verification_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v2/Services/{}/VerificationCheck", VERIFY_SID)))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 20404,
            "message": "The requested resource was not found",
            "status": 404
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), mock_server.uri());
    let client = TwilioClient::new(&config).unwrap();

    let err = client
        .check_verification(VERIFY_SID, "+15551234567", "000000")
        .await
        .unwrap_err();

    assert!(matches!(err, TwilioError::Rest { status: 404, .. }));
}
