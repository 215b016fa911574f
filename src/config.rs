use serde::Deserialize;

pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://lookups.twilio.com";
pub const DEFAULT_VERIFY_BASE_URL: &str = "https://verify.twilio.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub nomorobo_addon_sid: String,
    pub twilio_verify_service_sid: String,
    pub lookup_base_url: String,
    pub verify_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            twilio_account_sid: std::env::var("TWILIO_ACCOUNT_SID")
                .map_err(|_| anyhow::anyhow!("TWILIO_ACCOUNT_SID environment variable required"))
                .and_then(|sid| {
                    if sid.trim().is_empty() {
                        anyhow::bail!("TWILIO_ACCOUNT_SID cannot be empty");
                    }
                    Ok(sid)
                })?,
            twilio_auth_token: std::env::var("TWILIO_AUTH_TOKEN")
                .map_err(|_| anyhow::anyhow!("TWILIO_AUTH_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("TWILIO_AUTH_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            nomorobo_addon_sid: std::env::var("NOMOROBO_ADDON_SID")
                .map_err(|_| anyhow::anyhow!("NOMOROBO_ADDON_SID environment variable required"))
                .and_then(|sid| {
                    if sid.trim().is_empty() {
                        anyhow::bail!("NOMOROBO_ADDON_SID cannot be empty");
                    }
                    Ok(sid)
                })?,
            twilio_verify_service_sid: std::env::var("TWILIO_VERIFY_SERVICE_SID")
                .map_err(|_| {
                    anyhow::anyhow!("TWILIO_VERIFY_SERVICE_SID environment variable required")
                })
                .and_then(|sid| {
                    if sid.trim().is_empty() {
                        anyhow::bail!("TWILIO_VERIFY_SERVICE_SID cannot be empty");
                    }
                    Ok(sid)
                })?,
            lookup_base_url: validate_base_url(
                "TWILIO_LOOKUP_BASE_URL",
                std::env::var("TWILIO_LOOKUP_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_LOOKUP_BASE_URL.to_string()),
            )?,
            verify_base_url: validate_base_url(
                "TWILIO_VERIFY_BASE_URL",
                std::env::var("TWILIO_VERIFY_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_VERIFY_BASE_URL.to_string()),
            )?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Twilio Account SID: {}...",
            &config.twilio_account_sid[..8.min(config.twilio_account_sid.len())]
        );
        tracing::debug!("Lookup Base URL: {}", config.lookup_base_url);
        tracing::debug!("Verify Base URL: {}", config.verify_base_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn validate_base_url(var: &str, url: String) -> anyhow::Result<String> {
    if url.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", var);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", var);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_and_https() {
        assert!(validate_base_url("X", "https://lookups.twilio.com".to_string()).is_ok());
        assert!(validate_base_url("X", "http://127.0.0.1:8080".to_string()).is_ok());
    }

    #[test]
    fn base_url_rejects_other_schemes_and_blanks() {
        assert!(validate_base_url("X", "ftp://example.com".to_string()).is_err());
        assert!(validate_base_url("X", "".to_string()).is_err());
        assert!(validate_base_url("X", "   ".to_string()).is_err());
    }

    #[test]
    fn from_env_fails_closed_without_credentials() {
        std::env::remove_var("TWILIO_ACCOUNT_SID");
        std::env::remove_var("TWILIO_AUTH_TOKEN");
        std::env::remove_var("NOMOROBO_ADDON_SID");
        std::env::remove_var("TWILIO_VERIFY_SERVICE_SID");
        assert!(Config::from_env().is_err());
    }
}
