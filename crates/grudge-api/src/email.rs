use anyhow::Result;
use tracing::info;

/// Password-reset mail delivery via the Resend HTTP API. Without an API key
/// the reset URL is logged instead, which is the dev-mode behavior.
#[derive(Clone)]
pub struct Mailer {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Mailer {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("RESEND_API_KEY").ok(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn send_password_reset(&self, email: &str, reset_url: &str) -> Result<()> {
        let Some(api_key) = &self.api_key else {
            info!("DEV MODE password reset for {}: {}", email, reset_url);
            return Ok(());
        };

        let body = serde_json::json!({
            "from": "Grudge <noreply@resend.dev>",
            "to": email,
            "subject": "Reset your password",
            "html": format!(
                "<h2>Password Reset Request</h2>\
                 <p>Click the link below to reset your password:</p>\
                 <a href=\"{reset_url}\">Reset Password</a>\
                 <p>This link expires in 1 hour.</p>\
                 <p>If you didn't request this, ignore this email.</p>"
            ),
        });

        let res = self
            .client
            .post("https://api.resend.com/emails")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            anyhow::bail!("mail provider returned {}", res.status());
        }

        Ok(())
    }
}
