use crate::config::email::EmailConfig;
use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

const NOTIFICATION_SIGNATURE: &str = "\nHexagon - Notifications";

#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
    frontend_url: String,
}

impl EmailService {
    /// Without SMTP settings every send is a logged no-op.
    pub fn from_env() -> Self {
        let Some(cfg) = EmailConfig::from_env() else {
            return Self::disabled(
                std::env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            );
        };

        let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
        match AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .map(|builder| builder.port(cfg.smtp_port).credentials(creds).build())
        {
            Ok(transport) => Self {
                transport: Some(transport),
                from_address: Some(cfg.from_address),
                frontend_url: cfg.frontend_url,
            },
            Err(e) => {
                tracing::warn!("Failed to build SMTP transport: {e}");
                Self::disabled(cfg.frontend_url)
            }
        }
    }

    pub fn disabled(frontend_url: String) -> Self {
        Self {
            transport: None,
            from_address: None,
            frontend_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub async fn send_verification_email(&self, to: &str, token: &str) -> Result<()> {
        let link = format!("{}/verify-email?token={}", self.frontend_url, token);
        let body = format!(
            "Welcome to Hexagon! Confirm your email with the link below:\n\n{}\n\nThis link expires in 24 hours.",
            link
        );
        self.send_email(to, "Verify your email", &body).await
    }

    /// Mail copy of an in-app notification.
    pub async fn send_notification_email(&self, to: &str, title: &str, content: &str) -> Result<()> {
        let body = notification_body(content);
        self.send_email(to, title, &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let (Some(transport), Some(from_address)) = (&self.transport, &self.from_address) else {
            tracing::debug!("SMTP not configured, skipping email to {to}");
            return Ok(());
        };

        let from: Mailbox = from_address
            .parse()
            .with_context(|| format!("Invalid from address '{}'", from_address))?;
        let to_mailbox: Mailbox = to
            .parse()
            .with_context(|| format!("Invalid to address '{}'", to))?;

        let email = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        tracing::info!("Email sent to {to}: {subject}");
        Ok(())
    }
}

fn notification_body(content: &str) -> String {
    format!("{}{}", content, NOTIFICATION_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_mail_is_signed() {
        assert_eq!(
            notification_body("ana has followed you"),
            "ana has followed you\nHexagon - Notifications"
        );
    }

    #[tokio::test]
    async fn unconfigured_transport_skips_quietly() {
        let email = EmailService::disabled("http://localhost".to_string());
        assert!(!email.is_configured());
        assert!(email
            .send_notification_email("a@test.com", "New post", "hi")
            .await
            .is_ok());
    }
}
