//! Email delivery for loan notifications

use chrono::NaiveDate;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// SMTP-backed sender for reminder mail. The transport is built once at
/// startup and reused; lettre pools connections internally.
#[derive(Clone)]
pub struct EmailService {
    from: Mailbox,
    mailer: SmtpTransport,
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from_name = config.smtp_from_name.as_deref().unwrap_or("Biblion");
        let from = format!("{} <{}>", from_name, config.smtp_from)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let builder = if config.smtp_use_tls {
            SmtpTransport::starttls_relay(&config.smtp_host).map_err(|e| {
                AppError::Internal(format!("Failed to create SMTP transport: {}", e))
            })?
        } else {
            SmtpTransport::builder_dangerous(&config.smtp_host)
        };
        let mut builder = builder.port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            mailer: builder.build(),
        })
    }

    /// Send a due-date reminder for one loan
    pub async fn send_due_reminder(
        &self,
        to: &str,
        salutation: &str,
        book_title: &str,
        due_date: NaiveDate,
    ) -> AppResult<()> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;
        let body = format!(
            "Hello, {salutation}!\n\n\
             This is a reminder that '{book_title}' is due on {due_date}.\n\
             Please return the book on time or renew your loan.\n"
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Book return reminder")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        self.mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
