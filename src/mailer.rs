use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp error: {0}")]
    Smtp(String),
}

/// An outbound CSV mail, ready for the transport.
#[derive(Debug, Clone)]
pub struct OutgoingCsv {
    pub recipient: String,
    pub subject: String,
    pub message: String,
    pub filename: String,
    pub csv: String,
}

/// Seam between the HTTP layer and the mail transport, so tests can swap the
/// real SMTP client for a recording stub.
pub trait MailSender: Send + Sync {
    fn send_csv(&self, mail: &OutgoingCsv) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    smtp: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let tls_parameters =
            TlsParameters::new(config.host.clone()).map_err(|e| MailError::Smtp(e.to_string()))?;

        let smtp = SmtpTransport::relay(&config.host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .credentials(creds)
            .port(config.port)
            .tls(Tls::Wrapper(tls_parameters))
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailError::InvalidAddress(config.from.clone()))?;

        Ok(SmtpMailer { smtp, from })
    }
}

impl MailSender for SmtpMailer {
    fn send_csv(&self, mail: &OutgoingCsv) -> Result<(), MailError> {
        let to: Mailbox = mail
            .recipient
            .parse()
            .map_err(|_| MailError::InvalidAddress(mail.recipient.clone()))?;

        let content_type = ContentType::parse("text/csv; charset=utf-8")
            .map_err(|e| MailError::Build(e.to_string()))?;
        let attachment =
            Attachment::new(mail.filename.clone()).body(mail.csv.clone(), content_type);

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(mail.message.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.smtp
            .send(&email)
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        Ok(())
    }
}
