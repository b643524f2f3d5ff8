//! Report delivery.
//!
//! [`notify`] turns a [`Report`] into one [`OutgoingMail`] and hands it to a
//! [`Deliverer`]. There is no retry: a failed delivery is returned to the
//! caller as a [`DeliveryError`] and ends the run.
//!
//! - [`SmtpDeliverer`]: SMTP submission through `lettre`
//! - [`StdoutDeliverer`]: prints the message instead (`--dry-run`)

use std::fmt;

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info, instrument};

use crate::error::DeliveryError;
use crate::models::{Report, ReportFormat};

/// A fully addressed message, ready for the delivery capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub format: ReportFormat,
}

/// The delivery capability. One call sends one whole message or fails.
pub trait Deliverer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// `prefix` followed by the run date as `YYYY-MM-DD`.
pub fn subject_line(prefix: &str, run_date: NaiveDate) -> String {
    format!("{prefix}{}", run_date.format("%Y-%m-%d"))
}

/// Send `report` to `recipient`.
///
/// # Arguments
///
/// * `deliverer` - SMTP in production, stdout in dry-run
/// * `report` - The rendered report; its format picks the content type
/// * `recipient` - Destination address
/// * `subject_prefix` / `run_date` - Combined by [`subject_line`]
///
/// # Returns
///
/// `Ok(())` once the message is accepted. Delivery is attempted exactly once;
/// any error is logged and returned so the caller can fail the run.
#[instrument(level = "info", skip_all, fields(%recipient))]
pub async fn notify<D: Deliverer>(
    deliverer: &D,
    report: &Report,
    recipient: &str,
    subject_prefix: &str,
    run_date: NaiveDate,
) -> Result<(), DeliveryError> {
    let mail = OutgoingMail {
        to: recipient.to_string(),
        subject: subject_line(subject_prefix, run_date),
        body: report.body.clone(),
        format: report.format,
    };

    match deliverer.deliver(&mail).await {
        Ok(()) => {
            info!(subject = %mail.subject, bytes = mail.body.len(), "Report delivered");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Report delivery failed");
            Err(e)
        }
    }
}

/// Parse an address into a mailbox, mapping errors into [`DeliveryError`].
pub fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|e: lettre::address::AddressError| DeliveryError::Address {
        address: address.to_string(),
        message: e.to_string(),
    })
}

/// Build the MIME message for `mail`.
pub fn build_message(from: &Mailbox, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
    let content_type = match mail.format {
        ReportFormat::Plain => ContentType::TEXT_PLAIN,
        ReportFormat::Html => ContentType::TEXT_HTML,
    };
    Message::builder()
        .from(from.clone())
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.as_str())
        .header(content_type)
        .body(mail.body.clone())
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

/// Authenticated SMTP submission.
///
/// Port 465 uses implicit TLS; any other port upgrades with STARTTLS.
pub struct SmtpDeliverer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
    port: u16,
}

impl SmtpDeliverer {
    pub fn new(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        from: Mailbox,
    ) -> Result<Self, DeliveryError> {
        let builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        };
        let builder = builder.map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let transport = builder
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self {
            transport,
            from,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Debug for SmtpDeliverer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpDeliverer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl Deliverer for SmtpDeliverer {
    #[instrument(level = "info", skip_all, fields(host = %self.host, port = self.port))]
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = build_message(&self.from, mail)?;
        match self.transport.send(message).await {
            Ok(response) if response.is_positive() => Ok(()),
            Ok(response) => Err(DeliveryError::Rejected(format!(
                "server replied {}",
                response.code()
            ))),
            Err(e) if e.is_permanent() => Err(DeliveryError::Rejected(e.to_string())),
            Err(e) => Err(DeliveryError::Transport(e.to_string())),
        }
    }
}

/// Prints the message to stdout instead of sending it.
#[derive(Debug, Default)]
pub struct StdoutDeliverer;

impl Deliverer for StdoutDeliverer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        println!("To: {}", mail.to);
        println!("Subject: {}", mail.subject);
        println!();
        println!("{}", mail.body);
        Ok(())
    }
}
