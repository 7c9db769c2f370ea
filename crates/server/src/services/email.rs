//! Transactional email for buyers.
//!
//! Uses SMTP via lettre with Askama templates (plain text + HTML). Without
//! SMTP settings the service logs each message instead of sending it.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use seedmart_core::{Email, InvoiceId, format_inr};

use crate::config::{EmailConfig, ServerConfig};

#[derive(Template)]
#[template(path = "email/kyc_approved.html")]
struct KycApprovedHtml<'a> {
    seller: &'a str,
    name: &'a str,
    login_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/kyc_approved.txt")]
struct KycApprovedText<'a> {
    seller: &'a str,
    name: &'a str,
    login_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/kyc_rejected.html")]
struct KycRejectedHtml<'a> {
    seller: &'a str,
    name: &'a str,
    reason: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/kyc_rejected.txt")]
struct KycRejectedText<'a> {
    seller: &'a str,
    name: &'a str,
    reason: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/order_approved.html")]
struct OrderApprovedHtml<'a> {
    seller: &'a str,
    name: &'a str,
    order_number: &'a str,
    grand_total: &'a str,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_approved.txt")]
struct OrderApprovedText<'a> {
    seller: &'a str,
    name: &'a str,
    order_number: &'a str,
    grand_total: &'a str,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/invoice_ready.html")]
struct InvoiceReadyHtml<'a> {
    seller: &'a str,
    name: &'a str,
    order_number: &'a str,
    invoice_number: &'a str,
    invoice_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/invoice_ready.txt")]
struct InvoiceReadyText<'a> {
    seller: &'a str,
    name: &'a str,
    order_number: &'a str,
    invoice_number: &'a str,
    invoice_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Development fallback: messages are written to the log.
    Log,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    transport: Transport,
    from_address: String,
    seller_name: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &ServerConfig) -> Result<Self, SmtpError> {
        Ok(Self {
            transport: build_transport(&config.email)?,
            from_address: config.email.from_address.clone(),
            seller_name: config.seller.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Whether messages are only logged.
    #[must_use]
    pub const fn is_log_only(&self) -> bool {
        matches!(self.transport, Transport::Log)
    }

    /// Tell a buyer their KYC was approved.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_kyc_approved(&self, to: &Email, name: &str) -> Result<(), EmailError> {
        let login_url = self.url("/login");
        let seller = self.seller_name.as_str();
        let html = KycApprovedHtml {
            seller,
            name,
            login_url: &login_url,
        }
        .render()?;
        let text = KycApprovedText {
            seller,
            name,
            login_url: &login_url,
        }
        .render()?;

        let subject = format!("Your KYC has been approved - {seller}");
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Tell a buyer their KYC was rejected, with the reason when one was given.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_kyc_rejected(
        &self,
        to: &Email,
        name: &str,
        reason: Option<&str>,
    ) -> Result<(), EmailError> {
        let seller = self.seller_name.as_str();
        let html = KycRejectedHtml {
            seller,
            name,
            reason,
        }
        .render()?;
        let text = KycRejectedText {
            seller,
            name,
            reason,
        }
        .render()?;

        let subject = format!("KYC Application Update - {seller}");
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Confirm an order approval.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_approved(
        &self,
        to: &Email,
        name: &str,
        order_number: &str,
        grand_total: Decimal,
    ) -> Result<(), EmailError> {
        let seller = self.seller_name.as_str();
        let grand_total = format_inr(grand_total);
        let orders_url = self.url("/api/orders");
        let html = OrderApprovedHtml {
            seller,
            name,
            order_number,
            grand_total: &grand_total,
            orders_url: &orders_url,
        }
        .render()?;
        let text = OrderApprovedText {
            seller,
            name,
            order_number,
            grand_total: &grand_total,
            orders_url: &orders_url,
        }
        .render()?;

        let subject = format!("Order Approved: {order_number} - {seller}");
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    /// Send the link to a new tax invoice.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_invoice_ready(
        &self,
        to: &Email,
        name: &str,
        order_number: &str,
        invoice_number: &str,
        invoice_id: InvoiceId,
    ) -> Result<(), EmailError> {
        let seller = self.seller_name.as_str();
        let invoice_url = self.url(&format!("/api/invoices/{invoice_id}"));
        let html = InvoiceReadyHtml {
            seller,
            name,
            order_number,
            invoice_number,
            invoice_url: &invoice_url,
        }
        .render()?;
        let text = InvoiceReadyText {
            seller,
            name,
            order_number,
            invoice_number,
            invoice_url: &invoice_url,
        }
        .render()?;

        let subject = format!("Tax Invoice: {invoice_number} - {seller}");
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &Email,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        match &self.transport {
            Transport::Smtp(mailer) => {
                mailer.send(email).await?;
                tracing::info!(to = %to, subject = %subject, "Email sent successfully");
            }
            Transport::Log => {
                tracing::info!(to = %to, subject = %subject, body = %text_body, "SMTP not configured, email logged");
            }
        }
        Ok(())
    }
}

fn build_transport(config: &EmailConfig) -> Result<Transport, SmtpError> {
    let Some(smtp) = &config.smtp else {
        return Ok(Transport::Log);
    };

    let credentials = Credentials::new(
        smtp.username.clone(),
        smtp.password.expose_secret().to_string(),
    );

    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        .port(smtp.port)
        .credentials(credentials)
        .build();

    Ok(Transport::Smtp(mailer))
}
