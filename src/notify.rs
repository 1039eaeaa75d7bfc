//! Admin notifications for new inbound requests.
//!
//! Rendering happens here; delivery is behind [`Notifier`] so the transport
//! stays outside the core.

use async_trait::async_trait;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::kinds::{InboundKind, RequestKind};

lazy_static! {
    pub static ref NOTIFICATION_TEMPLATES: Tera = {
        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_templates(vec![
            (
                "quote.txt",
                include_str!("../templates/notifications/quote.txt"),
            ),
            (
                "contact.txt",
                include_str!("../templates/notifications/contact.txt"),
            ),
            (
                "support.txt",
                include_str!("../templates/notifications/support.txt"),
            ),
        ]) {
            log::error!("Parsing error(s): {}", e);
            ::std::process::exit(1);
        }
        tera
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, kind: InboundKind, notification: &Notification)
        -> Result<(), NotifyError>;
}

fn template_name(kind: InboundKind) -> &'static str {
    match kind {
        InboundKind::Quote => "quote.txt",
        InboundKind::Contact => "contact.txt",
        InboundKind::Support => "support.txt",
    }
}

/// Build the subject and plain-text body for a freshly stored request.
pub fn render<K: RequestKind>(
    record: &K::Record,
    product_name: Option<&str>,
    recipient: &str,
) -> Result<Notification, NotifyError> {
    let mut context = Context::new();
    context.insert("record", record);
    context.insert("product_name", &product_name);
    context.insert(
        "admin_path",
        &format!("/admin/dashboard?tab={}", K::KIND.admin_tab()),
    );
    let body = NOTIFICATION_TEMPLATES.render(template_name(K::KIND), &context)?;

    Ok(Notification {
        recipient: recipient.to_string(),
        subject: K::notification_subject(record),
        body,
    })
}

/// Writes notifications to the application log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        kind: InboundKind,
        notification: &Notification,
    ) -> Result<(), NotifyError> {
        log::info!(
            "Notification ({}) to {}: {}\n{}",
            kind,
            notification.recipient,
            notification.subject,
            notification.body
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        kinds::{Quotes, SupportTickets},
        structs::{Priority, QuoteRequest, QuoteStatus, SupportInquiry, SupportStatus},
    };

    fn quote() -> QuoteRequest {
        let now = Utc::now();
        QuoteRequest {
            id: 12,
            product_id: Some(7),
            customer_name: "Acme".into(),
            customer_email: "a@acme.com".into(),
            customer_phone: "555".into(),
            company_name: Some("Acme Pvt Ltd".into()),
            quantity: Some(3),
            message: None,
            status: QuoteStatus::Pending,
            is_read: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn quote_body_mentions_product_and_defaults_message() {
        let n = render::<Quotes>(&quote(), Some("Latitude 5440"), "owner@example.com").unwrap();
        assert_eq!(n.subject, "New Quote Request from Acme");
        assert_eq!(n.recipient, "owner@example.com");
        assert!(n.body.contains("Product: Latitude 5440"));
        assert!(n.body.contains("Company: Acme Pvt Ltd"));
        assert!(n.body.contains("Quantity: 3"));
        assert!(n.body.contains("No additional message"));
        assert!(n.body.contains("Quote ID: #12"));
        assert!(n.body.contains("/admin/dashboard?tab=quotes"));
    }

    #[test]
    fn quote_without_resolved_product_falls_back_to_id() {
        let n = render::<Quotes>(&quote(), None, "owner@example.com").unwrap();
        assert!(n.body.contains("Product ID: 7"));
    }

    #[test]
    fn support_subject_carries_priority() {
        let now = Utc::now();
        let inquiry = SupportInquiry {
            id: 4,
            name: "Ram".into(),
            email: "ram@example.com".into(),
            phone: None,
            subject: "Server down".into(),
            message: "Nothing boots".into(),
            priority: Priority::High,
            status: SupportStatus::Open,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        let n = render::<SupportTickets>(&inquiry, None, "owner@example.com").unwrap();
        assert_eq!(n.subject, "New Support Request [HIGH]: Server down");
        assert!(n.body.contains("Priority: HIGH"));
        assert!(!n.body.contains("Phone:"));
    }
}
