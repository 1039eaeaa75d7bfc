//! The three inbound request kinds and what differs between them.
//!
//! Each kind is a zero-sized marker implementing [`RequestKind`]; the
//! lifecycle service and the stores are written once against the trait.

use std::fmt;

use serde::Serialize;

use crate::{
    errors::{AppError, FieldErrors},
    structs::{
        ContactStatus, ContactSubmission, NewContactSubmission, NewQuoteRequest,
        NewSupportInquiry, QuoteRequest, QuoteStatus, SupportInquiry, SupportStatus,
    },
    utils::{self, non_empty, MAX_NAME_LEN, MAX_PHONE_LEN},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    Quote,
    Contact,
    Support,
}

impl InboundKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            InboundKind::Quote => "quote",
            InboundKind::Contact => "contact",
            InboundKind::Support => "support",
        }
    }

    /// Dashboard tab the admin console opens for this kind.
    pub const fn admin_tab(self) -> &'static str {
        match self {
            InboundKind::Quote => "quotes",
            InboundKind::Contact => "contacts",
            InboundKind::Support => "support",
        }
    }
}

impl fmt::Display for InboundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait RequestKind: Send + Sync + 'static {
    type Record: Serialize + Clone + fmt::Debug + Send + Sync + Unpin;
    type Draft: fmt::Debug + Send + Sync;
    type Status: Copy + PartialEq + fmt::Display + fmt::Debug + Send + Sync;

    const KIND: InboundKind;

    /// Status every new record starts in.
    fn initial_status() -> Self::Status;

    /// Trim required strings, drop blank optionals.
    fn normalize(draft: Self::Draft) -> Self::Draft;

    fn validate(draft: &Self::Draft) -> Result<(), AppError>;

    fn id(record: &Self::Record) -> i64;

    fn is_read(record: &Self::Record) -> bool;

    fn status(record: &Self::Record) -> Self::Status;

    fn product_id(_record: &Self::Record) -> Option<i64> {
        None
    }

    fn requester(record: &Self::Record) -> &str;

    fn notification_subject(record: &Self::Record) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct Quotes;

#[derive(Debug, Clone, Copy)]
pub struct Contacts;

#[derive(Debug, Clone, Copy)]
pub struct SupportTickets;

impl RequestKind for Quotes {
    type Record = QuoteRequest;
    type Draft = NewQuoteRequest;
    type Status = QuoteStatus;

    const KIND: InboundKind = InboundKind::Quote;

    fn initial_status() -> QuoteStatus {
        QuoteStatus::Pending
    }

    fn normalize(draft: NewQuoteRequest) -> NewQuoteRequest {
        NewQuoteRequest {
            customer_name: draft.customer_name.trim().to_string(),
            customer_email: draft.customer_email.trim().to_string(),
            customer_phone: draft.customer_phone.trim().to_string(),
            product_id: draft.product_id,
            company_name: non_empty(draft.company_name),
            quantity: draft.quantity,
            message: non_empty(draft.message),
        }
    }

    fn validate(draft: &NewQuoteRequest) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        utils::require(&mut errors, "customerName", &draft.customer_name, MAX_NAME_LEN);
        utils::require_email(&mut errors, "customerEmail", &draft.customer_email);
        utils::require(&mut errors, "customerPhone", &draft.customer_phone, MAX_PHONE_LEN);
        utils::limit(&mut errors, "companyName", draft.company_name.as_deref(), MAX_NAME_LEN);
        if matches!(draft.quantity, Some(q) if q < 1) {
            errors.push("quantity", "must be at least 1");
        }
        errors.into_result()
    }

    fn id(record: &QuoteRequest) -> i64 {
        record.id
    }

    fn is_read(record: &QuoteRequest) -> bool {
        record.is_read
    }

    fn status(record: &QuoteRequest) -> QuoteStatus {
        record.status
    }

    fn product_id(record: &QuoteRequest) -> Option<i64> {
        record.product_id
    }

    fn requester(record: &QuoteRequest) -> &str {
        &record.customer_name
    }

    fn notification_subject(record: &QuoteRequest) -> String {
        format!("New Quote Request from {}", record.customer_name)
    }
}

impl RequestKind for Contacts {
    type Record = ContactSubmission;
    type Draft = NewContactSubmission;
    type Status = ContactStatus;

    const KIND: InboundKind = InboundKind::Contact;

    fn initial_status() -> ContactStatus {
        ContactStatus::New
    }

    fn normalize(draft: NewContactSubmission) -> NewContactSubmission {
        NewContactSubmission {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: non_empty(draft.phone),
            subject: draft.subject.trim().to_string(),
            message: draft.message,
        }
    }

    fn validate(draft: &NewContactSubmission) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        utils::require(&mut errors, "name", &draft.name, MAX_NAME_LEN);
        utils::require_email(&mut errors, "email", &draft.email);
        utils::limit(&mut errors, "phone", draft.phone.as_deref(), MAX_PHONE_LEN);
        utils::require(&mut errors, "subject", &draft.subject, MAX_NAME_LEN);
        if draft.message.trim().is_empty() {
            errors.push("message", "is required");
        }
        errors.into_result()
    }

    fn id(record: &ContactSubmission) -> i64 {
        record.id
    }

    fn is_read(record: &ContactSubmission) -> bool {
        record.is_read
    }

    fn status(record: &ContactSubmission) -> ContactStatus {
        record.status
    }

    fn requester(record: &ContactSubmission) -> &str {
        &record.name
    }

    fn notification_subject(record: &ContactSubmission) -> String {
        format!("New Contact Submission: {}", record.subject)
    }
}

impl RequestKind for SupportTickets {
    type Record = SupportInquiry;
    type Draft = NewSupportInquiry;
    type Status = SupportStatus;

    const KIND: InboundKind = InboundKind::Support;

    fn initial_status() -> SupportStatus {
        SupportStatus::Open
    }

    fn normalize(draft: NewSupportInquiry) -> NewSupportInquiry {
        NewSupportInquiry {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: non_empty(draft.phone),
            subject: draft.subject.trim().to_string(),
            message: draft.message,
            priority: draft.priority,
        }
    }

    fn validate(draft: &NewSupportInquiry) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        utils::require(&mut errors, "name", &draft.name, MAX_NAME_LEN);
        utils::require_email(&mut errors, "email", &draft.email);
        utils::limit(&mut errors, "phone", draft.phone.as_deref(), MAX_PHONE_LEN);
        utils::require(&mut errors, "subject", &draft.subject, MAX_NAME_LEN);
        if draft.message.trim().is_empty() {
            errors.push("message", "is required");
        }
        errors.into_result()
    }

    fn id(record: &SupportInquiry) -> i64 {
        record.id
    }

    fn is_read(record: &SupportInquiry) -> bool {
        record.is_read
    }

    fn status(record: &SupportInquiry) -> SupportStatus {
        record.status
    }

    fn requester(record: &SupportInquiry) -> &str {
        &record.name
    }

    fn notification_subject(record: &SupportInquiry) -> String {
        format!(
            "New Support Request [{}]: {}",
            record.priority.as_str().to_uppercase(),
            record.subject
        )
    }
}
