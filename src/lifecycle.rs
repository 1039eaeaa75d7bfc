//! Lifecycle of inbound customer requests: submission, triage and read state.
//!
//! Status is deliberately permissive: any value of a kind's status enum can be
//! set from any other. `is_read` only ever moves from false to true.

use std::sync::Arc;

use crate::{
    errors::AppError,
    kinds::{RequestKind, SupportTickets},
    notify::{self, Notifier},
    store::{CatalogStore, PriorityStore, RequestStore},
    structs::Priority,
};

pub struct RequestLifecycle<S: ?Sized> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    recipient: String,
    degrade_reads: bool,
}

impl<S: CatalogStore + ?Sized> RequestLifecycle<S> {
    /// `degrade_reads` turns an unreachable store into empty lists instead of errors.
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn Notifier>,
        recipient: impl Into<String>,
        degrade_reads: bool,
    ) -> Self {
        Self {
            store,
            notifier,
            recipient: recipient.into(),
            degrade_reads,
        }
    }

    /// Validate and store a public submission, then notify the owner.
    ///
    /// Success depends only on the insert; notification problems are logged.
    pub async fn create<K: RequestKind>(&self, draft: K::Draft) -> Result<K::Record, AppError>
    where
        S: RequestStore<K>,
    {
        let draft = K::normalize(draft);
        K::validate(&draft)?;

        let record = RequestStore::<K>::insert(&*self.store, &draft).await?;
        log::info!(
            "{} request #{} created by {}",
            K::KIND,
            K::id(&record),
            K::requester(&record)
        );

        self.dispatch::<K>(&record).await;
        Ok(record)
    }

    async fn dispatch<K: RequestKind>(&self, record: &K::Record) {
        let product_name = match K::product_id(record) {
            Some(product_id) => match self.store.find_product(product_id).await {
                Ok(product) => product.map(|p| p.name),
                Err(e) => {
                    log::warn!("Could not resolve product {}: {}", product_id, e);
                    None
                }
            },
            None => None,
        };

        let notification =
            match notify::render::<K>(record, product_name.as_deref(), &self.recipient) {
                Ok(notification) => notification,
                Err(e) => {
                    log::error!("Failed to render {} notification: {}", K::KIND, e);
                    return;
                }
            };

        if let Err(e) = self.notifier.send(K::KIND, &notification).await {
            log::error!(
                "Failed to send {} notification for #{}: {}",
                K::KIND,
                K::id(record),
                e
            );
        }
    }

    /// All requests of a kind, newest first.
    pub async fn list<K: RequestKind>(&self) -> Result<Vec<K::Record>, AppError>
    where
        S: RequestStore<K>,
    {
        match RequestStore::<K>::list_all(&*self.store).await {
            Ok(records) => Ok(records),
            Err(AppError::Unavailable) if self.degrade_reads => {
                log::warn!("Store unavailable, returning no {} requests", K::KIND);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update_status<K: RequestKind>(
        &self,
        id: i64,
        status: K::Status,
    ) -> Result<(), AppError>
    where
        S: RequestStore<K>,
    {
        RequestStore::<K>::update_status(&*self.store, id, status).await?;
        log::info!("{} request #{} status set to {}", K::KIND, id, status);
        Ok(())
    }

    /// Idempotent; never clears the flag.
    pub async fn mark_as_read<K: RequestKind>(&self, id: i64) -> Result<(), AppError>
    where
        S: RequestStore<K>,
    {
        RequestStore::<K>::set_read(&*self.store, id).await
    }

    /// Open a request in the admin console, marking it read the first time.
    pub async fn view<K: RequestKind>(&self, id: i64) -> Result<K::Record, AppError>
    where
        S: RequestStore<K>,
    {
        let record = RequestStore::<K>::find(&*self.store, id)
            .await?
            .ok_or(AppError::NotFound)?;
        if K::is_read(&record) {
            return Ok(record);
        }

        RequestStore::<K>::set_read(&*self.store, id).await?;
        RequestStore::<K>::find(&*self.store, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

impl<S: CatalogStore + PriorityStore + ?Sized> RequestLifecycle<S> {
    /// Priority moves independently of status.
    pub async fn update_priority(&self, id: i64, priority: Priority) -> Result<(), AppError> {
        self.store.update_priority(id, priority).await?;
        log::info!(
            "{} request #{} priority set to {}",
            SupportTickets::KIND,
            id,
            priority
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        db::{test_store, SqliteStore},
        kinds::{Contacts, InboundKind, Quotes},
        notify::testing::RecordingNotifier,
        structs::{
            ContactStatus, NewContactSubmission, NewQuoteRequest, NewSupportInquiry,
            ProductInput, QuoteStatus, SupportStatus,
        },
    };

    fn lifecycle(
        store: SqliteStore,
        notifier: Arc<RecordingNotifier>,
    ) -> RequestLifecycle<SqliteStore> {
        RequestLifecycle::new(Arc::new(store), notifier, "owner@techbucket.example", true)
    }

    fn contact(name: &str) -> NewContactSubmission {
        NewContactSubmission {
            name: name.into(),
            email: "someone@example.com".into(),
            phone: None,
            subject: "Networking".into(),
            message: "Please call me back".into(),
        }
    }

    fn support(subject: &str) -> NewSupportInquiry {
        NewSupportInquiry {
            name: "Ram".into(),
            email: "ram@example.com".into(),
            phone: Some("9800000000".into()),
            subject: subject.into(),
            message: "Printer jammed".into(),
            priority: None,
        }
    }

    fn acme_quote() -> NewQuoteRequest {
        NewQuoteRequest {
            customer_name: "Acme".into(),
            customer_email: "a@acme.com".into(),
            customer_phone: "555".into(),
            product_id: Some(7),
            company_name: None,
            quantity: None,
            message: None,
        }
    }

    async fn seed_products(store: &SqliteStore, count: i64) {
        for n in 1..=count {
            store
                .insert_product(&ProductInput {
                    name: format!("Product {}", n),
                    slug: format!("product-{}", n),
                    category_id: 1,
                    brand_id: 1,
                    description: None,
                    specifications: None,
                    price: None,
                    image: None,
                    is_featured: None,
                })
                .await
                .unwrap();
        }
    }

    #[actix_web::test]
    async fn quote_is_stored_pending_and_notification_names_product() {
        let store = test_store().await;
        seed_products(&store, 7).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let service = lifecycle(store, notifier.clone());

        let quote = service.create::<Quotes>(acme_quote()).await.unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);
        assert!(!quote.is_read);
        assert_eq!(quote.product_id, Some(7));

        let stored = service.list::<Quotes>().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, QuoteStatus::Pending);
        assert!(!stored[0].is_read);
        assert_eq!(stored[0].product_id, Some(7));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, InboundKind::Quote);
        assert!(sent[0].1.body.contains("Product: Product 7"));
        assert_eq!(sent[0].1.recipient, "owner@techbucket.example");
    }

    #[actix_web::test]
    async fn failing_notifier_does_not_fail_create() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let service = lifecycle(test_store().await, notifier.clone());

        let created = service
            .create::<SupportTickets>(support("Printer"))
            .await
            .unwrap();
        assert_eq!(created.status, SupportStatus::Open);
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(service.list::<SupportTickets>().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn invalid_submission_stores_and_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = lifecycle(test_store().await, notifier.clone());

        let mut draft = contact("Sita");
        draft.email = "not-an-email".into();
        let err = service.create::<Contacts>(draft).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(notifier.sent().is_empty());
        assert!(service.list::<Contacts>().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn mark_as_read_is_idempotent() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        let created = service.create::<Contacts>(contact("Sita")).await.unwrap();

        service.mark_as_read::<Contacts>(created.id).await.unwrap();
        let first = service.list::<Contacts>().await.unwrap();
        assert!(first[0].is_read);

        service.mark_as_read::<Contacts>(created.id).await.unwrap();
        let second = service.list::<Contacts>().await.unwrap();
        assert!(second[0].is_read);
    }

    #[actix_web::test]
    async fn archiving_a_new_contact_keeps_read_flag() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        for name in ["A", "B", "C"] {
            service.create::<Contacts>(contact(name)).await.unwrap();
        }

        service
            .update_status::<Contacts>(3, ContactStatus::Archived)
            .await
            .unwrap();

        let third = service
            .list::<Contacts>()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.id == 3)
            .unwrap();
        assert_eq!(third.status, ContactStatus::Archived);
        assert!(!third.is_read);
    }

    #[actix_web::test]
    async fn any_status_can_follow_any_other() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        let quote = service.create::<Quotes>(acme_quote()).await.unwrap();
        for status in [
            QuoteStatus::Archived,
            QuoteStatus::Pending,
            QuoteStatus::Responded,
            QuoteStatus::Reviewed,
        ] {
            service
                .update_status::<Quotes>(quote.id, status)
                .await
                .unwrap();
            let current = service.view::<Quotes>(quote.id).await.unwrap();
            assert_eq!(current.status, status);
        }
    }

    #[actix_web::test]
    async fn support_list_is_newest_first() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        for subject in ["first", "second", "third"] {
            service
                .create::<SupportTickets>(support(subject))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let listed = service.list::<SupportTickets>().await.unwrap();
        let subjects: Vec<&str> = listed.iter().map(|s| s.subject.as_str()).collect();
        assert_eq!(subjects, vec!["third", "second", "first"]);
        assert!(listed[0].created_at > listed[1].created_at);
        assert!(listed[1].created_at > listed[2].created_at);
    }

    #[actix_web::test]
    async fn view_marks_read_once() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        let created = service.create::<Contacts>(contact("Sita")).await.unwrap();
        assert!(!created.is_read);

        let viewed = service.view::<Contacts>(created.id).await.unwrap();
        assert!(viewed.is_read);
        let again = service.view::<Contacts>(created.id).await.unwrap();
        assert!(again.is_read);
        assert_eq!(again.updated_at, viewed.updated_at);

        let err = service.view::<Contacts>(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[actix_web::test]
    async fn priority_changes_without_touching_status() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        let created = service
            .create::<SupportTickets>(support("Server"))
            .await
            .unwrap();
        service
            .update_status::<SupportTickets>(created.id, SupportStatus::InProgress)
            .await
            .unwrap();
        service
            .update_priority(created.id, Priority::High)
            .await
            .unwrap();

        let current = service.view::<SupportTickets>(created.id).await.unwrap();
        assert_eq!(current.priority, Priority::High);
        assert_eq!(current.status, SupportStatus::InProgress);
    }

    #[actix_web::test]
    async fn missing_ids_are_not_found() {
        let service = lifecycle(test_store().await, Arc::new(RecordingNotifier::default()));
        assert!(matches!(
            service
                .update_status::<Quotes>(42, QuoteStatus::Reviewed)
                .await
                .unwrap_err(),
            AppError::NotFound
        ));
        assert!(matches!(
            service.mark_as_read::<Quotes>(42).await.unwrap_err(),
            AppError::NotFound
        ));
    }

    #[actix_web::test]
    async fn unconfigured_store_degrades_reads_and_fails_writes() {
        let notifier = Arc::new(RecordingNotifier::default());
        let degrading = RequestLifecycle::new(
            Arc::new(SqliteStore::unconfigured()),
            notifier.clone(),
            "owner@techbucket.example",
            true,
        );
        assert!(degrading.list::<Quotes>().await.unwrap().is_empty());
        assert!(matches!(
            degrading.create::<Quotes>(acme_quote()).await.unwrap_err(),
            AppError::Unavailable
        ));
        assert!(matches!(
            degrading.mark_as_read::<Quotes>(1).await.unwrap_err(),
            AppError::Unavailable
        ));
        assert!(notifier.sent().is_empty());

        let strict = RequestLifecycle::new(
            Arc::new(SqliteStore::unconfigured()),
            notifier,
            "owner@techbucket.example",
            false,
        );
        assert!(matches!(
            strict.list::<Contacts>().await.unwrap_err(),
            AppError::Unavailable
        ));
    }
}
