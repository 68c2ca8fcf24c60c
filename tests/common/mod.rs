#![allow(dead_code)]

use async_trait::async_trait;
use coursepay::application::checkout::CheckoutService;
use coursepay::application::enrollment::EnrollmentWriter;
use coursepay::application::notification::NotificationSender;
use coursepay::application::order::OrderPreparer;
use coursepay::application::signature::SignatureVerifier;
use coursepay::config::{Config, PaymentConfig, Secret};
use coursepay::domain::course::{Course, CourseId};
use coursepay::domain::money::Money;
use coursepay::domain::notification::Email;
use coursepay::domain::payment::{OrderDescriptor, OrderRequest};
use coursepay::domain::ports::{CourseStore, MailTransport, PaymentGateway, UserStore};
use coursepay::domain::user::{AccountType, UserId, UserProfile};
use coursepay::error::{CoursePayError, Result};
use coursepay::infrastructure::Stores;
use coursepay::infrastructure::in_memory::InMemoryCourseStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const PAYMENT_SECRET: &str = "test-key-secret";
pub const AUTH_SECRET: &str = "test-auth-secret";

pub fn config() -> Config {
    Config {
        payment: PaymentConfig::new(Secret::new(PAYMENT_SECRET), "INR"),
        auth_secret: Secret::new(AUTH_SECRET),
        token_ttl_secs: Config::DEFAULT_TOKEN_TTL_SECS,
        notification_queue: 16,
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub fn student() -> UserId {
    UserId::new("u1")
}

pub fn instructor() -> UserId {
    UserId::new("i1")
}

/// In-memory stores seeded with one student, one instructor and two
/// courses: `c1` (5.00) and `c2` (15.00).
pub async fn seeded_stores() -> Stores {
    seeded_catalog().await.0
}

/// Like `seeded_stores`, also handing back the concrete course store so a
/// test can pull a course out of the catalog.
pub async fn seeded_catalog() -> (Stores, InMemoryCourseStore) {
    let catalog = InMemoryCourseStore::new();
    let stores = Stores {
        courses: Arc::new(catalog.clone()),
        ..Stores::in_memory()
    };
    stores
        .users
        .store(UserProfile::new(
            student(),
            "student@example.com",
            "Asha",
            "Rao",
            AccountType::Student,
        ))
        .await
        .unwrap();
    stores
        .users
        .store(UserProfile::new(
            instructor(),
            "instructor@example.com",
            "Ivan",
            "Petrov",
            AccountType::Instructor,
        ))
        .await
        .unwrap();
    stores
        .courses
        .store(
            Course::new(CourseId::new("c1"), "Rust 101", Money::from_minor(500), instructor())
                .with_lessons(["l1", "l2"]),
        )
        .await
        .unwrap();
    stores
        .courses
        .store(Course::new(
            CourseId::new("c2"),
            "Async Rust",
            Money::from_minor(1500),
            instructor(),
        ))
        .await
        .unwrap();
    (stores, catalog)
}

/// Gateway that counts calls and hands out sequential order ids.
#[derive(Clone, Default)]
pub struct CountingGateway {
    pub calls: Arc<AtomicUsize>,
}

impl CountingGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for CountingGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderDescriptor> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(OrderDescriptor {
            id: format!("order_{n}"),
            amount: request.amount,
            currency: request.currency,
            receipt: request.receipt,
            status: "created".to_string(),
            created_at: 0,
        })
    }
}

#[derive(Clone, Default)]
pub struct RecordingMail {
    pub sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMail {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.subject.clone())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingMail {
    async fn send(&self, email: &Email) -> Result<String> {
        self.sent.lock().unwrap().push(email.clone());
        Ok("msg-1".to_string())
    }
}

pub struct FailingMail;

#[async_trait]
impl MailTransport for FailingMail {
    async fn send(&self, _email: &Email) -> Result<String> {
        Err(CoursePayError::NotificationError("smtp unavailable".to_string()))
    }
}

pub struct Harness {
    pub stores: Stores,
    pub catalog: InMemoryCourseStore,
    pub gateway: CountingGateway,
    pub mail: RecordingMail,
    pub checkout: CheckoutService,
    pub verifier: SignatureVerifier,
    pub worker: tokio::task::JoinHandle<usize>,
}

pub async fn harness() -> Harness {
    let config = config();
    let (stores, catalog) = seeded_catalog().await;
    let gateway = CountingGateway::default();
    let mail = RecordingMail::default();
    let (notifier, worker) = NotificationSender::spawn(Box::new(mail.clone()), 16);

    let checkout = CheckoutService::new(
        OrderPreparer::new(stores.courses.clone(), Arc::new(gateway.clone()), &config.payment),
        SignatureVerifier::new(&config.payment),
        EnrollmentWriter::new(
            stores.courses.clone(),
            stores.users.clone(),
            stores.progress.clone(),
        ),
        stores.users.clone(),
        notifier,
    );

    Harness {
        stores,
        catalog,
        gateway,
        mail,
        checkout,
        verifier: SignatureVerifier::new(&config.payment),
        worker,
    }
}

impl Harness {
    /// Drops the checkout service and waits for queued mail to be delivered.
    pub async fn drain(self) -> (Stores, RecordingMail, usize) {
        drop(self.checkout);
        let delivered = self.worker.await.unwrap();
        (self.stores, self.mail, delivered)
    }
}
