//! HTTP surface of the service.
//!
//! ```text
//! GET  /                                     health check
//! POST /api/v1/payment/capture               open a gateway order      (student)
//! POST /api/v1/payment/verify                verify and enroll         (student)
//! POST /api/v1/payment/success-email         queue a receipt email     (student)
//! POST /api/v1/course/progress               mark a lesson completed   (student)
//! GET  /api/v1/profile/enrolled-courses      courses with progress     (any role)
//! GET  /api/v1/profile/instructor-dashboard  revenue per course        (instructor)
//! ```

pub mod auth;
pub mod handlers;
pub mod response;

use crate::application::checkout::CheckoutService;
use crate::application::enrollment::EnrollmentWriter;
use crate::application::notification::NotificationSender;
use crate::application::order::OrderPreparer;
use crate::application::profile::ProfileService;
use crate::application::progress::ProgressTracker;
use crate::application::signature::SignatureVerifier;
use crate::config::Config;
use crate::domain::ports::{MailTransportBox, SharedPaymentGateway};
use crate::infrastructure::Stores;
use auth::TokenAuthority;
use axum::{
    Router,
    extract::FromRef,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub progress: Arc<ProgressTracker>,
    pub profiles: Arc<ProfileService>,
    pub tokens: Arc<TokenAuthority>,
}

impl FromRef<AppState> for Arc<TokenAuthority> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}

impl AppState {
    /// Wires every service from its collaborators and starts the
    /// notification worker, whose handle is returned alongside the state.
    pub fn build(
        config: &Config,
        stores: Stores,
        gateway: SharedPaymentGateway,
        transport: MailTransportBox,
    ) -> (Self, JoinHandle<usize>) {
        let (notifier, worker) = NotificationSender::spawn(transport, config.notification_queue);

        let checkout = CheckoutService::new(
            OrderPreparer::new(stores.courses.clone(), gateway, &config.payment),
            SignatureVerifier::new(&config.payment),
            EnrollmentWriter::new(
                stores.courses.clone(),
                stores.users.clone(),
                stores.progress.clone(),
            ),
            stores.users.clone(),
            notifier,
        );

        let state = Self {
            checkout: Arc::new(checkout),
            progress: Arc::new(ProgressTracker::new(
                stores.courses.clone(),
                stores.users.clone(),
                stores.progress.clone(),
            )),
            profiles: Arc::new(ProfileService::new(
                stores.courses,
                stores.users,
                stores.progress,
            )),
            tokens: Arc::new(
                TokenAuthority::new(config.auth_secret.clone()).with_ttl(config.token_ttl_secs),
            ),
        };
        (state, worker)
    }
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/payment/capture", post(handlers::capture_payment))
        .route("/payment/verify", post(handlers::verify_payment))
        .route(
            "/payment/success-email",
            post(handlers::send_payment_success_email),
        )
        .route("/course/progress", post(handlers::update_course_progress))
        .route("/profile/enrolled-courses", get(handlers::enrolled_courses))
        .route(
            "/profile/instructor-dashboard",
            get(handlers::instructor_dashboard),
        );

    Router::new()
        .route("/", get(handlers::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
