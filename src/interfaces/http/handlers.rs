use super::AppState;
use super::auth::AuthUser;
use super::response::ApiResponse;
use crate::application::enrollment::EnrollmentReport;
use crate::domain::course::CourseId;
use crate::domain::money::Money;
use crate::domain::payment::PaymentCallback;
use crate::domain::progress::LessonCompletion;
use crate::domain::user::AccountType;
use crate::error::CoursePayError;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

type HandlerResult = Result<Response, CoursePayError>;

fn parse<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, CoursePayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| CoursePayError::validation(rejection.body_text()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CaptureRequest {
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    #[serde(alias = "razorpay_order_id")]
    pub order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub signature: String,
    pub courses: Vec<CourseId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentEmailRequest {
    #[serde(alias = "orderId")]
    pub order_id: String,
    #[serde(alias = "paymentId")]
    pub payment_id: String,
    /// Amount paid, in minor units.
    pub amount: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressRequest {
    #[serde(alias = "courseId")]
    pub course_id: String,
    #[serde(alias = "subsectionId")]
    pub lesson_id: String,
}

#[derive(Debug, Serialize)]
pub struct FailedCourse {
    pub course: CourseId,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentSummary {
    pub enrolled: Vec<CourseId>,
    pub failed: Vec<FailedCourse>,
}

impl From<&EnrollmentReport> for EnrollmentSummary {
    fn from(report: &EnrollmentReport) -> Self {
        Self {
            enrolled: report.enrolled().cloned().collect(),
            failed: report
                .failures()
                .map(|(course, error)| FailedCourse {
                    course: course.clone(),
                    message: error.public_message(),
                })
                .collect(),
        }
    }
}

pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Server is running"))
}

pub async fn capture_payment(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CaptureRequest>, JsonRejection>,
) -> HandlerResult {
    user.require(AccountType::Student)?;
    let request = parse(payload)?;

    let order = state.checkout.capture(&user.id, &request.courses).await?;
    Ok((StatusCode::OK, Json(ApiResponse::ok("Order created", order))).into_response())
}

pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> HandlerResult {
    user.require(AccountType::Student)?;
    let request = parse(payload)?;

    if request.order_id.is_empty()
        || request.payment_id.is_empty()
        || request.signature.is_empty()
        || request.courses.is_empty()
    {
        return Err(CoursePayError::validation(
            "Payment verification failed: missing fields",
        ));
    }

    let callback = PaymentCallback::new(request.order_id, request.payment_id, request.signature);
    let report = state
        .checkout
        .verify(&user.id, &callback, &request.courses)
        .await?;

    let summary = EnrollmentSummary::from(&report);
    let Some((_, error)) = report.first_failure() else {
        return Ok((StatusCode::OK, Json(ApiResponse::ok("Payment verified", summary))).into_response());
    };

    let body = ApiResponse {
        success: false,
        message: format!(
            "Enrollment failed for {} of {} courses: {}",
            summary.failed.len(),
            request.courses.len(),
            error.public_message()
        ),
        data: Some(summary),
    };
    Ok((error.status_code(), Json(body)).into_response())
}

pub async fn send_payment_success_email(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<PaymentEmailRequest>, JsonRejection>,
) -> HandlerResult {
    user.require(AccountType::Student)?;
    let request = parse(payload)?;

    state
        .checkout
        .send_payment_success_email(
            &user.id,
            &request.order_id,
            &request.payment_id,
            Money::from_minor(request.amount),
        )
        .await?;
    Ok(Json(ApiResponse::message("Payment success email sent")).into_response())
}

pub async fn update_course_progress(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ProgressRequest>, JsonRejection>,
) -> HandlerResult {
    user.require(AccountType::Student)?;
    let request = parse(payload)?;
    if request.course_id.is_empty() {
        return Err(CoursePayError::validation("Course ID is required"));
    }

    let completion = state
        .progress
        .complete_lesson(&user.id, &CourseId::new(request.course_id), &request.lesson_id)
        .await?;

    let message = match completion {
        LessonCompletion::Created => "Course Progress Created Successfully",
        LessonCompletion::Updated => "Course Progress Updated Successfully",
        LessonCompletion::AlreadyCompleted => "Lesson already completed",
    };
    Ok(Json(ApiResponse::ok(message, completion)).into_response())
}

pub async fn enrolled_courses(State(state): State<AppState>, user: AuthUser) -> HandlerResult {
    let courses = state.profiles.enrolled_courses(&user.id).await?;
    Ok(Json(ApiResponse::ok("Enrolled courses", courses)).into_response())
}

pub async fn instructor_dashboard(State(state): State<AppState>, user: AuthUser) -> HandlerResult {
    user.require(AccountType::Instructor)?;
    let stats = state.profiles.instructor_dashboard(&user.id).await?;
    Ok(Json(ApiResponse::ok("Instructor dashboard", stats)).into_response())
}
