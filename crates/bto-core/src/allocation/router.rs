use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::application::ReviewOutcome;
use super::domain::{ApplicationId, EnquiryId, FlatCategory, ProjectId, UserId};
use super::errors::{CommandError, ValidationError};
use super::project::ProjectDraft;
use super::service::AllocationEngine;
use super::store::SnapshotSink;

/// Engine handle shared by every handler. Commands need exclusive access,
/// so the whole engine sits behind one mutex; no handler holds the guard
/// across an await point.
pub type SharedEngine<P> = Arc<Mutex<AllocationEngine<P>>>;

/// Router builder exposing the allocation queries and commands over HTTP.
pub fn allocation_router<P>(engine: SharedEngine<P>) -> Router
where
    P: SnapshotSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/users/:user_id/projects",
            get(list_projects_handler::<P>),
        )
        .route(
            "/api/v1/users/:user_id/application",
            get(active_application_handler::<P>),
        )
        .route("/api/v1/projects", post(create_project_handler::<P>))
        .route(
            "/api/v1/projects/:project_id/visibility",
            post(toggle_visibility_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/units",
            get(remaining_units_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/applications",
            get(project_applications_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/enquiries",
            get(project_enquiries_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/officers",
            post(register_officer_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/officers/approve",
            post(approve_officer_handler::<P>),
        )
        .route(
            "/api/v1/projects/:project_id/officers/reject",
            post(reject_officer_handler::<P>),
        )
        .route("/api/v1/applications", post(apply_handler::<P>))
        .route(
            "/api/v1/applications/:application_id/review",
            post(review_handler::<P>),
        )
        .route(
            "/api/v1/applications/:application_id/book",
            post(book_handler::<P>),
        )
        .route(
            "/api/v1/applications/:application_id/withdrawal",
            post(request_withdrawal_handler::<P>),
        )
        .route(
            "/api/v1/applications/:application_id/withdrawal/approve",
            post(approve_withdrawal_handler::<P>),
        )
        .route("/api/v1/enquiries", post(create_enquiry_handler::<P>))
        .route(
            "/api/v1/enquiries/:enquiry_id",
            post(edit_enquiry_handler::<P>).delete(delete_enquiry_handler::<P>),
        )
        .route(
            "/api/v1/enquiries/:enquiry_id/reply",
            post(reply_enquiry_handler::<P>),
        )
        .with_state(engine)
}

/// Unknown entities map to 404, other validation failures to 422, and
/// conflict or lifecycle failures to 409.
fn error_response(err: CommandError) -> Response {
    let status = match &err {
        CommandError::Validation(
            ValidationError::UnknownUser(_)
            | ValidationError::UnknownProject(_)
            | ValidationError::UnknownApplication(_)
            | ValidationError::UnknownEnquiry(_),
        ) => StatusCode::NOT_FOUND,
        CommandError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CommandError::Conflict(_) | CommandError::State(_) => StatusCode::CONFLICT,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, CommandError>) -> Response {
    match result {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Deserialize)]
pub(crate) struct ApplyRequest {
    pub applicant: UserId,
    pub project: ProjectId,
    pub category: FlatCategory,
}

#[derive(Deserialize)]
pub(crate) struct ReviewRequest {
    pub officer: UserId,
    pub outcome: ReviewOutcome,
}

#[derive(Deserialize)]
pub(crate) struct BookRequest {
    pub officer: UserId,
    pub category: FlatCategory,
}

#[derive(Deserialize)]
pub(crate) struct WithdrawalRequest {
    pub applicant: UserId,
}

#[derive(Deserialize)]
pub(crate) struct ApproveWithdrawalRequest {
    pub actor: UserId,
}

#[derive(Deserialize)]
pub(crate) struct RegisterOfficerRequest {
    pub officer: UserId,
}

#[derive(Deserialize)]
pub(crate) struct OfficerDecisionRequest {
    pub manager: UserId,
    pub officer: UserId,
}

#[derive(Deserialize)]
pub(crate) struct CreateProjectRequest {
    pub manager: UserId,
    #[serde(flatten)]
    pub draft: ProjectDraft,
}

#[derive(Deserialize)]
pub(crate) struct ToggleVisibilityRequest {
    pub manager: UserId,
}

#[derive(Deserialize)]
pub(crate) struct CreateEnquiryRequest {
    pub author: UserId,
    pub project: ProjectId,
    pub content: String,
}

#[derive(Deserialize)]
pub(crate) struct EditEnquiryRequest {
    pub editor: UserId,
    pub content: String,
}

#[derive(Deserialize)]
pub(crate) struct DeleteEnquiryRequest {
    pub user: UserId,
}

#[derive(Deserialize)]
pub(crate) struct ReplyEnquiryRequest {
    pub actor: UserId,
    pub content: String,
}

pub(crate) async fn list_projects_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let viewer = UserId(user_id);
    let engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.visible_projects(&viewer))
}

pub(crate) async fn active_application_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(user_id): Path<String>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let user = UserId(user_id);
    let engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.active_application(&user))
}

pub(crate) async fn remaining_units_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.remaining_units(&project))
}

pub(crate) async fn project_applications_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.project_applications(&project))
}

pub(crate) async fn project_enquiries_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.project_enquiries(&project))
}

pub(crate) async fn apply_handler<P>(
    State(engine): State<SharedEngine<P>>,
    axum::Json(request): axum::Json<ApplyRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::CREATED,
        engine.apply(&request.applicant, &request.project, request.category),
    )
}

pub(crate) async fn review_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let application = ApplicationId(application_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.review_application(&request.officer, &application, request.outcome),
    )
}

pub(crate) async fn book_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<BookRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let application = ApplicationId(application_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.book(&request.officer, &application, request.category),
    )
}

pub(crate) async fn request_withdrawal_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<WithdrawalRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let application = ApplicationId(application_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.request_withdrawal(&request.applicant, &application),
    )
}

pub(crate) async fn approve_withdrawal_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ApproveWithdrawalRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let application = ApplicationId(application_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.approve_withdrawal(&request.actor, &application),
    )
}

pub(crate) async fn register_officer_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<RegisterOfficerRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.register_officer(&request.officer, &project),
    )
}

pub(crate) async fn approve_officer_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<OfficerDecisionRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.approve_officer(&request.manager, &project, &request.officer),
    )
}

pub(crate) async fn reject_officer_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<OfficerDecisionRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.reject_officer(&request.manager, &project, &request.officer),
    )
}

pub(crate) async fn create_project_handler<P>(
    State(engine): State<SharedEngine<P>>,
    axum::Json(request): axum::Json<CreateProjectRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::CREATED,
        engine.create_project(&request.manager, request.draft),
    )
}

pub(crate) async fn toggle_visibility_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(project_id): Path<String>,
    axum::Json(request): axum::Json<ToggleVisibilityRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let project = ProjectId(project_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.toggle_visibility(&request.manager, &project),
    )
}

pub(crate) async fn create_enquiry_handler<P>(
    State(engine): State<SharedEngine<P>>,
    axum::Json(request): axum::Json<CreateEnquiryRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::CREATED,
        engine.create_enquiry(&request.author, &request.project, request.content),
    )
}

pub(crate) async fn edit_enquiry_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(enquiry_id): Path<String>,
    axum::Json(request): axum::Json<EditEnquiryRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let enquiry = EnquiryId(enquiry_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.edit_enquiry(&request.editor, &enquiry, request.content),
    )
}

pub(crate) async fn delete_enquiry_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(enquiry_id): Path<String>,
    axum::Json(request): axum::Json<DeleteEnquiryRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let enquiry = EnquiryId(enquiry_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(StatusCode::OK, engine.delete_enquiry(&request.user, &enquiry))
}

pub(crate) async fn reply_enquiry_handler<P>(
    State(engine): State<SharedEngine<P>>,
    Path(enquiry_id): Path<String>,
    axum::Json(request): axum::Json<ReplyEnquiryRequest>,
) -> Response
where
    P: SnapshotSink + 'static,
{
    let enquiry = EnquiryId(enquiry_id);
    let mut engine = engine.lock().expect("allocation engine mutex poisoned");
    respond(
        StatusCode::OK,
        engine.reply_enquiry(&request.actor, &enquiry, request.content),
    )
}
