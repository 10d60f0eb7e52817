use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use super::domain::{ApplicationKey, FlatType, Nric, ProjectName, RegistrationKey};
use super::error::AllocationError;
use super::persistence::AllocationStore;
use super::projects::{ProjectDraft, ProjectFilter};
use super::service::{AllocationService, AllocationServiceError};

type SharedService<S> = State<Arc<AllocationService<S>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub manager: Nric,
    #[serde(flatten)]
    pub draft: ProjectDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub applicant: Nric,
    pub project: ProjectName,
    #[serde(default)]
    pub on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatTypeRequest {
    pub flat_type: FlatType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub officer: Nric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub applicant: Nric,
    #[serde(default)]
    pub on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub officer: Nric,
    pub project: ProjectName,
    #[serde(default)]
    pub on: Option<NaiveDate>,
}

/// Router builder exposing the allocation workflows over JSON.
pub fn allocation_router<S>(service: Arc<AllocationService<S>>) -> Router
where
    S: AllocationStore + 'static,
{
    Router::new()
        .route("/api/v1/allocation/projects", post(create_project_handler::<S>))
        .route(
            "/api/v1/allocation/projects/:project",
            get(project_handler::<S>).delete(delete_project_handler::<S>),
        )
        .route(
            "/api/v1/allocation/projects/:project/visibility",
            post(visibility_handler::<S>),
        )
        .route(
            "/api/v1/allocation/projects/:project/inventory",
            get(inventory_handler::<S>),
        )
        .route(
            "/api/v1/allocation/projects/:project/applications",
            get(pending_applications_handler::<S>),
        )
        .route(
            "/api/v1/allocation/projects/:project/registrations",
            get(pending_registrations_handler::<S>),
        )
        .route(
            "/api/v1/allocation/applicants/:applicant/projects",
            get(visible_projects_handler::<S>),
        )
        .route("/api/v1/allocation/applications", post(submit_handler::<S>))
        .route(
            "/api/v1/allocation/applications/:applicant/:project",
            get(application_handler::<S>),
        )
        .route(
            "/api/v1/allocation/applications/:applicant/:project/approve",
            post(approve_application_handler::<S>),
        )
        .route(
            "/api/v1/allocation/applications/:applicant/:project/reject",
            post(reject_application_handler::<S>),
        )
        .route(
            "/api/v1/allocation/applications/:applicant/:project/flat-type",
            post(select_flat_type_handler::<S>),
        )
        .route(
            "/api/v1/allocation/applications/:applicant/:project/booking",
            post(booking_handler::<S>),
        )
        .route(
            "/api/v1/allocation/withdrawals",
            get(pending_withdrawals_handler::<S>).post(request_withdrawal_handler::<S>),
        )
        .route(
            "/api/v1/allocation/withdrawals/:applicant/:project/approve",
            post(approve_withdrawal_handler::<S>),
        )
        .route(
            "/api/v1/allocation/withdrawals/:applicant/:project/reject",
            post(reject_withdrawal_handler::<S>),
        )
        .route(
            "/api/v1/allocation/registrations",
            post(register_officer_handler::<S>),
        )
        .route(
            "/api/v1/allocation/registrations/:officer/:project/approve",
            post(approve_registration_handler::<S>),
        )
        .route(
            "/api/v1/allocation/registrations/:officer/:project/reject",
            post(reject_registration_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn create_project_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    axum::Json(request): axum::Json<CreateProjectRequest>,
) -> Response {
    respond(
        StatusCode::CREATED,
        service.create_project(&request.manager, request.draft),
    )
}

pub(crate) async fn project_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.project(&ProjectName::new(project)))
}

pub(crate) async fn delete_project_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
) -> Response {
    match service.delete_project(&ProjectName::new(project)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn visibility_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
    axum::Json(request): axum::Json<VisibilityRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        service.set_visibility(&ProjectName::new(project), request.visible),
    )
}

pub(crate) async fn inventory_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
) -> Response {
    respond(StatusCode::OK, service.inventory(&ProjectName::new(project)))
}

pub(crate) async fn pending_applications_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        service.pending_applications(&ProjectName::new(project)),
    )
}

pub(crate) async fn pending_registrations_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(project): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        service.pending_registrations(&ProjectName::new(project)),
    )
}

pub(crate) async fn visible_projects_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path(applicant): Path<String>,
    Query(filter): Query<ProjectFilter>,
) -> Response {
    respond(
        StatusCode::OK,
        service.visible_projects(&Nric::new(applicant), &filter),
    )
}

pub(crate) async fn submit_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    axum::Json(request): axum::Json<SubmitApplicationRequest>,
) -> Response {
    let today = request.on.unwrap_or_else(|| Local::now().date_naive());
    respond(
        StatusCode::CREATED,
        service.submit_application(&request.applicant, &request.project, today),
    )
}

pub(crate) async fn application_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.application(&application_key(applicant, project)),
    )
}

pub(crate) async fn approve_application_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
) -> Response {
    let key = application_key(applicant, project);
    match service.approve_application(&key) {
        Ok(outcome) => {
            let payload = json!({
                "application": key.to_string(),
                "outcome": outcome,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn reject_application_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
) -> Response {
    let key = application_key(applicant, project);
    match service.reject_application(&key) {
        Ok(()) => {
            let payload = json!({
                "application": key.to_string(),
                "status": "unsuccessful",
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn select_flat_type_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
    axum::Json(request): axum::Json<FlatTypeRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        service.select_flat_type(&application_key(applicant, project), request.flat_type),
    )
}

pub(crate) async fn booking_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
    axum::Json(request): axum::Json<BookingRequest>,
) -> Response {
    respond(
        StatusCode::OK,
        service.process_booking(&application_key(applicant, project), &request.officer),
    )
}

pub(crate) async fn request_withdrawal_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    axum::Json(request): axum::Json<WithdrawalRequest>,
) -> Response {
    let today = request.on.unwrap_or_else(|| Local::now().date_naive());
    respond(
        StatusCode::CREATED,
        service.request_withdrawal(&request.applicant, today),
    )
}

pub(crate) async fn pending_withdrawals_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
) -> Response {
    respond(StatusCode::OK, service.pending_withdrawals())
}

pub(crate) async fn approve_withdrawal_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.approve_withdrawal(&application_key(applicant, project)),
    )
}

pub(crate) async fn reject_withdrawal_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((applicant, project)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.reject_withdrawal(&application_key(applicant, project)),
    )
}

pub(crate) async fn register_officer_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    axum::Json(request): axum::Json<RegistrationRequest>,
) -> Response {
    let today = request.on.unwrap_or_else(|| Local::now().date_naive());
    respond(
        StatusCode::CREATED,
        service.register_officer(&request.officer, &request.project, today),
    )
}

pub(crate) async fn approve_registration_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((officer, project)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.approve_registration(&registration_key(officer, project)),
    )
}

pub(crate) async fn reject_registration_handler<S: AllocationStore + 'static>(
    State(service): SharedService<S>,
    Path((officer, project)): Path<(String, String)>,
) -> Response {
    respond(
        StatusCode::OK,
        service.reject_registration(&registration_key(officer, project)),
    )
}

fn application_key(applicant: String, project: String) -> ApplicationKey {
    ApplicationKey::new(Nric::new(applicant), ProjectName::new(project))
}

fn registration_key(officer: String, project: String) -> RegistrationKey {
    RegistrationKey::new(Nric::new(officer), ProjectName::new(project))
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, AllocationServiceError>) -> Response {
    match result {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) fn error_status(error: &AllocationServiceError) -> StatusCode {
    let AllocationServiceError::Allocation(error) = error else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };
    match error {
        AllocationError::NotFound { .. } => StatusCode::NOT_FOUND,
        AllocationError::OfficerNotAssigned { .. } => StatusCode::FORBIDDEN,
        AllocationError::AlreadyHasActiveApplication { .. }
        | AllocationError::AlreadyRegistered { .. }
        | AllocationError::DuplicateWithdrawal(_)
        | AllocationError::DuplicateProject(_)
        | AllocationError::DateRangeConflict { .. }
        | AllocationError::InvalidStateForTransition { .. } => StatusCode::CONFLICT,
        AllocationError::ProjectNotOpenOrNotVisible(_)
        | AllocationError::NotEligible { .. }
        | AllocationError::NoUnitsAvailable { .. }
        | AllocationError::NoOfficerSlots(_)
        | AllocationError::InvalidProject(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}
