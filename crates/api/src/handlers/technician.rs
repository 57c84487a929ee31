//! Handlers for the `/technicians` staff directory. All admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use waterline_core::error::CoreError;
use waterline_core::roles::ROLE_TECHNICIAN;
use waterline_core::technician::{validate_speciality, validate_technician_status};
use waterline_core::types::DbId;
use waterline_db::models::technician::{CreateTechnician, TechnicianProfile, UpdateTechnician};
use waterline_db::repositories::{RoleRepo, TechnicianRepo, UserRepo};

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PageQuery;
use crate::response::{DataResponse, Paginated};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /technicians`.
#[derive(Debug, Deserialize)]
pub struct EnrolTechnicianRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub speciality: String,
}

/// Query parameters for `GET /technicians`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTechniciansQuery {
    pub speciality: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Profile plus current workload, returned by `GET /technicians/{id}`.
#[derive(Debug, Serialize)]
pub struct TechnicianDetail {
    #[serde(flatten)]
    pub profile: TechnicianProfile,
    /// Tasks on complaints that are not yet resolved or rejected.
    pub open_task_count: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/technicians
///
/// Enrol a staff member: creates the user account (technician role) and the
/// technician profile in one transaction.
pub async fn enrol_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<EnrolTechnicianRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TechnicianProfile>>)> {
    if input.full_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Full name must not be empty".into(),
        )));
    }
    let email = input.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email address is required".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    validate_speciality(&input.speciality)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let role = RoleRepo::find_by_name(&state.pool, ROLE_TECHNICIAN)
        .await?
        .ok_or_else(|| AppError::InternalError("Technician role missing from seed data".into()))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let (user, technician) = TechnicianRepo::create_with_user(
        &state.pool,
        &CreateTechnician {
            full_name: input.full_name.trim().to_string(),
            email,
            phone: input.phone,
            password_hash,
            role_id: role.id,
            speciality: input.speciality,
        },
    )
    .await?;

    tracing::info!(
        technician_id = technician.id,
        user_id = user.id,
        speciality = %technician.speciality,
        "Technician enrolled"
    );

    let profile = TechnicianProfile {
        id: technician.id,
        user_id: user.id,
        full_name: user.full_name,
        email: user.email,
        phone: user.phone,
        speciality: technician.speciality,
        status: technician.status,
        created_at: technician.created_at,
        updated_at: technician.updated_at,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// GET /api/v1/technicians
///
/// List technician profiles with optional speciality/status filters.
pub async fn list_technicians(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListTechniciansQuery>,
) -> AppResult<Json<Paginated<TechnicianProfile>>> {
    let page = params.page.resolve()?;

    if let Some(ref speciality) = params.speciality {
        validate_speciality(speciality)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(ref status) = params.status {
        validate_technician_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let total = TechnicianRepo::count_profiles(
        &state.pool,
        params.speciality.as_deref(),
        params.status.as_deref(),
    )
    .await?;
    let items = TechnicianRepo::list_profiles(
        &state.pool,
        params.speciality.as_deref(),
        params.status.as_deref(),
        page.size,
        page.offset(),
    )
    .await?;

    Ok(Json(Paginated::new(items, page, total)))
}

/// GET /api/v1/technicians/{id}
///
/// Fetch one technician profile with their open-task count.
pub async fn get_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TechnicianDetail>>> {
    let profile = TechnicianRepo::find_profile(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id,
        }))?;
    let open_task_count = TechnicianRepo::open_task_count(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: TechnicianDetail {
            profile,
            open_task_count,
        },
    }))
}

/// PUT /api/v1/technicians/{id}
///
/// Update a technician's speciality, activity status, or contact phone.
pub async fn update_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTechnician>,
) -> AppResult<Json<DataResponse<TechnicianProfile>>> {
    if let Some(ref speciality) = input.speciality {
        validate_speciality(speciality)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(ref status) = input.status {
        validate_technician_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }

    let technician = TechnicianRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id,
        }))?;

    tracing::info!(technician_id = technician.id, "Technician updated");

    let profile = TechnicianRepo::find_profile(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id,
        }))?;
    Ok(Json(DataResponse { data: profile }))
}

/// DELETE /api/v1/technicians/{id}
///
/// Retire a technician: refused while they still hold tasks on unresolved
/// complaints. The profile row survives (task history references it); the
/// profile goes inactive and the user account is deactivated.
pub async fn retire_technician(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    TechnicianRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id,
        }))?;

    let open_tasks = TechnicianRepo::open_task_count(&state.pool, id).await?;
    if open_tasks > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Technician still has {open_tasks} open task(s); reassign them first"
        ))));
    }

    TechnicianRepo::retire(&state.pool, id).await?;

    tracing::info!(technician_id = id, "Technician retired");
    Ok(StatusCode::NO_CONTENT)
}
