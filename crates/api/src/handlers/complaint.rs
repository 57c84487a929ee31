//! Handlers for the `/complaints` resource: filing, listing, lifecycle
//! transitions, assignment, and withdrawal.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use waterline_core::complaint::{
    validate_category, validate_coordinates, validate_transition, validate_urgency,
    ComplaintStatus, DEFAULT_URGENCY, VALID_STATUSES,
};
use waterline_core::error::CoreError;
use waterline_core::roles::{ROLE_ADMIN, ROLE_RESIDENT, ROLE_TECHNICIAN};
use waterline_core::technician::is_assignable;
use waterline_core::types::DbId;
use waterline_db::models::complaint::{
    Complaint, ComplaintDetail, ComplaintFilter, CreateComplaint, UpdateComplaint,
};
use waterline_db::repositories::{ComplaintRepo, TechnicianRepo};
use waterline_events::{kinds, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireTechnician};
use crate::query::{DateRangeQuery, PageQuery};
use crate::response::{DataResponse, Paginated};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /complaints`.
#[derive(Debug, Deserialize)]
pub struct FileComplaintRequest {
    pub category: String,
    pub urgency: Option<String>,
    pub title: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub accuracy_m: Option<f64>,
    pub photo_urls: Option<serde_json::Value>,
}

/// Query parameters for `GET /complaints`.
///
/// `technician_id` is carried as a raw string and parsed in the handler,
/// like the paging fields.
#[derive(Debug, Default, Deserialize)]
pub struct ListComplaintsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub technician_id: Option<String>,
    #[serde(flatten)]
    pub range: DateRangeQuery,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Request body for `PATCH /complaints/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Request body for `POST /complaints/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub technician_id: DbId,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a complaint row or 404.
async fn ensure_complaint_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Complaint> {
    ComplaintRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))
}

/// Parse a stored status string. The CHECK constraint makes a failure here a
/// data corruption, not a user error.
fn parse_stored_status(id: DbId, status: &str) -> AppResult<ComplaintStatus> {
    ComplaintStatus::parse(status).ok_or_else(|| {
        AppError::InternalError(format!("Complaint {id} has unknown status '{status}'"))
    })
}

fn validate_status_filter(status: &str) -> AppResult<()> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        ))))
    }
}

fn validate_photo_urls(photo_urls: &serde_json::Value) -> AppResult<()> {
    match photo_urls.as_array() {
        Some(urls) if urls.iter().all(|u| u.is_string()) => Ok(()),
        _ => Err(AppError::Core(CoreError::Validation(
            "photo_urls must be an array of strings".into(),
        ))),
    }
}

/// Resolve the technician profile linked to a staff user account.
async fn technician_profile_for(
    pool: &sqlx::PgPool,
    user_id: DbId,
) -> AppResult<waterline_db::models::technician::Technician> {
    TechnicianRepo::find_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "No technician profile linked to this account".into(),
            ))
        })
}

/// Resolve the user account behind the complaint's assigned technician, if any.
async fn assigned_technician_user_id(
    pool: &sqlx::PgPool,
    technician_id: Option<DbId>,
) -> AppResult<Option<DbId>> {
    let Some(technician_id) = technician_id else {
        return Ok(None);
    };
    Ok(TechnicianRepo::find_by_id(pool, technician_id)
        .await?
        .map(|t| t.user_id))
}

// ---------------------------------------------------------------------------
// POST /complaints
// ---------------------------------------------------------------------------

/// POST /api/v1/complaints
///
/// File a new complaint. The acting user becomes the reporter.
pub async fn file_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<FileComplaintRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Complaint>>)> {
    validate_category(&input.category).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let urgency = input.urgency.unwrap_or_else(|| DEFAULT_URGENCY.to_string());
    validate_urgency(&urgency).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title must not be empty".into(),
        )));
    }
    if input.description.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Description must not be empty".into(),
        )));
    }

    match (input.latitude, input.longitude) {
        (Some(lat), Some(lon)) => {
            validate_coordinates(lat, lon)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        }
        (None, None) => {}
        _ => {
            return Err(AppError::Core(CoreError::Validation(
                "Latitude and longitude must be provided together".into(),
            )));
        }
    }

    if let Some(ref urls) = input.photo_urls {
        validate_photo_urls(urls)?;
    }

    let complaint = ComplaintRepo::create(
        &state.pool,
        &CreateComplaint {
            resident_id: auth.user_id,
            category: input.category,
            urgency,
            title: input.title.trim().to_string(),
            description: input.description,
            latitude: input.latitude,
            longitude: input.longitude,
            address: input.address,
            accuracy_m: input.accuracy_m,
            photo_urls: input.photo_urls,
        },
    )
    .await?;

    tracing::info!(
        complaint_id = complaint.id,
        category = %complaint.category,
        urgency = %complaint.urgency,
        "Complaint filed"
    );

    let event = DomainEvent::new(kinds::COMPLAINT_CREATED)
        .for_complaint(complaint.id)
        .by_user(auth.user_id)
        .with_payload(serde_json::json!({
            "resident_id": complaint.resident_id,
            "category": complaint.category,
            "urgency": complaint.urgency,
            "title": complaint.title,
        }));
    state.event_bus.publish(event);

    Ok((StatusCode::CREATED, Json(DataResponse { data: complaint })))
}

// ---------------------------------------------------------------------------
// GET /complaints
// ---------------------------------------------------------------------------

/// GET /api/v1/complaints
///
/// List complaints, scoped by role: residents see their own, technicians the
/// ones assigned to them, admins everything. Admin filters narrow further.
pub async fn list_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ListComplaintsQuery>,
) -> AppResult<Json<Paginated<ComplaintDetail>>> {
    let page = params.page.resolve()?;
    let (from, to) = params.range.resolve()?;

    if let Some(ref status) = params.status {
        validate_status_filter(status)?;
    }
    if let Some(ref category) = params.category {
        validate_category(category).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(ref urgency) = params.urgency {
        validate_urgency(urgency).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let technician_filter = params
        .technician_id
        .as_deref()
        .map(|raw| {
            raw.parse::<DbId>().map_err(|_| {
                AppError::Core(CoreError::Validation(
                    "technician_id must be an integer".into(),
                ))
            })
        })
        .transpose()?;

    let mut filter = ComplaintFilter {
        status: params.status,
        category: params.category,
        urgency: params.urgency,
        technician_id: technician_filter,
        from,
        to,
        ..Default::default()
    };

    match auth.role.as_str() {
        ROLE_ADMIN => {}
        ROLE_TECHNICIAN => {
            // Technicians see their own queue regardless of the filter.
            let technician = technician_profile_for(&state.pool, auth.user_id).await?;
            filter.technician_id = Some(technician.id);
        }
        ROLE_RESIDENT => {
            filter.resident_id = Some(auth.user_id);
        }
        other => {
            tracing::warn!(role = %other, user_id = auth.user_id, "Unknown role on token");
            return Err(AppError::Core(CoreError::Forbidden(
                "Unknown role".into(),
            )));
        }
    }

    let total = ComplaintRepo::count(&state.pool, &filter).await?;
    let items = ComplaintRepo::query(&state.pool, &filter, page.size, page.offset()).await?;

    Ok(Json(Paginated::new(items, page, total)))
}

// ---------------------------------------------------------------------------
// GET /complaints/{id}
// ---------------------------------------------------------------------------

/// GET /api/v1/complaints/{id}
///
/// Fetch one complaint with reporter and assignment details. Residents can
/// only read their own; technicians only what is assigned to them.
pub async fn get_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ComplaintDetail>>> {
    let detail = ComplaintRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))?;

    match auth.role.as_str() {
        ROLE_ADMIN => {}
        ROLE_TECHNICIAN => {
            let technician = technician_profile_for(&state.pool, auth.user_id).await?;
            if detail.technician_id != Some(technician.id) {
                return Err(AppError::Core(CoreError::Forbidden(
                    "You do not have access to this complaint".into(),
                )));
            }
        }
        _ => {
            if detail.resident_id != auth.user_id {
                return Err(AppError::Core(CoreError::Forbidden(
                    "You do not have access to this complaint".into(),
                )));
            }
        }
    }

    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// PUT /complaints/{id}
// ---------------------------------------------------------------------------

/// PUT /api/v1/complaints/{id}
///
/// Edit a complaint's reported fields. The reporter may edit while the
/// complaint is still `submitted`; admins may edit until it is terminal.
pub async fn update_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComplaint>,
) -> AppResult<Json<DataResponse<Complaint>>> {
    let complaint = ensure_complaint_exists(&state.pool, id).await?;
    let status = parse_stored_status(id, &complaint.status)?;

    if auth.role == ROLE_ADMIN {
        if status.is_terminal() {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Complaint is {status} and can no longer be edited"
            ))));
        }
    } else if complaint.resident_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this complaint".into(),
        )));
    } else if status != ComplaintStatus::Submitted {
        return Err(AppError::Core(CoreError::Conflict(
            "Complaint can no longer be edited once work has started".into(),
        )));
    }

    if let Some(ref category) = input.category {
        validate_category(category).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(ref urgency) = input.urgency {
        validate_urgency(urgency).map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(ref title) = input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Title must not be empty".into(),
            )));
        }
    }
    if let Some(ref description) = input.description {
        if description.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Description must not be empty".into(),
            )));
        }
    }
    if input.latitude.is_some() || input.longitude.is_some() {
        // A single new coordinate pairs up with the stored other half.
        match (
            input.latitude.or(complaint.latitude),
            input.longitude.or(complaint.longitude),
        ) {
            (Some(lat), Some(lon)) => {
                validate_coordinates(lat, lon)
                    .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            }
            _ => {
                return Err(AppError::Core(CoreError::Validation(
                    "Latitude and longitude must be provided together".into(),
                )));
            }
        }
    }
    if let Some(ref urls) = input.photo_urls {
        validate_photo_urls(urls)?;
    }

    let updated = ComplaintRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))?;

    tracing::info!(complaint_id = id, "Complaint updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// PATCH /complaints/{id}/status
// ---------------------------------------------------------------------------

/// PATCH /api/v1/complaints/{id}/status
///
/// Move a complaint through its lifecycle. Admins may move any complaint;
/// a technician only the ones assigned to them.
pub async fn update_status(
    State(state): State<AppState>,
    RequireTechnician(auth): RequireTechnician,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Complaint>>> {
    let new_status = ComplaintStatus::parse(&input.status).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Invalid status '{}'. Must be one of: {}",
            input.status,
            VALID_STATUSES.join(", ")
        )))
    })?;

    let detail = ComplaintRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))?;

    if auth.role == ROLE_TECHNICIAN {
        let technician = technician_profile_for(&state.pool, auth.user_id).await?;
        if detail.technician_id != Some(technician.id) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only the assigned technician can update this complaint".into(),
            )));
        }
    }

    let old_status = parse_stored_status(id, &detail.status)?;
    validate_transition(old_status, new_status)
        .map_err(|msg| AppError::Core(CoreError::Conflict(msg)))?;

    if new_status.implies_assignment() && detail.technician_id.is_none() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Complaint cannot be {new_status} without an assigned technician"
        ))));
    }

    let updated =
        ComplaintRepo::set_status(&state.pool, id, new_status.as_str(), input.notes.as_deref())
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Complaint",
                id,
            }))?;

    tracing::info!(
        complaint_id = id,
        from = %old_status,
        to = %new_status,
        "Complaint status changed"
    );

    let technician_user_id = if auth.role == ROLE_TECHNICIAN {
        Some(auth.user_id)
    } else {
        assigned_technician_user_id(&state.pool, detail.technician_id).await?
    };

    let event = DomainEvent::new(kinds::COMPLAINT_STATUS_CHANGED)
        .for_complaint(id)
        .by_user(auth.user_id)
        .with_payload(serde_json::json!({
            "old_status": old_status.as_str(),
            "new_status": new_status.as_str(),
            "resident_id": detail.resident_id,
            "technician_user_id": technician_user_id,
        }));
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /complaints/{id}/assign
// ---------------------------------------------------------------------------

/// POST /api/v1/complaints/{id}/assign
///
/// Assign (or re-assign) a technician. Admin only. The complaint moves to
/// `assigned`; re-assignment rewrites the existing task.
pub async fn assign_technician(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<Json<DataResponse<ComplaintDetail>>> {
    let complaint = ensure_complaint_exists(&state.pool, id).await?;
    let status = parse_stored_status(id, &complaint.status)?;
    if status.is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Complaint is {status} and can no longer be assigned"
        ))));
    }

    let technician = TechnicianRepo::find_by_id(&state.pool, input.technician_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Technician",
            id: input.technician_id,
        }))?;
    if !is_assignable(&technician.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Technician is {} and cannot take new assignments",
            technician.status
        ))));
    }

    let (complaint, task) = ComplaintRepo::assign_technician(&state.pool, id, technician.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))?;

    tracing::info!(
        complaint_id = id,
        technician_id = technician.id,
        task_id = task.id,
        "Technician assigned"
    );

    let mut event = DomainEvent::new(kinds::COMPLAINT_ASSIGNED)
        .for_complaint(id)
        .with_payload(serde_json::json!({
            "technician_id": technician.id,
            "technician_user_id": technician.user_id,
            "resident_id": complaint.resident_id,
        }));
    if let Some(actor) = admin.author_id() {
        event = event.by_user(actor);
    }
    state.event_bus.publish(event);

    let detail = ComplaintRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Complaint",
            id,
        }))?;
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// DELETE /complaints/{id}
// ---------------------------------------------------------------------------

/// DELETE /api/v1/complaints/{id}
///
/// Withdraw a complaint. The reporter may withdraw while it is still
/// `submitted`; admins may delete at any point. The task row goes with it.
pub async fn delete_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let complaint = ensure_complaint_exists(&state.pool, id).await?;

    if auth.role != ROLE_ADMIN {
        if complaint.resident_id != auth.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not have access to this complaint".into(),
            )));
        }
        let status = parse_stored_status(id, &complaint.status)?;
        if status != ComplaintStatus::Submitted {
            return Err(AppError::Core(CoreError::Conflict(
                "Only a submitted complaint can be withdrawn".into(),
            )));
        }
    }

    ComplaintRepo::delete(&state.pool, id).await?;

    tracing::info!(complaint_id = id, "Complaint deleted");

    let event = DomainEvent::new(kinds::COMPLAINT_DELETED)
        .for_complaint(id)
        .by_user(auth.user_id)
        .with_payload(serde_json::json!({
            "resident_id": complaint.resident_id,
            "status": complaint.status,
        }));
    state.event_bus.publish(event);

    Ok(StatusCode::NO_CONTENT)
}
