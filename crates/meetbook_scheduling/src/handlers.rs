// --- File: crates/meetbook_scheduling/src/handlers.rs ---
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::Json,
};
use chrono::{DateTime, Utc};
use meetbook_common::{CalendarCredential, CalendarPort};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::availability::{AvailabilityResolver, SchedulingSettings};
use crate::clock::Clock;
use crate::coordinator::{BookingCoordinator, BookingRequest};
use crate::error::SchedulingError;
use crate::models::{
    Booking, BookingStatus, Caller, MeetingType, MeetingTypePatch, NewMeetingType, OwnerBooking,
    Role, Slot,
};
use crate::ports::SchedulingRepository;
use crate::registry::MeetingTypeRegistry;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

// Shared state for every scheduling route
pub struct SchedulingState {
    pub repository: Arc<dyn SchedulingRepository>,
    pub availability: AvailabilityResolver,
    pub coordinator: BookingCoordinator,
    pub registry: MeetingTypeRegistry,
    pub clock: Arc<dyn Clock>,
}

impl SchedulingState {
    pub fn new(
        repository: Arc<dyn SchedulingRepository>,
        calendar: Arc<dyn CalendarPort>,
        clock: Arc<dyn Clock>,
        settings: SchedulingSettings,
    ) -> Self {
        let availability =
            AvailabilityResolver::new(repository.clone(), calendar, clock.clone(), Arc::new(settings));
        let coordinator =
            BookingCoordinator::new(repository.clone(), availability.clone(), clock.clone());
        let registry = MeetingTypeRegistry::new(repository.clone(), clock.clone());
        Self {
            repository,
            availability,
            coordinator,
            registry,
            clock,
        }
    }
}

/// Identity headers set by the upstream identity layer.
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let user_id = header(USER_ID_HEADER).ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing caller identity".to_string(),
        ))?;
        let role = match header(USER_ROLE_HEADER) {
            Some(raw) => Role::parse(raw).ok_or((
                StatusCode::UNAUTHORIZED,
                format!("Unknown role '{raw}'"),
            ))?,
            None => Role::Participant,
        };
        Ok(Caller::new(user_id, role))
    }
}

#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
    /// Window start, RFC 3339
    pub start: DateTime<Utc>,
    /// Window end (exclusive), RFC 3339
    pub end: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct ProbeQuery {
    pub start: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub meeting_type_id: String,
    pub slots: Vec<Slot>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub calendar_synced: bool,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            calendar_synced: booking.calendar_synced(),
            booking,
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingCountResponse {
    pub meeting_type_id: String,
    pub count: usize,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUpdateRequest {
    pub is_active: bool,
}

/// Public view of one active meeting type.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/meeting-types/{id}",
    params(("id" = String, Path, description = "Meeting type id")),
    responses(
        (status = 200, description = "Meeting type"),
        (status = 404, description = "Unknown or inactive meeting type")
    ),
    tag = "Booking"
))]
pub async fn get_meeting_type_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<String>,
) -> Result<Json<MeetingType>, SchedulingError> {
    Ok(Json(state.registry.get_public(&id).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/meeting-types/{id}/availability",
    params(
        ("id" = String, Path, description = "Meeting type id"),
        ("start" = String, Query, description = "Window start (RFC 3339)"),
        ("end" = String, Query, description = "Window end, exclusive (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Candidate slots with availability"),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Unknown or inactive meeting type")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, SchedulingError> {
    let slots = state
        .availability
        .resolve(&id, query.start, query.end)
        .await?;
    Ok(Json(AvailabilityResponse {
        meeting_type_id: id,
        slots,
    }))
}

pub async fn probe_slot_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<String>,
    Query(query): Query<ProbeQuery>,
) -> Result<Json<Slot>, SchedulingError> {
    Ok(Json(state.availability.probe(&id, query.start).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/meeting-types/{id}/bookings",
    params(("id" = String, Path, description = "Meeting type id")),
    responses(
        (status = 201, description = "Booking created"),
        (status = 400, description = "Invalid attendee data or slot length"),
        (status = 409, description = "Slot no longer available")
    ),
    tag = "Booking"
))]
pub async fn submit_booking_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(id): Path<String>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), SchedulingError> {
    let booking = state.coordinator.submit_booking(&id, request).await?;
    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn list_owner_meeting_types_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
) -> Result<Json<Vec<MeetingType>>, SchedulingError> {
    Ok(Json(state.registry.list_for_owner(&caller).await?))
}

pub async fn create_meeting_type_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Json(input): Json<NewMeetingType>,
) -> Result<(StatusCode, Json<MeetingType>), SchedulingError> {
    let created = state.registry.create(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_meeting_type_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(patch): Json<MeetingTypePatch>,
) -> Result<Json<MeetingType>, SchedulingError> {
    Ok(Json(state.registry.update(&id, patch, &caller).await?))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/owner/meeting-types/{id}",
    params(("id" = String, Path, description = "Meeting type id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Caller does not own the meeting type"),
        (status = 409, description = "Active bookings still reference it")
    ),
    tag = "Owner"
))]
pub async fn delete_meeting_type_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<StatusCode, SchedulingError> {
    state.registry.delete(&id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn booking_count_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<BookingCountResponse>, SchedulingError> {
    let count = state.registry.active_booking_count(&id, &caller).await?;
    Ok(Json(BookingCountResponse {
        meeting_type_id: id,
        count,
    }))
}

pub async fn list_owner_bookings_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
) -> Result<Json<Vec<OwnerBooking>>, SchedulingError> {
    Ok(Json(state.coordinator.list_for_owner(&caller).await?))
}

pub async fn get_owner_booking_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, SchedulingError> {
    Ok(Json(state.coordinator.get(&id, &caller).await?.into()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/owner/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Updated booking"),
        (status = 403, description = "Caller does not own the booking"),
        (status = 409, description = "Transition not allowed or slot taken on restore")
    ),
    tag = "Owner"
))]
pub async fn update_booking_status_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<BookingResponse>, SchedulingError> {
    let booking = state
        .coordinator
        .update_status(&id, body.status, &caller)
        .await?;
    Ok(Json(booking.into()))
}

pub async fn resync_booking_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, SchedulingError> {
    let booking = state
        .coordinator
        .resync_calendar_event(&id, &caller)
        .await?;
    Ok(Json(booking.into()))
}

pub async fn put_calendar_credential_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Json(credential): Json<CalendarCredential>,
) -> Result<StatusCode, SchedulingError> {
    if !caller.can_own_meetings() {
        return Err(SchedulingError::Forbidden(
            "only owners can link a calendar".to_string(),
        ));
    }
    if credential.calendar_id.trim().is_empty() {
        return Err(SchedulingError::Validation(
            "calendar_id must not be empty".to_string(),
        ));
    }
    state
        .repository
        .put_calendar_credential(&caller.user_id, &credential, state.clock.now())
        .await?;
    info!(owner_id = %caller.user_id, "Calendar credential stored");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_list_meeting_types_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
) -> Result<Json<Vec<MeetingType>>, SchedulingError> {
    Ok(Json(state.registry.list_all(&caller).await?))
}

pub async fn admin_set_active_handler(
    State(state): State<Arc<SchedulingState>>,
    caller: Caller,
    Path(id): Path<String>,
    Json(body): Json<ActiveUpdateRequest>,
) -> Result<Json<MeetingType>, SchedulingError> {
    Ok(Json(
        state.registry.set_active(&id, body.is_active, &caller).await?,
    ))
}
