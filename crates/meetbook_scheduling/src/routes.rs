// --- File: crates/meetbook_scheduling/src/routes.rs ---

use crate::handlers::{
    admin_list_meeting_types_handler, admin_set_active_handler, booking_count_handler,
    create_meeting_type_handler, delete_meeting_type_handler, get_availability_handler,
    get_meeting_type_handler, get_owner_booking_handler, list_owner_bookings_handler,
    list_owner_meeting_types_handler, probe_slot_handler, put_calendar_credential_handler,
    resync_booking_handler, submit_booking_handler, update_booking_status_handler,
    update_meeting_type_handler, SchedulingState,
};
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all scheduling routes.
/// Participant routes are public; owner and admin routes read the caller from identity headers.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        // participant
        .route("/meeting-types/{id}", get(get_meeting_type_handler))
        .route(
            "/meeting-types/{id}/availability",
            get(get_availability_handler),
        )
        .route("/meeting-types/{id}/probe", get(probe_slot_handler))
        .route("/meeting-types/{id}/bookings", post(submit_booking_handler))
        // owner
        .route(
            "/owner/meeting-types",
            get(list_owner_meeting_types_handler).post(create_meeting_type_handler),
        )
        .route(
            "/owner/meeting-types/{id}",
            patch(update_meeting_type_handler).delete(delete_meeting_type_handler),
        )
        .route(
            "/owner/meeting-types/{id}/booking-count",
            get(booking_count_handler),
        )
        .route("/owner/bookings", get(list_owner_bookings_handler))
        .route("/owner/bookings/{id}", get(get_owner_booking_handler))
        .route(
            "/owner/bookings/{id}/status",
            patch(update_booking_status_handler),
        )
        .route("/owner/bookings/{id}/resync", post(resync_booking_handler))
        .route("/owner/calendar", put(put_calendar_credential_handler))
        // admin
        .route(
            "/admin/meeting-types",
            get(admin_list_meeting_types_handler),
        )
        .route(
            "/admin/meeting-types/{id}/active",
            patch(admin_set_active_handler),
        )
        .with_state(state)
}
