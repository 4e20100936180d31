// File: crates/meetbook_scheduling/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;


#[utoipa::path(
    get,
    path = "/meeting-types/{id}/probe",
    params(
        ("id" = String, Path, description = "Meeting type id"),
        ("start" = String, Query, description = "Slot start (RFC 3339)", example = "2025-06-02T01:00:00Z")
    ),
    responses(
        (status = 200, description = "Classification of a single slot",
         example = json!({
             "start": "2025-06-02T01:00:00Z",
             "end": "2025-06-02T01:30:00Z",
             "available": false,
             "blockedReason": "ownerBusy"
         })
        ),
        (status = 404, description = "Unknown or inactive meeting type")
    ),
    tag = "Booking"
)]
fn doc_probe_slot_handler() {}

#[utoipa::path(
    post,
    path = "/owner/meeting-types",
    params(
        ("x-user-id" = String, Header, description = "Caller id"),
        ("x-user-role" = String, Header, description = "participant | owner | admin")
    ),
    request_body(content = String, content_type = "application/json", example = json!({
        "title": "Intro call",
        "description": "A short introduction",
        "durationMinutes": 30,
        "meetingKind": "google_meet",
        "businessHours": {
            "monday": { "enabled": true, "startTime": "09:00", "endTime": "17:00" },
            "tuesday": { "enabled": true, "startTime": "09:00", "endTime": "17:00" },
            "wednesday": { "enabled": true, "startTime": "09:00", "endTime": "17:00" },
            "thursday": { "enabled": true, "startTime": "09:00", "endTime": "17:00" },
            "friday": { "enabled": true, "startTime": "09:00", "endTime": "17:00" },
            "saturday": { "enabled": false, "startTime": "09:00", "endTime": "17:00" },
            "sunday": { "enabled": false, "startTime": "09:00", "endTime": "17:00" }
        }
    })),
    responses(
        (status = 201, description = "Meeting type created"),
        (status = 400, description = "Validation failed",
         example = json!({ "error": { "kind": "validation", "message": "Validation error: duration must be between 15 and 240 minutes" } })
        ),
        (status = 401, description = "Missing identity headers")
    ),
    tag = "Owner"
)]
fn doc_create_meeting_type_handler() {}

#[utoipa::path(
    get,
    path = "/owner/bookings",
    params(("x-user-id" = String, Header, description = "Caller id")),
    responses(
        (status = 200, description = "Owner's bookings, latest first",
         example = json!([{
             "id": "3f1c...",
             "meetingTypeId": "9a2b...",
             "ownerId": "owner-1",
             "attendeeName": "Ada",
             "attendeeEmail": "ada@example.com",
             "message": null,
             "scheduledTime": "2025-06-02T01:00:00Z",
             "endTime": "2025-06-02T01:30:00Z",
             "status": "scheduled",
             "externalEventId": null,
             "meetingLink": null,
             "createdAt": "2025-05-30T08:00:00Z",
             "calendarSynced": false,
             "meetingTitle": "Intro call",
             "meetingDurationMinutes": 30,
             "meetingKind": "google_meet"
         }])
        ),
        (status = 401, description = "Missing identity headers")
    ),
    tag = "Owner"
)]
fn doc_list_owner_bookings_handler() {}

#[utoipa::path(
    patch,
    path = "/admin/meeting-types/{id}/active",
    params(
        ("id" = String, Path, description = "Meeting type id"),
        ("x-user-id" = String, Header, description = "Caller id"),
        ("x-user-role" = String, Header, description = "Must be admin")
    ),
    request_body(content = String, content_type = "application/json", example = json!({ "isActive": false })),
    responses(
        (status = 200, description = "Updated meeting type"),
        (status = 403, description = "Caller is not an administrator")
    ),
    tag = "Admin"
)]
fn doc_admin_set_active_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_meeting_type_handler,
        crate::handlers::get_availability_handler,
        doc_probe_slot_handler,
        crate::handlers::submit_booking_handler,
        doc_create_meeting_type_handler,
        crate::handlers::delete_meeting_type_handler,
        doc_list_owner_bookings_handler,
        crate::handlers::update_booking_status_handler,
        doc_admin_set_active_handler
    ),
    tags(
        (name = "Booking", description = "Public availability and booking API"),
        (name = "Owner", description = "Meeting type and booking management"),
        (name = "Admin", description = "Administrative controls")
    ),
    servers(
        (url = "/api", description = "Meetbook scheduling API")
    )
)]
pub struct SchedulingApiDoc;
