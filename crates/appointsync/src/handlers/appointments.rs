//! Appointment writes: create, edit (update or reschedule) and cancel.

use serde_json::{json, Value};

use appointsync_core::appointments::{
    cancel_payload, create_payload, reschedule_payload, update_payload, CancelAppointmentRequest,
    CreateAppointmentRequest, EditAction, EditAppointmentRequest,
};
use appointsync_core::response::ResponseEnvelope;

use super::{unauthorized, upstream_failure, HandlerError, UPSTREAM_QUERY_FAILED};
use crate::observe::observe;
use crate::pipeline::Validated;
use crate::response::{bad_request, make_response, not_found};
use crate::scheduling;
use crate::state::AppState;

pub const CREATE_FAILED: &str = "Error creating the appointment in Acuity";
pub const RESCHEDULE_NOT_FOUND: &str = "Unable to reschedule the appointment";
pub const UPDATE_NOT_FOUND: &str = "Appointment not found or nothing to change";
pub const CANCEL_NOT_FOUND: &str = "Unable to cancel the appointment";

/// `POST /`: books an appointment for the authenticated customer.
///
/// A customer seen for the first time gets a profile before the booking.
pub async fn create(
    state: AppState,
    request: Validated<CreateAppointmentRequest>,
) -> Result<ResponseEnvelope, HandlerError> {
    let customer = request.event.customer();
    let payload = match create_payload(&request.body, &customer) {
        Ok(payload) => payload,
        Err(error) => return Ok(bad_request(&error.to_string(), None)),
    };

    if let Some(customer_id) = &customer.customer_id {
        if !state.profiles.exists(customer_id).await? {
            observe("upsert_profile", state.profiles.upsert_customer(&customer)).await;
        }
    }

    match state.scheduling.create_appointment(&payload).await {
        Ok(data) => {
            tracing::info!(customer_id = ?customer.customer_id, "Appointment created");
            Ok(make_response(201, Some(json!({ "data": data }))))
        }
        Err(error) => Ok(upstream_failure(&error, CREATE_FAILED)),
    }
}

/// `PUT /`: reschedules or updates an appointment.
pub async fn edit(
    state: AppState,
    request: Validated<EditAppointmentRequest>,
) -> Result<ResponseEnvelope, HandlerError> {
    let customer = request.event.customer();
    if !customer.has_contact() {
        return Ok(unauthorized());
    }

    let body = &request.body;
    let appointment_id = body.appointment_id.to_string();

    observe("upsert_profile", state.profiles.upsert_customer(&customer)).await;

    let (result, missing) = match body.action {
        EditAction::Reschedule => {
            let payload = match reschedule_payload(body) {
                Ok(payload) => payload,
                Err(error) => return Ok(bad_request(&error.to_string(), None)),
            };
            let result = state
                .scheduling
                .reschedule_appointment(&appointment_id, &payload)
                .await;
            (result, RESCHEDULE_NOT_FOUND)
        }
        EditAction::Update => {
            let payload = match update_payload(body) {
                Ok(payload) => payload,
                Err(error) => return Ok(bad_request(&error.to_string(), None)),
            };
            let result = state
                .scheduling
                .update_appointment(&appointment_id, &payload)
                .await;
            (result, UPDATE_NOT_FOUND)
        }
    };

    Ok(action_outcome(result, body.action.as_str(), &appointment_id, missing))
}

/// `POST /cancel`: cancels an appointment, optionally with a reason.
pub async fn cancel(
    state: AppState,
    request: Validated<CancelAppointmentRequest>,
) -> Result<ResponseEnvelope, HandlerError> {
    if !request.event.customer().has_contact() {
        return Ok(unauthorized());
    }

    let appointment_id = request.body.appointment_id.to_string();
    let payload = cancel_payload(&request.body);
    let result = state
        .scheduling
        .cancel_appointment(&appointment_id, &payload)
        .await;

    Ok(action_outcome(result, "cancel", &appointment_id, CANCEL_NOT_FOUND))
}

fn action_outcome(
    result: scheduling::Result<Value>,
    action: &str,
    appointment_id: &str,
    missing: &str,
) -> ResponseEnvelope {
    match result {
        Ok(data) => {
            tracing::info!(action, appointment_id, "Appointment changed");
            make_response(
                200,
                Some(json!({
                    "data": data,
                    "meta": { "action": action, "appointmentId": appointment_id },
                })),
            )
        }
        Err(error) if error.is_not_found() => not_found(missing, None),
        Err(error) => upstream_failure(&error, UPSTREAM_QUERY_FAILED),
    }
}
