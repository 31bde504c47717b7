//! Read-only scheduling lookups.

use serde_json::{json, Value};

use appointsync_core::appointments::{
    plan_search, user_appointments_query, SearchPlan, SearchRequest, UserAppointmentsRequest,
};
use appointsync_core::response::ResponseEnvelope;

use super::{unauthorized, upstream_failure, HandlerError, UPSTREAM_QUERY_FAILED};
use crate::pipeline::{InboundEvent, Validated};
use crate::response::{bad_request, make_response, not_found};
use crate::state::AppState;

pub const NO_USER_APPOINTMENTS: &str = "No appointments found for the user";

/// `POST /availability`: lists appointments in a date range or open times on a date.
pub async fn search(
    state: AppState,
    request: Validated<SearchRequest>,
) -> Result<ResponseEnvelope, HandlerError> {
    let plan = match plan_search(&request.body) {
        Ok(plan) => plan,
        Err(error) => return Ok(bad_request(&error.to_string(), None)),
    };

    let result = match &plan {
        SearchPlan::Appointments(params) => state.scheduling.list_appointments(params).await,
        SearchPlan::Availability(params) => state.scheduling.availability_times(params).await,
    };

    Ok(match result {
        Ok(data) => with_resource(data, request.body.resource.as_str()),
        Err(error) => upstream_failure(&error, UPSTREAM_QUERY_FAILED),
    })
}

/// `POST /user-appointments`: every appointment booked with the customer's phone,
/// or email when there is no phone.
pub async fn user_appointments(
    state: AppState,
    request: Validated<UserAppointmentsRequest>,
) -> Result<ResponseEnvelope, HandlerError> {
    let customer = request.event.customer();
    let Some(params) = user_appointments_query(&customer, &request.body) else {
        return Ok(unauthorized());
    };

    Ok(match state.scheduling.list_appointments(&params).await {
        Ok(data) if is_empty(&data) => not_found(NO_USER_APPOINTMENTS, None),
        Ok(data) => with_resource(data, "user-appointments"),
        Err(error) => upstream_failure(&error, UPSTREAM_QUERY_FAILED),
    })
}

/// `GET /appointment-types`
pub async fn appointment_types(
    state: AppState,
    _event: InboundEvent,
) -> Result<ResponseEnvelope, HandlerError> {
    Ok(match state.scheduling.appointment_types().await {
        Ok(data) => with_resource(data, "appointment-types"),
        Err(error) => upstream_failure(&error, UPSTREAM_QUERY_FAILED),
    })
}

fn with_resource(data: Value, resource: &str) -> ResponseEnvelope {
    make_response(
        200,
        Some(json!({
            "data": data,
            "meta": { "resource": resource },
        })),
    )
}

fn is_empty(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}
