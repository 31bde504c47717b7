//! Pure functions building scheduling payloads and queries from validated requests.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use super::{
    AppointmentError, CancelAppointmentRequest, CreateAppointmentRequest, Customer,
    EditAppointmentRequest, SearchRequest, SearchResource, UserAppointmentsRequest,
};

/// Query-string pairs in the order they are sent.
pub type QueryParams = Vec<(String, String)>;

/// The scheduling read a search request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    Appointments(QueryParams),
    Availability(QueryParams),
}

/// Checks a `YYYY-MM-DD` calendar date with a four-digit year.
pub fn is_valid_date(date: &str) -> bool {
    date.len() == 10
        && date.bytes().take(4).all(|byte| byte.is_ascii_digit())
        && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Body of a new appointment, filled with the customer's contact data.
pub fn create_payload(
    request: &CreateAppointmentRequest,
    customer: &Customer,
) -> Result<Value, AppointmentError> {
    if !customer.has_contact() {
        return Err(AppointmentError::MissingContact);
    }

    let mut payload = Map::new();
    payload.insert("datetime".to_string(), json!(request.datetime));
    payload.insert("calendarID".to_string(), json!(request.calendar_id));
    payload.insert("appointmentTypeID".to_string(), json!(request.appointment_type_id));

    insert_non_empty(&mut payload, "timezone", request.timezone.as_deref());
    insert_non_empty(&mut payload, "notes", request.notes.as_deref());
    insert_non_empty(&mut payload, "firstName", Some(customer.first_name.as_str()));
    insert_non_empty(&mut payload, "lastName", Some(customer.last_name.as_str()));
    insert_non_empty(&mut payload, "email", customer.email.as_deref());
    insert_non_empty(&mut payload, "phone", Some(customer.phone.as_str()));

    Ok(Value::Object(payload))
}

/// Body of a reschedule. A new `datetime` is mandatory.
pub fn reschedule_payload(request: &EditAppointmentRequest) -> Result<Value, AppointmentError> {
    let datetime = request
        .datetime
        .as_deref()
        .filter(|datetime| !datetime.is_empty())
        .ok_or(AppointmentError::MissingDatetime)?;

    let mut payload = Map::new();
    payload.insert("datetime".to_string(), json!(datetime));
    if let Some(calendar_id) = &request.calendar_id {
        payload.insert("calendarID".to_string(), json!(calendar_id));
    }
    if let Some(appointment_type_id) = &request.appointment_type_id {
        payload.insert("appointmentTypeID".to_string(), json!(appointment_type_id));
    }
    if let Some(timezone) = &request.timezone {
        payload.insert("timezone".to_string(), json!(timezone));
    }

    Ok(Value::Object(payload))
}

/// Body of an in-place update. At least one of notes, label or fields is required.
pub fn update_payload(request: &EditAppointmentRequest) -> Result<Value, AppointmentError> {
    if request.notes.is_none() && request.label.is_none() && request.fields.is_none() {
        return Err(AppointmentError::NothingToUpdate);
    }

    let mut payload = Map::new();
    if let Some(notes) = &request.notes {
        payload.insert("notes".to_string(), json!(notes));
    }
    if let Some(label) = request.label.as_deref().filter(|label| !label.trim().is_empty()) {
        payload.insert("label".to_string(), json!([{ "name": label }]));
    }
    if let Some(fields) = &request.fields {
        payload.insert("fields".to_string(), Value::Array(fields.clone()));
    }
    if request.admin == Some(true) {
        payload.insert("admin".to_string(), Value::Bool(true));
    }

    Ok(Value::Object(payload))
}

/// Body of a cancellation. Blank reasons are dropped.
pub fn cancel_payload(request: &CancelAppointmentRequest) -> Value {
    let mut payload = Map::new();
    if let Some(reason) = request.reason.as_deref().filter(|reason| !reason.trim().is_empty()) {
        payload.insert("reason".to_string(), json!(reason));
    }
    if let Some(notify_client) = request.notify_client {
        payload.insert("notifyClient".to_string(), Value::Bool(notify_client));
    }
    Value::Object(payload)
}

/// Resolves a search into an appointment listing or an availability lookup.
pub fn plan_search(request: &SearchRequest) -> Result<SearchPlan, AppointmentError> {
    match request.resource {
        SearchResource::Appointments => {
            let start_date = non_empty(request.start_date.as_deref());
            let end_date = non_empty(request.end_date.as_deref());

            let (Some(start_date), Some(end_date)) = (start_date, end_date) else {
                let mut missing = Vec::new();
                if start_date.is_none() {
                    missing.push("start_date");
                }
                if end_date.is_none() {
                    missing.push("end_date");
                }
                return Err(AppointmentError::MissingParameters(missing));
            };

            if !is_valid_date(start_date) || !is_valid_date(end_date) {
                return Err(AppointmentError::InvalidDateFormat(vec!["start_date", "end_date"]));
            }

            let mut params = vec![param("minDate", start_date), param("maxDate", end_date)];
            push_optional(&mut params, "calendarID", request.calendar_id.as_deref());
            push_optional(&mut params, "appointmentTypeID", request.appointment_type_id.as_deref());
            push_optional(&mut params, "limit", request.limit.map(|limit| limit.to_string()).as_deref());
            push_optional(&mut params, "page", request.page.map(|page| page.to_string()).as_deref());

            Ok(SearchPlan::Appointments(params))
        }
        SearchResource::Availability => {
            let date = non_empty(request.date.as_deref())
                .ok_or_else(|| AppointmentError::MissingParameters(vec!["date"]))?;

            if !is_valid_date(date) {
                return Err(AppointmentError::InvalidDateFormat(vec!["date"]));
            }

            let mut params = vec![param("date", date)];
            push_optional(&mut params, "calendarID", request.calendar_id.as_deref());
            push_optional(&mut params, "appointmentTypeID", request.appointment_type_id.as_deref());
            push_optional(&mut params, "timezone", request.timezone.as_deref());

            Ok(SearchPlan::Availability(params))
        }
    }
}

/// Lists every appointment of the customer, looked up by phone or else by email.
///
/// Returns `None` when the customer has neither.
pub fn user_appointments_query(
    customer: &Customer,
    request: &UserAppointmentsRequest,
) -> Option<QueryParams> {
    let lookup = match (customer.phone(), customer.email()) {
        (Some(phone), _) => param("phone", phone),
        (None, Some(email)) => param("email", email),
        (None, None) => return None,
    };

    let mut params = vec![lookup, param("showall", "true"), param("canceled", "true")];
    if let Some(calendar_id) = &request.calendar_id {
        params.push(param("calendarID", &calendar_id.to_string()));
    }
    if let Some(appointment_type_id) = &request.appointment_type_id {
        params.push(param("appointmentTypeID", &appointment_type_id.to_string()));
    }

    Some(params)
}

fn param(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

fn push_optional(params: &mut QueryParams, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        params.push(param(name, value));
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn insert_non_empty(payload: &mut Map<String, Value>, name: &str, value: Option<&str>) {
    if let Some(value) = non_empty(value) {
        payload.insert(name.to_string(), json!(value));
    }
}
