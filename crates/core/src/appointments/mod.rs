//! Appointment request bodies and the pure rules that turn them into scheduling calls.

mod customer;
mod error;
mod operations;
mod requests;

pub use customer::Customer;
pub use error::AppointmentError;
pub use operations::{
    cancel_payload, create_payload, is_valid_date, plan_search, reschedule_payload,
    update_payload, user_appointments_query, QueryParams, SearchPlan,
};
pub use requests::{
    CancelAppointmentRequest, CreateAppointmentRequest, EditAction, EditAppointmentRequest,
    Identifier, SearchRequest, SearchResource, UserAppointmentsRequest,
};
