use thiserror::Error;

/// Request-level rule violations, each answered with a client error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Provide at least one user identifier (phone or email)")]
    MissingContact,
    #[error("Missing parameter: datetime")]
    MissingDatetime,
    #[error("Send at least one editable field: notes, label or fields")]
    NothingToUpdate,
    #[error("Missing parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),
    #[error("Invalid date format. Use YYYY-MM-DD in {}", .0.join(" and "))]
    InvalidDateFormat(Vec<&'static str>),
}
