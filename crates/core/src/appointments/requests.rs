use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::schema::{Field, FieldType, RequestBody, Schema};

/// A scheduling identifier, sent back exactly as the client gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(id) => serializer.serialize_i64(*id),
            Self::Text(id) => serializer.serialize_str(id),
        }
    }
}

// Goes through `Value` so exact-decimal numbers are recognized.
impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self::Text(id)),
            Value::Number(id) => id
                .as_i64()
                .map(Self::Number)
                .ok_or_else(|| de::Error::custom(format!("invalid identifier: {id}"))),
            other => Err(de::Error::custom(format!("invalid identifier: {other}"))),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// `POST /`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateAppointmentRequest {
    pub datetime: String,
    #[serde(rename = "calendarID")]
    pub calendar_id: Identifier,
    #[serde(rename = "appointmentTypeID")]
    pub appointment_type_id: Identifier,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RequestBody for CreateAppointmentRequest {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("datetime", FieldType::String),
            Field::required("calendarID", FieldType::Identifier),
            Field::required("appointmentTypeID", FieldType::Identifier),
            Field::optional("timezone", FieldType::String),
            Field::optional("notes", FieldType::String),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    Update,
    Reschedule,
}

impl EditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Reschedule => "reschedule",
        }
    }
}

/// `PUT /`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditAppointmentRequest {
    pub action: EditAction,
    #[serde(rename = "appointmentId")]
    pub appointment_id: Identifier,

    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, rename = "calendarID")]
    pub calendar_id: Option<Identifier>,
    #[serde(default, rename = "appointmentTypeID")]
    pub appointment_type_id: Option<Identifier>,
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Intake form answers, usually `{id, value}` objects.
    #[serde(default)]
    pub fields: Option<Vec<Value>>,
    #[serde(default)]
    pub admin: Option<bool>,
}

impl RequestBody for EditAppointmentRequest {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("action", FieldType::String).one_of(&["update", "reschedule"]),
            Field::required("appointmentId", FieldType::Identifier),
            Field::optional("datetime", FieldType::String),
            Field::optional("calendarID", FieldType::Identifier),
            Field::optional("appointmentTypeID", FieldType::Identifier),
            Field::optional("timezone", FieldType::String),
            Field::optional("notes", FieldType::String),
            Field::optional("label", FieldType::String),
            Field::optional("fields", FieldType::List(Box::new(FieldType::Any))),
            Field::optional("admin", FieldType::Boolean),
        ])
    }
}

/// `POST /cancel`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CancelAppointmentRequest {
    #[serde(rename = "appointmentId")]
    pub appointment_id: Identifier,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, rename = "notifyClient")]
    pub notify_client: Option<bool>,
}

impl RequestBody for CancelAppointmentRequest {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("appointmentId", FieldType::Identifier),
            Field::optional("reason", FieldType::String),
            Field::optional("notifyClient", FieldType::Boolean),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchResource {
    Appointments,
    Availability,
}

impl SearchResource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Appointments => "appointments",
            Self::Availability => "availability",
        }
    }
}

/// `POST /availability`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub resource: SearchResource,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "calendarId")]
    pub calendar_id: Option<String>,
    #[serde(default, rename = "appointmentTypeId")]
    pub appointment_type_id: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
}

impl RequestBody for SearchRequest {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::required("resource", FieldType::String).one_of(&["appointments", "availability"]),
            Field::optional("start_date", FieldType::String),
            Field::optional("end_date", FieldType::String),
            Field::optional("date", FieldType::String),
            Field::optional("calendarId", FieldType::String),
            Field::optional("appointmentTypeId", FieldType::String),
            Field::optional("timezone", FieldType::String),
            Field::optional("limit", FieldType::Integer),
            Field::optional("page", FieldType::Integer),
        ])
    }
}

/// `POST /user-appointments`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserAppointmentsRequest {
    #[serde(default, rename = "calendarId")]
    pub calendar_id: Option<Identifier>,
    #[serde(default, rename = "appointmentTypeId")]
    pub appointment_type_id: Option<Identifier>,
}

impl RequestBody for UserAppointmentsRequest {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::optional("calendarId", FieldType::Identifier),
            Field::optional("appointmentTypeId", FieldType::Identifier),
        ])
    }
}
