//! The third-party scheduling service.

mod acuity;
mod error;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value;

use appointsync_core::appointments::QueryParams;

pub use acuity::{AcuityClient, AcuitySettings};
pub use error::UpstreamError;

pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Appointment operations of the scheduling service. Payloads and responses are
/// passed through as JSON.
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    async fn create_appointment(&self, payload: &Value) -> Result<Value>;

    async fn reschedule_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value>;

    async fn update_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value>;

    async fn cancel_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value>;

    async fn list_appointments(&self, params: &QueryParams) -> Result<Value>;

    async fn availability_times(&self, params: &QueryParams) -> Result<Value>;

    async fn appointment_types(&self) -> Result<Value>;
}
