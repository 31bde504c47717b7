//! Scheduling double for tests: records requests and replays scripted results.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use appointsync_core::appointments::QueryParams;

use super::{Result, SchedulingApi};

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub operation: &'static str,
    pub appointment_id: Option<String>,
    pub payload: Value,
}

#[derive(Default)]
pub struct FakeScheduling {
    requests: Mutex<Vec<Request>>,
    results: Mutex<VecDeque<Result<Value>>>,
}

impl FakeScheduling {
    /// Every call answers with `result`; later calls fall back to `{}`.
    pub fn returning(result: Result<Value>) -> Self {
        let fake = Self::default();
        fake.results.lock().unwrap().push_back(result);
        fake
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(
        &self,
        operation: &'static str,
        appointment_id: Option<&str>,
        payload: Value,
    ) -> Result<Value> {
        self.requests.lock().unwrap().push(Request {
            operation,
            appointment_id: appointment_id.map(str::to_string),
            payload,
        });
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

fn params_value(params: &QueryParams) -> Value {
    Value::Array(
        params
            .iter()
            .map(|(name, value)| json!([name, value]))
            .collect(),
    )
}

#[async_trait]
impl SchedulingApi for FakeScheduling {
    async fn create_appointment(&self, payload: &Value) -> Result<Value> {
        self.answer("create_appointment", None, payload.clone())
    }

    async fn reschedule_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        self.answer("reschedule_appointment", Some(appointment_id), payload.clone())
    }

    async fn update_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        self.answer("update_appointment", Some(appointment_id), payload.clone())
    }

    async fn cancel_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        self.answer("cancel_appointment", Some(appointment_id), payload.clone())
    }

    async fn list_appointments(&self, params: &QueryParams) -> Result<Value> {
        self.answer("list_appointments", None, params_value(params))
    }

    async fn availability_times(&self, params: &QueryParams) -> Result<Value> {
        self.answer("availability_times", None, params_value(params))
    }

    async fn appointment_types(&self) -> Result<Value> {
        self.answer("appointment_types", None, Value::Null)
    }
}
