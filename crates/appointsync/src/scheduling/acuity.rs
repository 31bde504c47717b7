use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use serde_json::Value;

use appointsync_core::appointments::QueryParams;

use super::{Result, SchedulingApi, UpstreamError};

#[derive(Debug, Clone)]
pub struct AcuitySettings {
    pub base_url: String,
    pub user_id: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// [`SchedulingApi`] over the Acuity REST API, authenticated with basic auth.
#[derive(Debug, Clone)]
pub struct AcuityClient {
    http: Client,
    settings: AcuitySettings,
}

impl AcuityClient {
    pub fn new(settings: AcuitySettings) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("appointsync/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self { http, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    /// `/appointments/{id}[/action]` with the id percent-encoded as a single segment.
    fn appointment_url(&self, appointment_id: &str, action: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                UpstreamError::Transport(format!("{} cannot be a base URL", self.settings.base_url))
            })?;
            segments.pop_if_empty().push("appointments").push(appointment_id);
            segments.extend(action);
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.settings.user_id, Some(&self.settings.api_key))
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Value> {
        let response = self.authorized(request).send().await.map_err(|e| {
            tracing::warn!(operation, error = %e, "Scheduling request failed");
            UpstreamError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
            tracing::warn!(operation, status = status.as_u16(), "Scheduling request rejected");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SchedulingApi for AcuityClient {
    async fn create_appointment(&self, payload: &Value) -> Result<Value> {
        let request = self.http.post(self.url("/appointments")).json(payload);
        self.send("create_appointment", request).await
    }

    async fn reschedule_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        let url = self.appointment_url(appointment_id, Some("reschedule"))?;
        self.send("reschedule_appointment", self.http.put(url).json(payload))
            .await
    }

    async fn update_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        let url = self.appointment_url(appointment_id, None)?;
        self.send("update_appointment", self.http.put(url).json(payload))
            .await
    }

    async fn cancel_appointment(&self, appointment_id: &str, payload: &Value) -> Result<Value> {
        let url = self.appointment_url(appointment_id, Some("cancel"))?;
        self.send("cancel_appointment", self.http.put(url).json(payload))
            .await
    }

    async fn list_appointments(&self, params: &QueryParams) -> Result<Value> {
        let request = self.http.get(self.url("/appointments")).query(params);
        self.send("list_appointments", request).await
    }

    async fn availability_times(&self, params: &QueryParams) -> Result<Value> {
        let request = self.http.get(self.url("/availability/times")).query(params);
        self.send("availability_times", request).await
    }

    async fn appointment_types(&self) -> Result<Value> {
        let request = self.http.get(self.url("/appointment-types"));
        self.send("appointment_types", request).await
    }
}
