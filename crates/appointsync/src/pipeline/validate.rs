use std::marker::PhantomData;
use std::task::{Context, Poll};

use appointsync_core::schema::{format_violations, parse_body, RequestBody};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tower::{Layer, Service};

use appointsync_core::response::ResponseEnvelope;

use super::InboundEvent;
use crate::response::not_acceptable;

/// A request whose body passed validation.
#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub event: InboundEvent,
    pub body: T,
}

/// Validates the request body against `T::schema()` before the inner service runs.
///
/// Unparseable bodies and schema violations are answered with a 406 envelope and
/// the inner service is not called. Anything the inner service returns, including
/// errors, passes through untouched.
pub struct ValidationLayer<T> {
    _body: PhantomData<fn() -> T>,
}

impl<T> ValidationLayer<T> {
    pub fn new() -> Self {
        Self { _body: PhantomData }
    }
}

impl<T> Default for ValidationLayer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ValidationLayer<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<S, T> Layer<S> for ValidationLayer<T> {
    type Service = Validate<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        Validate {
            inner,
            _body: PhantomData,
        }
    }
}

pub struct Validate<S, T> {
    inner: S,
    _body: PhantomData<fn() -> T>,
}

impl<S: Clone, T> Clone for Validate<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _body: PhantomData,
        }
    }
}

/// Parses and validates the body of `event`.
fn parse_event<T: RequestBody>(event: &InboundEvent) -> Result<T, ResponseEnvelope> {
    let invalid_input = || not_acceptable("Invalid input", None);

    let text = event.body_text().ok_or_else(invalid_input)?;
    let value: Value = serde_json::from_str(&text).map_err(|_| invalid_input())?;
    if !value.is_object() {
        return Err(invalid_input());
    }

    parse_body::<T>(&value).map_err(|violations| {
        tracing::error!(violations = ?violations, "Request body failed validation");
        not_acceptable(&format_violations(&violations), None)
    })
}

impl<S, T> Service<InboundEvent> for Validate<S, T>
where
    S: Service<Validated<T>, Response = ResponseEnvelope> + Clone + Send + 'static,
    S::Future: Send + 'static,
    T: RequestBody + Send + 'static,
{
    type Response = ResponseEnvelope;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<ResponseEnvelope, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, event: InboundEvent) -> Self::Future {
        let body = match parse_event::<T>(&event) {
            Ok(body) => body,
            Err(envelope) => return Box::pin(async move { Ok(envelope) }),
        };

        // Use the service that was polled ready and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move { inner.call(Validated { event, body }).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use appointsync_core::schema::{Field, FieldType, Schema};
    use serde::Deserialize;
    use serde_json::json;
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    use crate::response::make_response;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Booking {
        appointment_id: i64,
        action: String,
    }

    impl RequestBody for Booking {
        fn schema() -> Schema {
            Schema::new(vec![
                Field::required("appointmentId", FieldType::Integer),
                Field::required("action", FieldType::String).one_of(&["update", "reschedule"]),
            ])
        }
    }

    fn event(body: Option<&str>) -> InboundEvent {
        InboundEvent {
            http_method: "PUT".to_string(),
            body: body.map(str::to_string),
            ..Default::default()
        }
    }

    fn counting_service(
        calls: Arc<AtomicUsize>,
    ) -> impl Service<InboundEvent, Response = ResponseEnvelope, Error = Infallible> + Clone {
        ServiceBuilder::new()
            .layer(ValidationLayer::<Booking>::new())
            .service(service_fn(move |request: Validated<Booking>| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(make_response(
                        200,
                        Some(json!({
                            "id": request.body.appointment_id,
                            "action": request.body.action,
                        })),
                    ))
                }
            }))
    }

    fn error_text(envelope: &ResponseEnvelope) -> String {
        envelope.json_body().unwrap()["error"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler_once_and_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = counting_service(calls.clone());

        let envelope = service
            .oneshot(event(Some(r#"{"appointmentId": "1234", "action": "update"}"#)))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            envelope,
            make_response(200, Some(json!({"id": 1234, "action": "update"})))
        );
    }

    #[tokio::test]
    async fn test_missing_required_field_names_the_field() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = counting_service(calls.clone());

        let envelope = service
            .oneshot(event(Some(r#"{"action": "update"}"#)))
            .await
            .unwrap();

        assert_eq!(envelope.status_code, 406);
        assert_eq!(error_text(&envelope), "appointmentId Field required");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_literal_is_not_acceptable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = counting_service(calls.clone());

        let envelope = service
            .oneshot(event(Some(r#"{"appointmentId": 1, "action": "delete"}"#)))
            .await
            .unwrap();

        assert_eq!(envelope.status_code, 406);
        assert!(error_text(&envelope).starts_with("action "));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_violations_are_joined() {
        let service = counting_service(Arc::new(AtomicUsize::new(0)));

        let envelope = service.oneshot(event(Some("{}"))).await.unwrap();

        assert_eq!(
            error_text(&envelope),
            "appointmentId Field required. action Field required"
        );
    }

    #[tokio::test]
    async fn test_unparseable_bodies_are_invalid_input() {
        for body in [None, Some("{not json"), Some("[1, 2]"), Some("\"text\"")] {
            let calls = Arc::new(AtomicUsize::new(0));
            let service = counting_service(calls.clone());

            let envelope = service.oneshot(event(body)).await.unwrap();

            assert_eq!(envelope.status_code, 406, "body {body:?}");
            assert_eq!(error_text(&envelope), "Invalid input");
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_handler_errors_pass_through() {
        let service = ServiceBuilder::new()
            .layer(ValidationLayer::<Booking>::new())
            .service(service_fn(|_: Validated<Booking>| async {
                Err::<ResponseEnvelope, _>("handler failed")
            }));

        let result = service
            .oneshot(event(Some(r#"{"appointmentId": 1, "action": "update"}"#)))
            .await;

        assert_eq!(result, Err("handler failed"));
    }
}
