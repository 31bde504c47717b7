//! Route table: one composed tower service per method and resource.
//!
//! Every business route is `Recover(Validate(handler))`. `OPTIONS` on any resource is
//! answered as a CORS preflight without reaching a handler.

use std::convert::Infallible;
use std::future::Future;

use tower::util::BoxCloneSyncService;
use tower::{service_fn, ServiceBuilder, ServiceExt};

use appointsync_core::response::ResponseEnvelope;
use appointsync_core::schema::RequestBody;

use crate::handlers::{appointments, search, HandlerError};
use crate::pipeline::{InboundEvent, RecoverLayer, Validated, ValidationLayer};
use crate::response::{make_response, not_found};
use crate::state::AppState;

type Route = BoxCloneSyncService<InboundEvent, ResponseEnvelope, Infallible>;

#[derive(Clone)]
pub struct Routes {
    create: Route,
    edit: Route,
    cancel: Route,
    search: Route,
    user_appointments: Route,
    appointment_types: Route,
}

impl Routes {
    pub fn new(state: AppState) -> Self {
        Self {
            create: validated_route(&state, appointments::create),
            edit: validated_route(&state, appointments::edit),
            cancel: validated_route(&state, appointments::cancel),
            search: validated_route(&state, search::search),
            user_appointments: validated_route(&state, search::user_appointments),
            appointment_types: {
                let state = state.clone();
                BoxCloneSyncService::new(ServiceBuilder::new().layer(RecoverLayer).service(
                    service_fn(move |event: InboundEvent| {
                        search::appointment_types(state.clone(), event)
                    }),
                ))
            },
        }
    }

    fn select(&self, method: &str, resource: &str) -> Option<Route> {
        let route = match (method, resource) {
            ("POST", "/") => &self.create,
            ("PUT", "/") => &self.edit,
            ("POST", "/cancel") => &self.cancel,
            ("POST", "/availability") => &self.search,
            ("POST", "/user-appointments") => &self.user_appointments,
            ("GET", "/appointment-types") => &self.appointment_types,
            _ => return None,
        };
        Some(route.clone())
    }

    /// Answers `event` with the envelope of its route. Never fails.
    pub fn dispatch(&self, event: InboundEvent) -> impl Future<Output = ResponseEnvelope> + Send + 'static {
        let (method, resource) = event.route();
        tracing::info!(
            %method,
            resource,
            request_id = event.request_id().unwrap_or("-"),
            "Request received"
        );

        let preflight = method == "OPTIONS";
        let route = self.select(&method, resource);

        async move {
            if preflight {
                return make_response(200, None);
            }
            match route {
                Some(route) => match route.oneshot(event).await {
                    Ok(envelope) => envelope,
                    Err(never) => match never {},
                },
                None => not_found("Resource not found", None),
            }
        }
    }
}

fn validated_route<T, F, Fut>(state: &AppState, handler: F) -> Route
where
    T: RequestBody + Send + 'static,
    F: Fn(AppState, Validated<T>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<ResponseEnvelope, HandlerError>> + Send + 'static,
{
    let state = state.clone();
    let service = ServiceBuilder::new()
        .layer(RecoverLayer)
        .layer(ValidationLayer::<T>::new())
        .service(service_fn(move |request: Validated<T>| {
            handler(state.clone(), request)
        }));
    BoxCloneSyncService::new(service)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use appointsync_core::storage::StoreError;

    use super::*;
    use crate::handlers::testing::{app_state, authorizer, event, memory_store};
    use crate::pipeline::UNEXPECTED_ERROR;
    use crate::scheduling::testing::FakeScheduling;
    use crate::storage::testing::ScriptedStore;

    fn routes(fake: Arc<FakeScheduling>) -> Routes {
        Routes::new(app_state(fake, memory_store()))
    }

    async fn send(routes: &Routes, method: &str, resource: &str, body: Option<Value>) -> ResponseEnvelope {
        routes.dispatch(event(method, resource, authorizer(), body)).await
    }

    #[tokio::test]
    async fn test_preflight_on_any_resource() {
        let fake = Arc::new(FakeScheduling::default());
        let routes = routes(fake.clone());

        let envelope = send(&routes, "OPTIONS", "/cancel", None).await;

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, "null");
        assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let routes = routes(Arc::new(FakeScheduling::default()));

        let envelope = send(&routes, "DELETE", "/", None).await;

        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.json_body().unwrap()["error"], "Resource not found");
    }

    #[tokio::test]
    async fn test_each_route_reaches_its_handler() {
        let cases = [
            (
                "POST",
                "/",
                Some(json!({"datetime": "2026-11-02T10:00", "calendarID": 1, "appointmentTypeID": 2})),
                "create_appointment",
                201,
            ),
            (
                "put",
                "/",
                Some(json!({"action": "update", "appointmentId": 5, "notes": "x"})),
                "update_appointment",
                200,
            ),
            (
                "POST",
                "/cancel",
                Some(json!({"appointmentId": "5"})),
                "cancel_appointment",
                200,
            ),
            (
                "POST",
                "/availability",
                Some(json!({"resource": "availability", "date": "2026-11-05"})),
                "availability_times",
                200,
            ),
            (
                "POST",
                "/user-appointments",
                Some(json!({})),
                "list_appointments",
                200,
            ),
            ("GET", "/appointment-types", None, "appointment_types", 200),
        ];

        for (method, resource, body, operation, status) in cases {
            let fake = Arc::new(FakeScheduling::returning(Ok(json!([{"id": 1}]))));
            let routes = routes(fake.clone());

            let envelope = send(&routes, method, resource, body).await;

            assert_eq!(envelope.status_code, status, "{method} {resource}");
            assert_eq!(fake.requests()[0].operation, operation);
        }
    }

    #[tokio::test]
    async fn test_invalid_body_never_reaches_handler() {
        let fake = Arc::new(FakeScheduling::default());
        let routes = routes(fake.clone());

        let envelope = send(&routes, "POST", "/cancel", Some(json!({"reason": "late"}))).await;

        assert_eq!(envelope.status_code, 406);
        assert_eq!(
            envelope.json_body().unwrap()["error"],
            "appointmentId Field required"
        );
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_becomes_generic_500() {
        let fake = Arc::new(FakeScheduling::default());
        let store = Arc::new(ScriptedStore::failing(StoreError::ConnectionFailed(
            "dynamodb unreachable".to_string(),
        )));
        let routes = Routes::new(app_state(fake, store));

        let envelope = send(
            &routes,
            "POST",
            "/",
            Some(json!({"datetime": "2026-11-02T10:00", "calendarID": 1, "appointmentTypeID": 2})),
        )
        .await;

        assert_eq!(envelope.status_code, 500);
        let body = envelope.json_body().unwrap();
        assert_eq!(body["error"], UNEXPECTED_ERROR);
        assert!(!envelope.body.contains("dynamodb unreachable"));
    }
}
