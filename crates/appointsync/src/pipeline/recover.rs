use std::convert::Infallible;
use std::fmt::{Debug, Display};
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use tower::{Layer, Service, ServiceExt};

use appointsync_core::response::ResponseEnvelope;

use super::InboundEvent;
use crate::response::internal_server_error;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Contact support";

/// Converts errors of the inner service into a generic 500 envelope.
///
/// The error detail is logged, never returned to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverLayer;

impl<S> Layer<S> for RecoverLayer {
    type Service = Recover<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Recover { inner }
    }
}

#[derive(Debug, Clone)]
pub struct Recover<S> {
    inner: S,
}

impl<S> Service<InboundEvent> for Recover<S>
where
    S: Service<InboundEvent, Response = ResponseEnvelope> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + Debug + Send,
{
    type Response = ResponseEnvelope;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<ResponseEnvelope, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Readiness of the inner service is awaited per call.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, event: InboundEvent) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let (method, resource) = event.route();
            let (method, resource) = (method, resource.to_string());
            let request_id = event.request_id().map(str::to_string);

            match inner.oneshot(event).await {
                Ok(envelope) => Ok(envelope),
                Err(error) => {
                    tracing::error!(
                        %method,
                        %resource,
                        request_id = request_id.as_deref().unwrap_or("-"),
                        error = %error,
                        details = ?error,
                        "Unhandled error"
                    );
                    Ok(internal_server_error(UNEXPECTED_ERROR, None))
                }
            }
        })
    }
}
