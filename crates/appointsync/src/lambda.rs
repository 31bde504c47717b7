//! AWS Lambda entry point.

use lambda_runtime::{service_fn, Error, LambdaEvent};

use appointsync_core::response::ResponseEnvelope;

use crate::pipeline::InboundEvent;
use crate::routes::Routes;

/// Answers one gateway invocation.
pub async fn handle(routes: &Routes, event: LambdaEvent<InboundEvent>) -> Result<ResponseEnvelope, Error> {
    let LambdaEvent { payload, context } = event;
    tracing::debug!(aws_request_id = %context.request_id, "Invocation received");
    Ok(routes.dispatch(payload).await)
}

/// Polls the Lambda runtime API until the process is stopped.
pub async fn run(routes: Routes) -> Result<(), Error> {
    tracing::info!("Starting Lambda runtime");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<InboundEvent>| {
        let routes = routes.clone();
        async move { handle(&routes, event).await }
    }))
    .await
}
