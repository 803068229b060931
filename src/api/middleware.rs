use std::time::Instant;

use actix_web::{Error, body::MessageBody, dev::{ServiceRequest, ServiceResponse}, middleware::Next};
use tracing::debug;

/**
 * Logs method, path with query, status and duration of every request under the `performance` target.
 */
pub async fn timing_middleware(request: ServiceRequest, next: Next<impl MessageBody>) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let started = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let response = next.call(request).await;
    let status = response.as_ref().map_or(500, |service_response| service_response.status().as_u16());
    debug!(target: "performance", method = %method, uri = %uri, status, elapsed_ms = %started.elapsed().as_millis(), "Request processed");
    response
}
