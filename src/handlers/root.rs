use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Observability API 👋
Version: {version}

Available endpoints:
  - GET    /health             - Health of the service and its dependencies
  - GET    /metrics            - Prometheus text exposition
  - POST   /users/register     - Register a user (records business metrics)
  - POST   /orders             - Process an order (records processing time)
  - GET    /simulate/load      - Generate synthetic load
  - GET    /simulate/error     - Generate a synthetic failure (always 500)
  - GET    /analytics/metrics  - Human-readable summary of current metrics

This API demonstrates request instrumentation, business metrics and
health reporting with an in-process metrics registry.
"#
    )
}
