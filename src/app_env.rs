/// URL for accessing the PostgreSQL database holding the todo_item table
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. For formatting info, see [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Socket address the HTTP server binds to. Falls back to [DEFAULT_LISTEN_ADDRESS] when unset.
pub const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:8080";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";
