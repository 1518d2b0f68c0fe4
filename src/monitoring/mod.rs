/*!
 * Monitoring Module
 * Structured logging for the coordinator and its workers
 */

mod tracer;

pub use tracer::{init_tracing, init_tracing_with_default, span_run, TRACE_JSON_ENV};
