/*!
 * Monitoring Module
 * Tracing initialization for binaries
 */

pub mod tracer;

pub use tracer::init_tracing;
