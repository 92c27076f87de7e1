mod formatter;

pub use formatter::{RouteStep, TraceFormatter};
