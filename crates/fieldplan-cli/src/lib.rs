//! Command line front end for the field coverage planner.
//!
//! Reads JSON requests shaped like the web API, applies the caller-side
//! input contract and resource limits, then hands off to `fieldplan-core`.

pub mod config;
pub mod requests;
pub mod validate;

pub use config::Config;
pub use requests::{MetricsRequest, RouteResponse, VisualizeRequest};
