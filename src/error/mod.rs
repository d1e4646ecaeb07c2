//! Error taxonomy.
//!
//! Only [`ConfigError`] and setup failures reach the top level as
//! [`AppError`]. [`NetworkError`] and [`CheckError`] are per-request values
//! that get recorded on outcomes and folded into the run summary.
mod app;
mod check;
mod config;
mod http;
mod metrics;
mod network;
mod validation;

pub use app::{AppError, AppResult};
pub use check::CheckError;
pub use config::ConfigError;
pub use http::HttpError;
pub use metrics::MetricsError;
pub use network::{NetworkError, NetworkErrorKind};
pub use validation::ValidationError;
