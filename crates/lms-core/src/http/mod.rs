//! Authenticated HTTP transport.

mod client;
mod error;
mod request;

pub use client::{AuthClient, ClientSettings};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use request::ApiRequest;
