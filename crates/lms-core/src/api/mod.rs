//! Typed wrappers over the learning platform's REST endpoints.
//!
//! Every call goes through [`crate::http::AuthClient`], so each one gets the
//! bearer token and the refresh protocol for free.

pub mod admin;
pub mod auth;
pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod users;
