//! Core LMS client library (config, session credentials, authenticated HTTP, API wrappers).

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
