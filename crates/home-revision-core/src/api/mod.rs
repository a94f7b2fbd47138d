//! REST API client module for the inventory service.
//!
//! This module provides the `ApiClient` for the token, registration and
//! product CRUD endpoints, and the `ApiError` taxonomy every controller
//! reports through.
//!
//! Product endpoints use JWT bearer authentication with the access token
//! issued by `/api/users/token/`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
