//! Data models for the household inventory.
//!
//! - `Product`, `Unit`: the tracked products as the server returns them
//! - `ProductForm`, `NewProduct`, `ProductEdit`, `ProductPatch`: create and
//!   partial-update inputs with client-side validation
//! - `Credentials`, `TokenPair`: authentication request/response bodies

pub mod auth;
pub mod product;

pub use auth::{Credentials, TokenPair};
pub use product::{NewProduct, Product, ProductEdit, ProductForm, ProductPatch, Unit, ValidationError};
