//! Product synchronization between the in-memory list and the API.
//!
//! The list lives only for the running session and is rebuilt from the
//! server on every successful listing.

pub mod list;
pub mod products;

pub use list::ProductList;
pub use products::ProductSync;
