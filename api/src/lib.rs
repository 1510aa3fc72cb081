//! Supplier Classifier API Module
//!
//! The API module exposes training, classification and evaluation of the
//! supplier model over HTTP.

pub mod error;
pub mod handlers;
pub mod models;
pub mod server;

pub use error::ApiError;
pub use handlers::*;
pub use models::*;
pub use server::*;
