//! Floor Client - backend access for the floor engine
//!
//! [`FloorBackend`] is the set of backend operations the engine consumes;
//! [`HttpClient`] implements it over the REST API.

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use backend::FloorBackend;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use types::{LinkedPayment, LinkedPaymentEntry};

// Re-export shared types for convenience
pub use shared::ApiResponse;
