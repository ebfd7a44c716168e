pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;

pub use client::{AdminBackend, AdminClient, ApiFuture, DEFAULT_PAGE_LIMIT};
pub use envelope::LoginData;
pub use error::{ApiError, AuthFailure, TransportError};
pub use http::{AuthTransport, RawResponse, RequestOptions};
