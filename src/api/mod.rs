//! Client for the crowdfunding REST backend. Every endpoint answers with a
//! `{ success, data, message }` envelope. Only the authentication surface the
//! access core depends on lives here: login, and bearer-authenticated reads
//! that sign the user out when the backend rejects the token.
//!
//! Request payloads carry credentials and bearer tokens; never log them.

mod client;
mod envelope;
mod error;

pub use client::{ApiClient, Credentials, DEFAULT_TIMEOUT};
pub use envelope::Envelope;
pub use error::ApiError;
