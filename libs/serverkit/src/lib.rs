//! Shared web kit for Taskdeck modules.
//!
//! Keeps the pieces every module needs but none should own: RFC 9457
//! problem responses, Server-Sent-Event stream helpers, and the identity
//! port with its axum extractor.

pub mod auth;
pub mod problem;
pub mod sse;

pub use auth::{AuthError, CurrentUser, IdentityProvider, SessionContext};
pub use problem::{Problem, ProblemResponse};
