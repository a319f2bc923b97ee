//! Client-side helpers used by the host application's front end.
//!
//! Independent of the build pipeline; the pipeline merely deposits the
//! compiled assets these helpers ship with.

pub mod password;
pub mod xhr;

pub use password::{generate, generate_with, ByteSource};
pub use xhr::{FailureKind, XhrErrorResponse};
