//! Remote CRUD service - programs, sessions, completions, settings, stats
//!
//! The client treats this as an opaque collaborator; it can also be run
//! locally with the in-memory backing via `fitflow serve`.

pub mod error;
pub mod routes;
pub mod storage;

pub use error::ApiError;
pub use routes::{router, serve};
pub use storage::{MemStorage, Storage};
