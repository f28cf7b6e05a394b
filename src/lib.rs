//! fitflow - Progressive training companion
//!
//! Guides a user through a multi-week, three-phase workout program
//! (warm-up / main training / cool-down), persists progress locally and
//! pushes completed workouts to a remote CRUD service when reachable.

pub mod catalog;
pub mod models;
pub mod server;
pub mod session;
pub mod store;
pub mod sync;
pub mod timer;
pub mod tui;

pub use store::ProgressStore;
