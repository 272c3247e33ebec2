//! The task engine: batch and stream execution of pending work.
//!
//! [`run_batch`] fans a list of pending sources out over a scheduler and
//! fans the transformed results back into one pending list; [`run_stream`]
//! does the same continuously over a [`crate::core::Sequence`]. Both isolate
//! per-item failures; only timeouts (batch) and upstream sequence failures
//! (stream) are fatal.

mod batch;
mod config;
mod stream;

pub use batch::{run_batch, run_batch_map};
pub use config::RunConfig;
pub use stream::run_stream;
