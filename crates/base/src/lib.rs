//! Shared plumbing for the capture crates: logging setup, cooperative
//! cancellation and the caller-owned execution context.

pub mod cancel;
pub use cancel::*;

pub mod logging;
pub use logging::{StdoutLogger, init_logger, init_stdout_logger};

pub mod scheduler;
pub use scheduler::*;
