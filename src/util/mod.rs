//! Shared utilities

pub mod archive;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;
pub mod progress;
pub mod temp;

pub use config::Config;
pub use context::GlobalContext;
pub use diagnostic::Diagnostic;
pub use progress::Spinner;
pub use temp::TempDirectory;
