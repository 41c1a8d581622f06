//! Default collaborators for project states.
//!
//! These are the real implementations behind the service traits: HTTP
//! downloads, archive extraction, subprocesses and git checkouts.

pub mod build_env;
pub mod git;
pub mod http;
pub mod runner;
pub mod unpack;

pub use build_env::NoopBuildEnvironment;
pub use git::GitCheckout;
pub use http::HttpDownloader;
pub use runner::SubprocessRunner;
pub use unpack::ArchiveUnpacker;
