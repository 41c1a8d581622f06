//! Core data structures for quay.
//!
//! This module contains the foundational value types:
//! - Links (where a project lives)
//! - Parsed requirements (what was asked for)
//! - Wheel filenames and compatibility tags
//! - Distribution metadata
//! - Install schemes

pub mod link;
pub mod metadata;
pub mod requirement;
pub mod scheme;
pub mod wheel;

pub use link::Link;
pub use metadata::Metadata;
pub use requirement::{
    canonicalize_name, parse_requirement, ParsedRequirement, Requirement, RequirementOptions,
};
pub use scheme::Scheme;
pub use wheel::{Tag, TargetTags, WheelFilename, WheelInfo};
