//! Filesystem scanning: which paths are eligible and how roots are walked.
//!
//! - [`filter`]: substring exclusions, operator-supplied and fixed
//! - [`walker`]: physical, non-symlink-following traversal of scan roots

pub mod filter;
pub mod walker;

pub use filter::{ExclusionSet, SYSTEM_EXCLUSIONS};
pub use walker::{Candidate, TreeWalker, WalkItem};
