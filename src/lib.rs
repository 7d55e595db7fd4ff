//! # treepack
//!
//! Directory-tree packaging with reversible installs.
//!
//! A filesystem subtree is captured into a gzip-compressed tar archive,
//! later recreated under a different root without clobbering existing files,
//! and can be removed again without touching anything the archive did not
//! install.
//!
//! ## Key modules
//!
//! - [`walk`]: enumerates a subtree into the ordered entry sequence shared by
//!   the writer, extractor, and remover.
//! - [`archive`]: all-or-nothing archive creation.
//! - [`extract`]: two-pass (validate, then apply) extraction that never
//!   overwrites a destination file.
//! - [`remove`]: reverse-order removal with safe directory pruning.
//! - [`env`]: shell environment export generation for package environments.
//!
//! All operations are synchronous and run to completion or return a terminal
//! error. No locking is provided: concurrent invocations against overlapping
//! roots or the same archive must be serialized by the caller.

pub mod archive;
pub mod cli;
pub mod env;
pub mod error;
pub mod extract;
pub mod fsx;
pub mod remove;
pub mod walk;

pub use error::{PackError, Result};

pub use archive::archive;
pub use extract::unpack;
pub use fsx::{exists, is_empty_or_absent};
pub use remove::remove;
