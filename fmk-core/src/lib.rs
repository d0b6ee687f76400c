// SPDX-License-Identifier: AGPL-3.0-or-later
//! File Manager Kit Core
//!
//! Types, state and the filesystem boundary shared by the engine and its
//! front ends.

pub mod backend;
pub mod config;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod mime;
pub mod naming;
pub mod platform;
pub mod state;

pub use backend::{FileSystem, VolumeInfo};
pub use config::EngineConfig;
pub use entry::{CurrentDirectory, DirectoryEntry, DirectoryListing, FileInfo, RecentFile};
pub use error::{ErrorKind, FmkError, FmkResult};
pub use metadata::{EntryKind, Metadata, Permissions};
pub use state::DirectoryState;
