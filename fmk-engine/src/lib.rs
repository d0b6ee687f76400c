// SPDX-License-Identifier: AGPL-3.0-or-later
//! File-management engine for File Manager Kit
//!
//! Browses a directory tree with a current-directory cursor, performs CRUD
//! operations with backup-on-overwrite, resolves name collisions on copy and
//! move, and runs bounded name searches. All OS access goes through
//! [`fmk_core::FileSystem`]; [`LocalFileSystem`] is the real one.

pub mod api;
mod local;
pub mod manager;

pub use api::{Payload, Request, Response};
pub use local::LocalFileSystem;
pub use manager::{FileContent, FileManager, WriteOutcome};

pub use fmk_search::{SearchOutcome, SearchResult};
