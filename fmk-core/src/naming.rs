// SPDX-License-Identifier: AGPL-3.0-or-later
//! Name splitting and collision candidates

use crate::error::{FmkError, FmkResult};

/// Split a file name into stem and extension.
///
/// The extension keeps its leading dot. Leading dots of hidden files do not
/// start an extension: `.bashrc` has none, `archive.tar.gz` ends in `.gz`.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Lowercased extension including the dot, or empty
pub fn extension_of(name: &str) -> String {
    split_name(name).1.to_lowercase()
}

/// The `attempt`-th candidate for placing `name` in a directory.
///
/// Attempt 0 is the name itself. Files get the counter before their
/// extension (`a_1.txt`), directories get it appended (`photos_1`).
pub fn candidate_name(name: &str, is_file: bool, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    if is_file {
        let (stem, ext) = split_name(name);
        format!("{stem}_{attempt}{ext}")
    } else {
        format!("{name}_{attempt}")
    }
}

/// Check that `name` is a single path component
pub fn validate_component(name: &str) -> FmkResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FmkError::InvalidPath(format!("invalid name: {name:?}")));
    }
    if name.contains('/') || (cfg!(windows) && name.contains('\\')) {
        return Err(FmkError::InvalidPath(format!(
            "name must not contain a path separator: {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("a.txt"), ("a", ".txt"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name("..hidden"), ("..hidden", ""));
        assert_eq!(split_name(".config.toml"), (".config", ".toml"));
        assert_eq!(split_name("trailing."), ("trailing", "."));
        assert_eq!(split_name(""), ("", ""));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Photo.JPG"), ".jpg");
        assert_eq!(extension_of("Makefile"), "");
    }

    #[test]
    fn test_candidate_name_file() {
        assert_eq!(candidate_name("a.txt", true, 0), "a.txt");
        assert_eq!(candidate_name("a.txt", true, 1), "a_1.txt");
        assert_eq!(candidate_name("a.txt", true, 2), "a_2.txt");
        assert_eq!(candidate_name("notes", true, 3), "notes_3");
        assert_eq!(candidate_name(".env", true, 1), ".env_1");
    }

    #[test]
    fn test_candidate_name_directory() {
        assert_eq!(candidate_name("photos.d", false, 0), "photos.d");
        assert_eq!(candidate_name("photos.d", false, 1), "photos.d_1");
    }

    #[test]
    fn test_validate_component() {
        assert!(validate_component("new.txt").is_ok());
        assert!(validate_component("").is_err());
        assert!(validate_component("..").is_err());
        assert!(validate_component("a/b").is_err());
    }
}
