// SPDX-License-Identifier: AGPL-3.0-or-later
//! Named-operation request surface
//!
//! A presentation layer sends a [`Request`] (tagged by `op`) and always gets a
//! [`Response`] back: `{"success": true, ...payload}` on success, or
//! `{"success": false, "error": "...", "kind": "..."}` on failure.

use fmk_core::{
    entry::{CurrentDirectory, DirectoryListing, FileInfo, RecentFile},
    error::{ErrorKind, FmkError, FmkResult},
    EntryKind, VolumeInfo,
};
use fmk_search::SearchOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::manager::{FileContent, FileManager};

/// One engine operation and its arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GetCurrentDirectory,
    ListDirectory {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    NavigateToParent,
    CreateDirectory {
        name: String,
    },
    CreateFile {
        name: String,
        #[serde(default)]
        content: String,
    },
    ReadFile {
        path: PathBuf,
    },
    WriteFile {
        path: PathBuf,
        content: String,
    },
    DeleteItem {
        path: PathBuf,
    },
    RenameItem {
        old_path: PathBuf,
        new_name: String,
    },
    CopyItem {
        source_path: PathBuf,
        destination_dir: PathBuf,
    },
    MoveItem {
        source_path: PathBuf,
        destination_dir: PathBuf,
    },
    GetFileInfo {
        path: PathBuf,
    },
    SearchFiles {
        pattern: String,
        #[serde(default)]
        search_path: Option<PathBuf>,
        #[serde(default)]
        glob: bool,
    },
    GetRecentFiles,
    GetDriveInfo,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetCurrentDirectory => "get_current_directory",
            Request::ListDirectory { .. } => "list_directory",
            Request::NavigateToParent => "navigate_to_parent",
            Request::CreateDirectory { .. } => "create_directory",
            Request::CreateFile { .. } => "create_file",
            Request::ReadFile { .. } => "read_file",
            Request::WriteFile { .. } => "write_file",
            Request::DeleteItem { .. } => "delete_item",
            Request::RenameItem { .. } => "rename_item",
            Request::CopyItem { .. } => "copy_item",
            Request::MoveItem { .. } => "move_item",
            Request::GetFileInfo { .. } => "get_file_info",
            Request::SearchFiles { .. } => "search_files",
            Request::GetRecentFiles => "get_recent_files",
            Request::GetDriveInfo => "get_drive_info",
        }
    }
}

/// Success payload of a request
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    CurrentDirectory(CurrentDirectory),
    Listing(DirectoryListing),
    Content(FileContent),
    Info(FileInfo),
    Search(SearchOutcome),
    RecentFiles {
        files: Vec<RecentFile>,
    },
    Drives {
        drives: Vec<VolumeInfo>,
    },
    Message {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
        #[serde(skip_serializing_if = "Option::is_none")]
        backup: Option<PathBuf>,
    },
}

impl Payload {
    fn message(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Payload::Message {
            message: message.into(),
            path,
            backup: None,
        }
    }
}

/// Envelope returned for every request
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl Response {
    pub fn ok(payload: Payload) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
            kind: None,
        }
    }

    pub fn failure(error: impl Into<String>, kind: Option<ErrorKind>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.into()),
            kind,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"error":"response serialization failed: {e}"}}"#)
        })
    }
}

impl From<FmkResult<Payload>> for Response {
    fn from(result: FmkResult<Payload>) -> Self {
        match result {
            Ok(payload) => Response::ok(payload),
            Err(e) => Response::failure(e.to_string(), Some(e.kind())),
        }
    }
}

impl FileManager {
    /// Run one request; failures are reported in the response, never raised
    pub async fn dispatch(&self, request: Request) -> Response {
        let op = request.name();
        tracing::debug!("Dispatching {}", op);

        let result = self.execute(request).await;
        if let Err(e) = &result {
            tracing::debug!("{} failed: {}", op, e);
        }
        Response::from(result)
    }

    /// Parse a JSON request and run it
    pub async fn dispatch_json(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => Response::failure(format!("Invalid request: {e}"), None),
        }
    }

    async fn execute(&self, request: Request) -> FmkResult<Payload> {
        let payload = match request {
            Request::GetCurrentDirectory => {
                Payload::CurrentDirectory(self.current_directory().await)
            }
            Request::ListDirectory { path } => {
                Payload::Listing(self.list_directory(path.as_deref()).await?)
            }
            Request::NavigateToParent => Payload::Listing(self.navigate_to_parent().await?),
            Request::CreateDirectory { name } => {
                let path = self.create_directory(&name).await?;
                Payload::message(format!("Directory '{name}' created"), Some(path))
            }
            Request::CreateFile { name, content } => {
                let path = self.create_file(&name, &content).await?;
                Payload::message(format!("File '{name}' created"), Some(path))
            }
            Request::ReadFile { path } => Payload::Content(self.read_file(&path).await?),
            Request::WriteFile { path, content } => {
                let outcome = self.write_file(&path, &content).await?;
                Payload::Message {
                    message: "File saved".to_string(),
                    path: Some(outcome.path),
                    backup: outcome.backup,
                }
            }
            Request::DeleteItem { path } => {
                let message = match self.delete_item(&path).await? {
                    EntryKind::Directory => "Directory deleted",
                    _ => "File deleted",
                };
                Payload::message(message, Some(path))
            }
            Request::RenameItem { old_path, new_name } => {
                let path = self.rename_item(&old_path, &new_name).await?;
                Payload::message("Renamed", Some(path))
            }
            Request::CopyItem { source_path, destination_dir } => {
                let path = self.copy_item(&source_path, &destination_dir).await?;
                Payload::message(format!("Copied to: {}", path.display()), Some(path))
            }
            Request::MoveItem { source_path, destination_dir } => {
                let path = self.move_item(&source_path, &destination_dir).await?;
                Payload::message(format!("Moved to: {}", path.display()), Some(path))
            }
            Request::GetFileInfo { path } => Payload::Info(self.get_file_info(&path).await?),
            Request::SearchFiles { pattern, search_path, glob } => {
                Payload::Search(self.search_files(&pattern, search_path.as_deref(), glob).await?)
            }
            Request::GetRecentFiles => Payload::RecentFiles {
                files: self.get_recent_files().await,
            },
            Request::GetDriveInfo => Payload::Drives {
                drives: self.get_volume_info().await?,
            },
        };
        Ok(payload)
    }
}

impl From<&FmkError> for Response {
    fn from(err: &FmkError) -> Self {
        Response::failure(err.to_string(), Some(err.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_request_parsing() {
        let req: Request = serde_json::from_value(json!({"op": "list_directory"})).unwrap();
        assert_eq!(req, Request::ListDirectory { path: None });

        let req: Request = serde_json::from_value(json!({
            "op": "copy_item",
            "source_path": "/tmp/x/a.txt",
            "destination_dir": "/tmp/x"
        }))
        .unwrap();
        assert_eq!(req.name(), "copy_item");

        let req: Request =
            serde_json::from_value(json!({"op": "create_file", "name": "a.txt"})).unwrap();
        assert_eq!(
            req,
            Request::CreateFile { name: "a.txt".into(), content: String::new() }
        );
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(serde_json::from_value::<Request>(json!({"op": "format_disk"})).is_err());
    }

    #[test]
    fn test_success_envelope_is_flat() {
        let response = Response::ok(Payload::message("File saved", Some("/tmp/a".into())));
        let value: Value = serde_json::from_str(&response.to_json()).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["message"], json!("File saved"));
        assert_eq!(value["path"], json!("/tmp/a"));
        assert!(value.get("error").is_none());
        assert!(value.get("backup").is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let err = FmkError::TooLarge { path: "/big".into(), size: 6, limit: 5 };
        let value: Value = serde_json::from_str(&Response::from(&err).to_json()).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["kind"], json!("TooLarge"));
        assert!(value["error"].as_str().unwrap().contains("too large"));
    }
}
