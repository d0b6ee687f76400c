// SPDX-License-Identifier: AGPL-3.0-or-later
//! Extension-based MIME guessing

use crate::naming;
use std::path::Path;

/// Guess a MIME type from the file name's extension
pub fn guess(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    let ext = naming::extension_of(name);
    let mime = match ext.strip_prefix('.')? {
        // Text
        "txt" | "text" | "log" | "conf" | "cfg" | "ini" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",
        "py" => "text/x-python",
        "rs" => "text/x-rust",
        "c" | "h" => "text/x-c",
        "cpp" | "cc" | "hpp" => "text/x-c++",
        "java" => "text/x-java",
        "sh" | "bash" => "text/x-shellscript",
        "yaml" | "yml" => "text/yaml",
        "rtf" => "text/rtf",
        "json" => "application/json",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",

        // Audio / video
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",

        // Documents and archives
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "exe" | "dll" | "so" | "bin" => "application/octet-stream",
        _ => return None,
    };
    Some(mime)
}

/// Whether content of this type may be surfaced as text
pub fn is_textual(mime: &str) -> bool {
    mime.starts_with("text/") || mime.starts_with("application/json")
}
