// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use chrono::{DateTime, Local, Utc};
use console::style;
use dialoguer::Confirm;
use fmk_core::{entry::DirectoryListing, EntryKind, FmkError, FmkResult};
use fmk_engine::FileManager;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Format a timestamp for display
fn format_time(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: u64, human: bool) -> String {
    if human {
        bytesize::ByteSize(size).to_string()
    } else {
        size.to_string()
    }
}

fn format_kind(is_directory: bool) -> String {
    if is_directory {
        style("d").cyan().to_string()
    } else {
        "-".to_string()
    }
}

/// Format permissions
fn format_permissions(mode: Option<u32>) -> String {
    match mode {
        Some(m) => {
            let r = if m & 0o400 != 0 { 'r' } else { '-' };
            let w = if m & 0o200 != 0 { 'w' } else { '-' };
            let x = if m & 0o100 != 0 { 'x' } else { '-' };
            let gr = if m & 0o040 != 0 { 'r' } else { '-' };
            let gw = if m & 0o020 != 0 { 'w' } else { '-' };
            let gx = if m & 0o010 != 0 { 'x' } else { '-' };
            let or = if m & 0o004 != 0 { 'r' } else { '-' };
            let ow = if m & 0o002 != 0 { 'w' } else { '-' };
            let ox = if m & 0o001 != 0 { 'x' } else { '-' };
            format!("{r}{w}{x}{gr}{gw}{gx}{or}{ow}{ox}")
        }
        None => "---------".to_string(),
    }
}

fn prompt_error(err: dialoguer::Error) -> FmkError {
    FmkError::Io(std::io::Error::other(err.to_string()))
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct FoundEntry {
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Path")]
    path: String,
}

#[derive(Tabled)]
struct VolumeRow {
    #[tabled(rename = "Volume")]
    name: String,
    #[tabled(rename = "Mounted on")]
    mountpoint: String,
    #[tabled(rename = "Type")]
    fstype: String,
    #[tabled(rename = "Size")]
    total: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Avail")]
    free: String,
    #[tabled(rename = "Use%")]
    percent: String,
}

fn print_listing(listing: &DirectoryListing, long: bool, all: bool, human: bool) {
    let visible = listing
        .items
        .iter()
        .filter(|e| all || !e.name.starts_with('.'));

    if long {
        let entries: Vec<LsEntry> = visible
            .map(|e| LsEntry {
                kind: format_kind(e.is_directory),
                size: format_size(e.size, human),
                modified: format_time(e.modified),
                name: e.name.clone(),
            })
            .collect();

        if entries.is_empty() {
            println!("(empty directory)");
        } else {
            println!("{}", Table::new(entries));
        }
    } else {
        let mut any = false;
        for entry in visible {
            any = true;
            if entry.is_directory {
                println!("{}/", style(&entry.name).cyan());
            } else {
                println!("{}", entry.name);
            }
        }
        if !any {
            println!("(empty directory)");
        }
    }
}

/// List directory contents
pub async fn ls(
    fm: &FileManager,
    path: Option<&Path>,
    long: bool,
    all: bool,
    human: bool,
) -> FmkResult<()> {
    let listing = fm.list_directory(path).await?;
    tracing::debug!("Listed {} ({} entries)", listing.directory.display(), listing.items.len());
    print_listing(&listing, long, all, human);
    Ok(())
}

/// List the parent directory
pub async fn up(fm: &FileManager) -> FmkResult<()> {
    let listing = fm.navigate_to_parent().await?;
    println!("{}", style(listing.directory.display()).bold());
    print_listing(&listing, false, false, false);
    Ok(())
}

pub async fn pwd(fm: &FileManager) -> FmkResult<()> {
    println!("{}", fm.current_directory().await.path.display());
    Ok(())
}

/// Create a directory
pub async fn mkdir(fm: &FileManager, name: &str) -> FmkResult<()> {
    let path = fm.create_directory(name).await?;
    println!("Created {}", path.display());
    Ok(())
}

/// Create a new file
pub async fn touch(fm: &FileManager, name: &str, content: &str) -> FmkResult<()> {
    let path = fm.create_file(name, content).await?;
    println!("Created {}", path.display());
    Ok(())
}

/// Display file contents
pub async fn cat(fm: &FileManager, path: &Path, verbose: bool) -> FmkResult<()> {
    let file = fm.read_file(path).await?;

    if verbose {
        eprintln!(
            "{} ({}, {}, {})",
            file.path.display(),
            bytesize::ByteSize(file.size),
            file.mime_type.as_deref().unwrap_or("unknown type"),
            file.encoding
        );
    }

    print!("{}", file.content);
    if !file.content.ends_with('\n') {
        println!();
    }
    Ok(())
}

/// Overwrite a file
pub async fn write(fm: &FileManager, path: &Path, content: Option<String>) -> FmkResult<()> {
    let content = match content {
        Some(c) => c,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let outcome = fm.write_file(path, &content).await?;
    println!("Saved {}", outcome.path.display());
    if let Some(backup) = outcome.backup {
        println!("  Backup: {}", style(backup.display()).dim());
    }
    Ok(())
}

/// Remove files or directories
pub async fn rm(fm: &FileManager, paths: &[std::path::PathBuf], yes: bool) -> FmkResult<()> {
    for path in paths {
        if !yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete {}?", path.display()))
                .default(false)
                .interact()
                .map_err(prompt_error)?;
            if !confirmed {
                println!("Skipped {}", path.display());
                continue;
            }
        }

        let kind = fm.delete_item(path).await?;
        let what = match kind {
            EntryKind::Directory => "directory",
            EntryKind::Symlink => "link",
            _ => "file",
        };
        println!("Removed {} {}", what, path.display());
    }

    Ok(())
}

/// Rename within the parent directory
pub async fn rename(fm: &FileManager, path: &Path, new_name: &str) -> FmkResult<()> {
    let renamed = fm.rename_item(path, new_name).await?;
    println!("Renamed {} -> {}", path.display(), renamed.display());
    Ok(())
}

/// Copy into a directory
pub async fn cp(fm: &FileManager, source: &Path, dest_dir: &Path) -> FmkResult<()> {
    let target = fm.copy_item(source, dest_dir).await?;
    println!("Copied {} -> {}", source.display(), target.display());
    Ok(())
}

/// Move into a directory
pub async fn mv(fm: &FileManager, source: &Path, dest_dir: &Path) -> FmkResult<()> {
    let target = fm.move_item(source, dest_dir).await?;
    println!("Moved {} -> {}", source.display(), target.display());
    Ok(())
}

/// Search file names
pub async fn find(
    fm: &FileManager,
    pattern: &str,
    path: Option<&Path>,
    glob: bool,
) -> FmkResult<()> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message(format!("Searching for '{pattern}'"));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = fm.search_files(pattern, path, glob).await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    if outcome.results.is_empty() {
        println!("No matches under {}", outcome.search_path.display());
        return Ok(());
    }

    let rows: Vec<FoundEntry> = outcome
        .results
        .iter()
        .map(|r| FoundEntry {
            size: format_size(r.size, true),
            modified: format_time(r.modified),
            path: r.path.display().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));

    if outcome.truncated {
        println!(
            "{}",
            style(format!(
                "Showing the first {} matches; narrow the pattern to see more",
                outcome.count
            ))
            .yellow()
        );
    } else {
        println!("{} match(es)", outcome.count);
    }
    Ok(())
}

/// Show file/directory information
pub async fn stat(fm: &FileManager, path: &Path) -> FmkResult<()> {
    let info = fm.get_file_info(path).await?;

    println!("  Path: {}", info.path.display());
    println!("  Type: {}", if info.is_directory { "directory" } else { "file" });
    println!("  Size: {} ({})", info.size, bytesize::ByteSize(info.size));

    if !info.extension.is_empty() {
        println!("  Extension: {}", info.extension);
    }
    if let Some(mime) = &info.mime_type {
        println!("  MIME: {}", mime);
    }
    if let Some(mode) = info.mode {
        println!("  Mode: {:o} ({})", mode & 0o7777, format_permissions(Some(mode)));
    }

    println!("  Modified: {}", format_time(info.modified));
    println!("  Accessed: {}", format_time(info.accessed));
    if info.created.is_some() {
        println!("  Created: {}", format_time(info.created));
    }

    Ok(())
}

/// Show storage space information
pub async fn df(fm: &FileManager) -> FmkResult<()> {
    let volumes = fm.get_volume_info().await?;

    if volumes.is_empty() {
        println!("No volumes reported");
        return Ok(());
    }

    let rows: Vec<VolumeRow> = volumes
        .iter()
        .map(|v| VolumeRow {
            name: v.name.clone(),
            mountpoint: v.mountpoint.display().to_string(),
            fstype: v.fstype.clone(),
            total: bytesize::ByteSize(v.total).to_string(),
            used: bytesize::ByteSize(v.used).to_string(),
            free: bytesize::ByteSize(v.free).to_string(),
            percent: format!("{:.1}%", v.percent),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

/// Answer JSON requests until stdin closes
pub async fn serve(fm: &FileManager) -> FmkResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!("Serving requests from {}", fm.current_path().await.display());

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = fm.dispatch_json(line).await;
        let mut out = response.to_json();
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
