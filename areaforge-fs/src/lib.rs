//! Capability-based file access for the areaforge tools.
//!
//! Paths are UTF-8 ([`camino`]) and every open goes through a [`cap_std`]
//! directory handle obtained with ambient authority, so callers never touch
//! `std::fs` directly.
#![forbid(unsafe_code)]

use std::io;
use std::path::MAIN_SEPARATOR_STR;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File};

/// Open an existing file for reading.
///
/// # Errors
///
/// Returns the underlying IO error when the file cannot be opened.
pub fn open_input(path: &Utf8Path) -> io::Result<File> {
    File::open_ambient(path, ambient_authority())
}

/// Create or truncate `path` for writing, creating missing parent
/// directories first.
///
/// # Errors
///
/// Returns an error when `path` has no file name or any directory or file
/// operation fails.
pub fn create_output(path: &Utf8Path) -> io::Result<File> {
    ensure_parent_dir(path)?;
    let (dir, name) = parent_and_name(path)?;
    dir.create(name)
}

/// Whether the existing entry at `path` is a regular file.
///
/// # Errors
///
/// Returns an error when the parent directory cannot be opened or the
/// entry does not exist ([`io::ErrorKind::NotFound`]).
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_and_name(path)?;
    dir.metadata(name).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// # Errors
///
/// Returns the IO error raised while opening the anchor directory or
/// creating the chain.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, relative) = anchor_dir(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(relative)
}

/// Open the directory holding `path` and return it with the file name.
fn parent_and_name(path: &Utf8Path) -> io::Result<(Dir, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} has no file name")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `path` into an ambient root (filesystem root, drive or the current
/// directory) and the path relative to it.
fn anchor_dir(path: &Utf8Path) -> io::Result<(Dir, Utf8PathBuf)> {
    let mut components = path.components();
    let root = match components.clone().next() {
        Some(Utf8Component::Prefix(prefix)) => {
            components.next();
            let mut root = Utf8PathBuf::from(prefix.as_str());
            if matches!(components.clone().next(), Some(Utf8Component::RootDir)) {
                components.next();
                root.push(MAIN_SEPARATOR_STR);
            }
            root
        }
        Some(Utf8Component::RootDir) => {
            components.next();
            Utf8PathBuf::from(MAIN_SEPARATOR_STR)
        }
        _ => Utf8PathBuf::from("."),
    };
    let dir = Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((dir, components.as_path().to_path_buf()))
}
