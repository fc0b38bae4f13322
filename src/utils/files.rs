use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

/// Create the parent directory of `path` if it does not exist yet
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Copy `src` to `dst`, creating the destination's parent directories and overwriting any
/// existing file
pub fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    ensure_parent(dst)?;
    fs::copy(src, dst)?;

    Ok(())
}

/// The immediate subdirectories of `root`, sorted by name
pub fn sorted_subdirs(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;

        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }

    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(dirs)
}
