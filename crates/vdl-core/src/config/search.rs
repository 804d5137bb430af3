//! Well-known configuration file locations.

use std::path::{Path, PathBuf};

use crate::PROG;

/// Candidate configuration files, in read order (later files override).
///
/// Windows: `%APPDATA%\VideoDL\<name>`, `%USERPROFILE%\VideoDL\<name>`,
/// `%USERPROFILE%\VideoDL.conf`.
/// Unix: `/etc/VideoDL.conf`, `$XDG_CONFIG_HOME/VideoDL/<name>`,
/// `~/.config/VideoDL/<name>`, `~/.VideoDL.conf`.
/// Then `./<basename>` when given, and `./VideoDL.conf`.
///
/// `<name>` is `basename` or `default.conf`.
pub fn search_nearby_files(basename: Option<&Path>) -> Vec<PathBuf> {
    let standalone = format!("{PROG}.conf");
    let select = basename.unwrap_or(Path::new("default.conf"));
    let mut paths = platform_paths(&standalone, select);
    if let Some(basename) = basename {
        paths.push(Path::new(".").join(basename));
    }
    paths.push(Path::new(".").join(&standalone));

    let mut unique = Vec::with_capacity(paths.len());
    for path in paths {
        if !unique.contains(&path) {
            unique.push(path);
        }
    }
    unique
}

#[cfg(windows)]
fn platform_paths(standalone: &str, select: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(appdata) = std::env::var_os("APPDATA").filter(|v| !v.is_empty()) {
        paths.push(PathBuf::from(appdata).join(PROG).join(select));
    }
    if let Some(profile) = std::env::var_os("USERPROFILE").filter(|v| !v.is_empty()) {
        let profile = PathBuf::from(profile);
        paths.push(profile.join(PROG).join(select));
        paths.push(profile.join(standalone));
    }
    paths
}

#[cfg(unix)]
fn platform_paths(standalone: &str, select: &Path) -> Vec<PathBuf> {
    let mut paths = vec![Path::new("/etc").join(standalone)];
    match xdg::BaseDirectories::new() {
        Ok(dirs) => paths.push(dirs.get_config_home().join(PROG).join(select)),
        Err(err) => tracing::debug!("no XDG config home: {}", err),
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        let home = PathBuf::from(home);
        paths.push(home.join(".config").join(PROG).join(select));
        paths.push(home.join(format!(".{standalone}")));
    }
    paths
}

#[cfg(not(any(unix, windows)))]
fn platform_paths(_standalone: &str, _select: &Path) -> Vec<PathBuf> {
    Vec::new()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_user(path: &Path) -> PathBuf {
    let home_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os(home_var).filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
