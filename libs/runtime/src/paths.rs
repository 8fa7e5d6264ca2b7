use std::io;
use std::path::{Path, PathBuf};

/// Resolve the server home directory to an absolute path.
///
/// - `None`: `<platform home>/<default_subdir>` (`%APPDATA%` on Windows, `$HOME` elsewhere)
/// - `~` or `~/...`: expanded against the user's home
/// - relative paths: joined onto the current working directory
pub fn resolve_home_dir(
    requested: Option<String>,
    default_subdir: &str,
    create: bool,
) -> io::Result<PathBuf> {
    let resolved = match requested {
        None => platform_home()?.join(default_subdir),
        Some(raw) => expand(&raw)?,
    };

    if create {
        std::fs::create_dir_all(&resolved)?;
    }
    Ok(resolved)
}

fn platform_home() -> io::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory for this user"))
}

fn expand(raw: &str) -> io::Result<PathBuf> {
    let path = if raw == "~" {
        platform_home()?
    } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        platform_home()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(Path::new(&path)))
    }
}
