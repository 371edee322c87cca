//! Absolute-path resolution with `~` expansion.
//!
//! Two spellings of the same file must resolve to the same path, otherwise a
//! missing default store would be reported as "file not found" instead of
//! being bootstrapped.  Resolution is purely lexical: symlinks are not
//! followed and the file does not need to exist.

use std::path::{Component, Path, PathBuf};

use crate::application::open_preferences::{PathError, PathResolver};

/// [`PathResolver`] that expands `~` from `$HOME` and joins relative paths
/// onto the working directory.
#[derive(Debug, Clone, Default)]
pub struct EnvPathResolver {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
}

impl EnvPathResolver {
    /// Uses fixed home and working directories.
    pub fn new(home: Option<PathBuf>, cwd: PathBuf) -> Self {
        Self {
            home,
            cwd: Some(cwd),
        }
    }

    /// Reads `$HOME` now and the working directory on each resolution.
    pub fn from_env() -> Self {
        Self {
            home: std::env::var_os("HOME")
                .filter(|h| !h.is_empty())
                .map(PathBuf::from),
            cwd: None,
        }
    }

    fn expand_home(&self, path: &Path) -> Result<PathBuf, PathError> {
        let mut components = path.components();
        match components.next() {
            Some(Component::Normal(first)) if first == "~" => {
                let home = self
                    .home
                    .as_ref()
                    .ok_or_else(|| PathError::NoHomeDir(path.to_path_buf()))?;
                Ok(home.join(components.as_path()))
            }
            _ => Ok(path.to_path_buf()),
        }
    }

    fn working_dir(&self, path: &Path) -> Result<PathBuf, PathError> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().map_err(|source| PathError::CurrentDir {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl PathResolver for EnvPathResolver {
    fn resolve(&self, path: &Path) -> Result<PathBuf, PathError> {
        let expanded = self.expand_home(path)?;
        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir(path)?.join(expanded)
        };
        Ok(normalize(&absolute))
    }
}

/// Removes `.` components and folds `..` into its parent.
///
/// `..` at the root stays at the root, matching how the kernel treats `/..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component)
            }
        }
    }
    out
}
