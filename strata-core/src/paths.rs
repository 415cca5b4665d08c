use crate::error::{Error, Result};
use std::path::{Component, Path};

/// Turns a path into the `/`-separated relative form used as a changelog key.
///
/// Root and prefix components are dropped, `.` is ignored and `..` is
/// rejected.
pub fn to_relative_key(path: &Path) -> Result<String> {
    let mut parts = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Error::InvalidPath(path.display().to_string()));
            }
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(path.display().to_string()));
    }

    Ok(parts.join("/"))
}
