//! The session store behind the CLI: one pretty-printed JSON file.

use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use pulga_core::session::{Session, SessionStore};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionFileError {
  #[error("session file {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("session file {} is not a valid session: {source}", path.display())]
  Json {
    path:   PathBuf,
    #[source]
    source: pulga_core::Error,
  },
}

/// A [`SessionStore`] persisted at `path`. A missing file is an empty
/// (logged-out) session.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
  path: PathBuf,
}

impl FileSessionStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: expand_tilde(&path.into()),
    }
  }

  pub fn path(&self) -> &Path { &self.path }

  fn io_err(&self, source: io::Error) -> SessionFileError {
    SessionFileError::Io {
      path: self.path.clone(),
      source,
    }
  }

  fn json_err(&self, source: pulga_core::Error) -> SessionFileError {
    SessionFileError::Json {
      path: self.path.clone(),
      source,
    }
  }
}

impl SessionStore for FileSessionStore {
  type Error = SessionFileError;

  fn get(&self) -> Result<Session, Self::Error> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Ok(Session::default());
      }
      Err(e) => return Err(self.io_err(e)),
    };
    Session::from_json(&raw).map_err(|e| self.json_err(e))
  }

  fn set(&self, session: &Session) -> Result<(), Self::Error> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
    }
    let json = session.to_json().map_err(|e| self.json_err(e))?;
    write_private(&self.path, json.as_bytes()).map_err(|e| self.io_err(e))?;
    tracing::debug!(path = %self.path.display(), "session saved");
    Ok(())
  }

  fn clear(&self) -> Result<(), Self::Error> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(self.io_err(e)),
    }
  }
}

/// Write `contents` to `path`, readable and writable by the owner only. A
/// file left with wider permissions by an older run is tightened too.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
  let mut options = fs::OpenOptions::new();
  options.write(true).create(true).truncate(true);
  #[cfg(unix)]
  {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
  }
  let mut file = options.open(path)?;
  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
  }
  file.write_all(contents)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
