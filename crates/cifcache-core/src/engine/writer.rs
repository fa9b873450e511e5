use super::error::CacheError;
use crate::core::models::cache::FinalCache;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const JSON_INDENT: &[u8] = b"    ";

/// Serializes the cache as a JSON object indented with four spaces, keys in
/// lexicographic order and without a trailing newline.
pub fn to_json_string(cache: &FinalCache) -> Result<String, CacheError> {
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    cache.serialize(&mut serializer)?;
    String::from_utf8(buffer)
        .map_err(|e| CacheError::Internal(format!("serializer produced invalid UTF-8: {}", e)))
}

/// Writes the final cache to disk, replacing any previous file in one step.
#[derive(Debug, Clone)]
pub struct CacheWriter {
    output_path: PathBuf,
    echo_to_console: bool,
}

impl CacheWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            echo_to_console: false,
        }
    }

    /// Also prints the serialized cache to stdout once the file is written.
    pub fn with_console_echo(mut self, enabled: bool) -> Self {
        self.echo_to_console = enabled;
        self
    }

    pub fn write(&self, cache: &FinalCache) -> Result<(), CacheError> {
        self.write_with_console(cache, &mut io::stdout().lock())
    }

    /// Like [`CacheWriter::write`], echoing to `console` instead of stdout.
    pub fn write_with_console(
        &self,
        cache: &FinalCache,
        console: &mut impl Write,
    ) -> Result<(), CacheError> {
        let json = to_json_string(cache)?;
        self.write_atomically(json.as_bytes())?;
        info!(entries = cache.len(), "Cache written to {:?}", self.output_path);

        if self.echo_to_console {
            if let Err(e) = writeln!(console, "{}", json).and_then(|_| console.flush()) {
                warn!("Failed to echo cache to console: {}", e);
            }
        }
        Ok(())
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), CacheError> {
        let to_err = |source: io::Error| CacheError::Output {
            path: self.output_path.clone(),
            source,
        };

        let dir = match self.output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = self.staging_file(dir).map_err(to_err)?;
        debug!("Staging cache in {:?}", temp.path());

        temp.write_all(bytes).map_err(to_err)?;
        temp.as_file().sync_all().map_err(to_err)?;
        temp.persist(&self.output_path).map_err(|e| to_err(e.error))?;
        Ok(())
    }

    /// Creates the staging file with the permissions a plain `create` would give
    /// the output: the mode of the file being replaced, or `0o666` minus umask.
    fn staging_file(&self, dir: &Path) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".cifcache-");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(dir)?;

        if let Ok(existing) = fs::metadata(&self.output_path) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        Ok(temp)
    }
}
