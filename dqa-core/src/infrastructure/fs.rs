// dqa-core/src/infrastructure/fs.rs

use std::io::Write;
use std::path::Path;

use tracing::trace;

use crate::infrastructure::error::InfrastructureError;

/// Replaces `path` with `content` through a temporary file in the same
/// directory. Readers see either the old file or the complete new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file.as_file().sync_all()?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    trace!(path = ?path, bytes = content.as_ref().len(), "Wrote file");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_replaces_report_in_place() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("person.csv");

        atomic_write(&path, "Model,Table\n")?;
        atomic_write(&path, "Model,Table\npedsnet,person\n")?;

        assert_eq!(fs::read_to_string(&path)?, "Model,Table\npedsnet,person\n");
        // No temporary files left behind.
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = atomic_write(dir.path().join("missing").join("death.csv"), "x").unwrap_err();
        assert!(matches!(err, InfrastructureError::Io(_)));
    }
}
