#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Permission bits of a file, synthesized from the read-only flag and the
/// extension where the platform has no unix mode.
#[cfg_attr(unix, allow(unused_variables))]
pub(crate) fn file_mode(metadata: &std::fs::Metadata, path: &Path) -> u32 {
    #[cfg(unix)]
    {
        metadata.permissions().mode() & 0o777
    }

    #[cfg(not(unix))]
    {
        synthesized_mode(metadata.permissions().readonly(), path)
    }
}

#[cfg_attr(unix, allow(dead_code))]
fn synthesized_mode(readonly: bool, path: &Path) -> u32 {
    let is_executable = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            matches!(
                ext.to_lowercase().as_str(),
                "exe" | "bat" | "cmd" | "com" | "msi" | "ps1"
            )
        })
        .unwrap_or(false);

    match (readonly, is_executable) {
        (true, true) => 0o555,
        (true, false) => 0o444,
        (false, true) => 0o755,
        (false, false) => 0o644,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_file_mode_masks_type_bits() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("script.sh");
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o750)).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(file_mode(&metadata, &path), 0o750);
    }

    #[test]
    fn test_synthesized_mode_follows_extension() {
        assert_eq!(synthesized_mode(false, Path::new("setup.EXE")), 0o755);
        assert_eq!(synthesized_mode(true, Path::new("run.ps1")), 0o555);
        assert_eq!(synthesized_mode(false, Path::new("report.csv")), 0o644);
        assert_eq!(synthesized_mode(true, Path::new("README")), 0o444);
    }
}
