use std::path::{Component, Path, PathBuf};

use zodgen_compile::RenderedFile;

use super::atomic::write_bytes_atomic;
use super::{EmitError, EmitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    Missing,
    Changed,
}

/// A rendered file that differs from what is on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub path: PathBuf,
    pub kind: DriftKind,
}

/// Write every rendered file under `out_dir`, returning the written paths.
pub fn write_rendered(out_dir: &Path, files: &[RenderedFile]) -> EmitResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = target_path(out_dir, &file.path)?;
        write_bytes_atomic(&path, file.contents.as_bytes())?;
        written.push(path);
    }
    Ok(written)
}

/// Compare rendered files against `out_dir` without writing anything.
pub fn detect_drift(out_dir: &Path, files: &[RenderedFile]) -> EmitResult<Vec<Drift>> {
    let mut drift = Vec::new();
    for file in files {
        let path = target_path(out_dir, &file.path)?;
        let kind = match std::fs::read(&path) {
            Ok(existing) if existing == file.contents.as_bytes() => continue,
            Ok(_) => DriftKind::Changed,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => DriftKind::Missing,
            Err(err) => return Err(err.into()),
        };
        drift.push(Drift { path, kind });
    }
    Ok(drift)
}

fn target_path(out_dir: &Path, relative: &str) -> EmitResult<PathBuf> {
    let relative = Path::new(relative);
    let escapes = relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if escapes || relative.as_os_str().is_empty() {
        return Err(EmitError::InvalidPath(relative.display().to_string()));
    }
    Ok(out_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(path: &str, contents: &str) -> RenderedFile {
        RenderedFile {
            path: path.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn check_reports_missing_and_changed_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = vec![
            rendered("enums.ts", "enums"),
            rendered("pure/User.ts", "user"),
            rendered("pure/Post.ts", "post"),
        ];

        write_rendered(dir.path(), &files[..2]).expect("write");
        std::fs::write(dir.path().join("enums.ts"), "stale").expect("overwrite");

        let drift = detect_drift(dir.path(), &files).expect("check");
        assert_eq!(
            drift,
            vec![
                Drift {
                    path: dir.path().join("enums.ts"),
                    kind: DriftKind::Changed,
                },
                Drift {
                    path: dir.path().join("pure/Post.ts"),
                    kind: DriftKind::Missing,
                },
            ]
        );

        write_rendered(dir.path(), &files).expect("write");
        assert!(detect_drift(dir.path(), &files).expect("check").is_empty());
    }

    #[test]
    fn rejects_paths_outside_the_output_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = write_rendered(dir.path(), &[rendered("../escape.ts", "")]).unwrap_err();
        assert!(matches!(err, EmitError::InvalidPath(_)));
    }
}
