use crate::domain::{MoleError, MoleResult};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Absolute directory that owns every artifact of one run bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// Resolves `base_path/folder_name` to an absolute path and creates it if needed.
    ///
    /// An existing directory is reused as is; its contents are never removed.
    pub fn prepare(base_path: &Path, folder_name: &str) -> MoleResult<Self> {
        ensure_plain_name("INPUT.RUN_FOLDER_NAME", "run folder", folder_name)?;

        let path = std::path::absolute(base_path.join(folder_name)).map_err(|source| {
            MoleError::io_system(
                "IO.RUN_DIRECTORY",
                format!(
                    "failed to resolve run directory '{}': {}",
                    base_path.join(folder_name).display(),
                    source
                ),
            )
        })?;

        fs::create_dir_all(&path).map_err(|source| {
            MoleError::io_system(
                "IO.RUN_DIRECTORY",
                format!(
                    "failed to create run directory '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        debug!(run_dir = %path.display(), "run directory ready");

        Ok(Self { path })
    }

    /// Wraps a directory that already holds a bundle without touching the filesystem.
    pub fn existing(path: impl Into<PathBuf>) -> MoleResult<Self> {
        let path = path.into();
        if !path.is_dir() {
            return Err(MoleError::io_system(
                "IO.RUN_DIRECTORY",
                format!("run directory '{}' does not exist", path.display()),
            ));
        }
        let path = std::path::absolute(&path).map_err(|source| {
            MoleError::io_system(
                "IO.RUN_DIRECTORY",
                format!(
                    "failed to resolve run directory '{}': {}",
                    path.display(),
                    source
                ),
            )
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Accepts only a single normal path component such as `config.yaml`.
pub fn ensure_plain_name(code: &'static str, label: &str, name: &str) -> MoleResult<()> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain {
        return Err(MoleError::input_validation(
            code,
            format!("{label} name '{name}' must be a single relative path component"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{RunDirectory, ensure_plain_name};
    use crate::domain::MoleErrorCategory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn prepare_creates_absolute_directory() {
        let temp = TempDir::new().expect("tempdir should be created");
        let run_dir = RunDirectory::prepare(temp.path(), "lazymole").expect("prepare");

        assert!(run_dir.path().is_absolute());
        assert!(run_dir.path().is_dir());
        assert_eq!(run_dir.path(), temp.path().join("lazymole"));
        assert_eq!(
            run_dir.artifact_path("field.dat"),
            temp.path().join("lazymole").join("field.dat")
        );
    }

    #[test]
    fn prepare_is_idempotent_and_keeps_existing_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        let first = RunDirectory::prepare(temp.path(), "lazymole").expect("first prepare");
        let notes = first.artifact_path("notes.txt");
        fs::write(&notes, "keep me").expect("seed file");

        let second = RunDirectory::prepare(temp.path(), "lazymole").expect("second prepare");

        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&notes).expect("readable"), "keep me");
    }

    #[test]
    fn prepare_fails_when_path_is_a_file() {
        let temp = TempDir::new().expect("tempdir should be created");
        fs::write(temp.path().join("lazymole"), "not a directory").expect("seed file");

        let error = RunDirectory::prepare(temp.path(), "lazymole")
            .expect_err("file in the way should fail");
        assert_eq!(error.category(), MoleErrorCategory::IoSystem);
        assert_eq!(error.code(), "IO.RUN_DIRECTORY");
    }

    #[test]
    fn folder_names_must_be_plain() {
        let temp = TempDir::new().expect("tempdir should be created");
        for name in ["", "..", "a/b", "/abs"] {
            let error = RunDirectory::prepare(temp.path(), name)
                .expect_err("non-plain folder name should fail");
            assert_eq!(error.category(), MoleErrorCategory::InputValidation);
        }
        assert!(ensure_plain_name("INPUT.CONFIG_NAME", "config", "config.yaml").is_ok());
    }

    #[test]
    fn existing_requires_a_directory() {
        let temp = TempDir::new().expect("tempdir should be created");
        assert!(RunDirectory::existing(temp.path()).is_ok());
        assert!(RunDirectory::existing(temp.path().join("missing")).is_err());
    }
}
