use crate::error::SweepResult;
use std::path::{Path, PathBuf};

/// Filesystem layout for one launch under the run's output directory.
///
/// `<out_dir>/sweep.json`, `<out_dir>/slurm_logs/`, `<out_dir>/slurm_scripts/<job>.sbatch`
#[derive(Debug, Clone)]
pub struct SweepLayout {
    root: PathBuf,
}

impl SweepLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("slurm_logs")
    }

    #[must_use]
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("slurm_scripts")
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("sweep.json")
    }

    #[must_use]
    pub fn script_path(&self, job_name: &str) -> PathBuf {
        self.scripts_dir().join(format!("{job_name}.sbatch"))
    }

    pub fn ensure_dirs(&self) -> SweepResult<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.scripts_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = SweepLayout::new(temp.path().join("run"));

        assert_eq!(layout.manifest_path(), temp.path().join("run").join("sweep.json"));
        assert!(layout.script_path("gpt").ends_with("slurm_scripts/gpt.sbatch"));

        layout.ensure_dirs().unwrap();
        assert!(layout.logs_dir().is_dir());
        assert!(layout.scripts_dir().is_dir());
        // Idempotent.
        layout.ensure_dirs().unwrap();
    }
}
