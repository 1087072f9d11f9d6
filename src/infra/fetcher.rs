// ============================================================
// Layer 6 — Corpus Download
// ============================================================
// Runs the download script shipped next to the corpus when
// the directory layout check fails. The script is run once,
// from its own directory; the loader re-checks afterwards.
//
// A non-zero exit is only a warning: the layout re-check decides
// whether the corpus is usable.

use std::{path::PathBuf, process::Command};

use crate::domain::error::CorpusError;
use crate::domain::traits::CorpusFetcher;

pub struct ScriptFetcher {
    /// Directory holding the script; also its working directory
    dir: PathBuf,
    script: String,
}

impl ScriptFetcher {
    pub fn new(dir: impl Into<PathBuf>, script: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            script: script.into(),
        }
    }
}

impl CorpusFetcher for ScriptFetcher {
    fn fetch(&self) -> Result<(), CorpusError> {
        tracing::info!("Running '{}' in '{}'", self.script, self.dir.display());

        let status = Command::new("sh")
            .arg(&self.script)
            .current_dir(&self.dir)
            .status()
            .map_err(|e| CorpusError::Fetch(format!("cannot run '{}': {e}", self.script)))?;

        if !status.success() {
            tracing::warn!("'{}' exited with {}", self.script, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::ensure_corpus;

    #[test]
    fn test_missing_directory_is_fetch_error() {
        let fetcher = ScriptFetcher::new("/no/such/dir", "download.sh");
        assert!(matches!(fetcher.fetch(), Err(CorpusError::Fetch(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_runs_in_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("download.sh"), "mkdir -p fetched\n").unwrap();

        ScriptFetcher::new(dir.path(), "download.sh").fetch().unwrap();
        assert!(dir.path().join("fetched").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_script_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("download.sh"), "exit 3\n").unwrap();

        assert!(ScriptFetcher::new(dir.path(), "download.sh").fetch().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_layout_check_decides_after_failing_script() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("aclImdb");

        // Exits non-zero without creating anything
        std::fs::write(dir.path().join("download.sh"), "exit 1\n").unwrap();
        let err = ensure_corpus(&root, &ScriptFetcher::new(dir.path(), "download.sh")).unwrap_err();
        assert!(matches!(err, CorpusError::Integrity(_)));

        // Exits non-zero after extracting the corpus
        std::fs::write(
            dir.path().join("download.sh"),
            "mkdir -p aclImdb/train/pos aclImdb/train/neg aclImdb/test/pos aclImdb/test/neg\nexit 1\n",
        )
        .unwrap();
        ensure_corpus(&root, &ScriptFetcher::new(dir.path(), "download.sh")).unwrap();
    }
}
