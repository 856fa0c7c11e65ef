//! Solver module acquisition: download, temporary artifact, ordered loaders.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::analysis::CircuitAnalyzer;

pub mod fetch;
pub mod native;

pub use fetch::ModuleClient;
pub use native::{GenericLibraryLoader, StructuredLoader};

/// The module file on disk.
#[derive(Debug)]
pub enum Artifact {
    /// Downloaded bytes in a uniquely named temporary file.
    Downloaded(NamedTempFile),
    /// A file the user pointed at; never removed.
    Local(PathBuf),
}

impl Artifact {
    pub fn persist(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("module_kvlkcl")
            .suffix(std::env::consts::DLL_SUFFIX)
            .tempfile()
            .context("creating temporary module file")?;
        file.write_all(bytes).context("writing temporary module file")?;
        file.flush()?;
        Ok(Self::Downloaded(file))
    }

    pub fn local(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("module file '{}' does not exist", path.display());
        }
        Ok(Self::Local(path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        match self {
            Artifact::Downloaded(f) => f.path(),
            Artifact::Local(p) => p,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, Artifact::Downloaded(_))
    }

    /// Remove a downloaded file. Errors are swallowed.
    pub fn cleanup(self) {
        if let Artifact::Downloaded(file) = self {
            let _ = file.close();
        }
    }
}

/// Where the artifact comes from. Names the attempt when it cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Download,
    Local,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Download => "download",
            Source::Local => "local module",
        }
    }
}

/// One way of turning an artifact into a callable analyzer.
pub trait LoaderStrategy {
    fn name(&self) -> &str;

    /// `artifact` is `None` when the download failed.
    fn load(&self, artifact: Option<&Artifact>) -> Result<Box<dyn CircuitAnalyzer>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: String,
    pub error: String,
}

impl Attempt {
    fn new(strategy: &str, error: &anyhow::Error) -> Self {
        Self { strategy: strategy.to_string(), error: format!("{:#}", error) }
    }
}

#[derive(Debug, Error)]
#[error("module could not be loaded:{}", list_attempts(.attempts))]
pub struct AcquireError {
    pub attempts: Vec<Attempt>,
}

impl AcquireError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn list_attempts(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("\n  - {}: {}", a.strategy, a.error))
        .collect()
}

/// A loaded analyzer plus the file backing it.
pub struct LoadedModule {
    analyzer: Box<dyn CircuitAnalyzer>,
    strategy: String,
    failures: Vec<Attempt>,
    artifact: Option<Artifact>,
}

impl LoadedModule {
    pub fn analyzer(&self) -> &dyn CircuitAnalyzer {
        self.analyzer.as_ref()
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Attempts that failed before the winning one.
    pub fn failures(&self) -> &[Attempt] {
        &self.failures
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_ref().map(Artifact::path)
    }

    /// Unload the module, then remove its temporary file.
    pub fn close(self) {
        let LoadedModule { analyzer, artifact, .. } = self;
        drop(analyzer);
        if let Some(artifact) = artifact {
            artifact.cleanup();
        }
    }
}

/// Ordered loader strategies; the first success wins.
pub struct ModuleAcquirer {
    strategies: Vec<Box<dyn LoaderStrategy>>,
}

impl ModuleAcquirer {
    pub fn new(strategies: Vec<Box<dyn LoaderStrategy>>) -> Self {
        Self { strategies }
    }

    /// Descriptor-table load first, plain symbol lookup as the fallback.
    pub fn native() -> Self {
        Self::new(vec![Box::new(StructuredLoader), Box::new(GenericLibraryLoader)])
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Load a downloaded artifact.
    pub fn load(&self, fetched: Result<Artifact>) -> Result<LoadedModule, AcquireError> {
        self.load_from(Source::Download, fetched)
    }

    pub fn load_from(&self, source: Source, fetched: Result<Artifact>) -> Result<LoadedModule, AcquireError> {
        let mut attempts = Vec::new();
        let artifact = match fetched {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                attempts.push(Attempt::new(source.label(), &e));
                None
            }
        };

        for strategy in &self.strategies {
            match strategy.load(artifact.as_ref()) {
                Ok(analyzer) => {
                    return Ok(LoadedModule {
                        analyzer,
                        strategy: strategy.name().to_string(),
                        failures: attempts,
                        artifact,
                    });
                }
                Err(e) => attempts.push(Attempt::new(strategy.name(), &e)),
            }
        }

        if let Some(artifact) = artifact {
            artifact.cleanup();
        }
        Err(AcquireError { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisReport, AnalysisRequest};
    use anyhow::anyhow;
    use std::{cell::RefCell, rc::Rc};

    struct Stub;

    impl CircuitAnalyzer for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        fn run_analysis(&self, _request: &AnalysisRequest<'_>) -> Result<AnalysisReport> {
            Ok(AnalysisReport::default())
        }
    }

    struct Recording {
        name: &'static str,
        succeed: bool,
        calls: Rc<RefCell<Vec<(&'static str, bool)>>>,
    }

    impl LoaderStrategy for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn load(&self, artifact: Option<&Artifact>) -> Result<Box<dyn CircuitAnalyzer>> {
            self.calls.borrow_mut().push((self.name, artifact.is_some()));
            if self.succeed {
                Ok(Box::new(Stub))
            } else {
                Err(anyhow!("{} refused", self.name))
            }
        }
    }

    fn acquirer(outcomes: &[(&'static str, bool)]) -> (ModuleAcquirer, Rc<RefCell<Vec<(&'static str, bool)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let strategies = outcomes
            .iter()
            .map(|&(name, succeed)| {
                Box::new(Recording { name, succeed, calls: calls.clone() }) as Box<dyn LoaderStrategy>
            })
            .collect();
        (ModuleAcquirer::new(strategies), calls)
    }

    #[test]
    fn first_success_wins_and_later_strategies_are_skipped() {
        let (acq, calls) = acquirer(&[("structured", true), ("generic", true)]);
        let loaded = acq.load(Artifact::persist(b"\x7fELF")).unwrap();
        assert_eq!(loaded.strategy(), "structured");
        assert!(loaded.failures().is_empty());
        assert_eq!(*calls.borrow(), vec![("structured", true)]);
        loaded.close();
    }

    #[test]
    fn fallback_runs_after_first_failure() {
        let (acq, calls) = acquirer(&[("structured", false), ("generic", true)]);
        let loaded = acq.load(Artifact::persist(b"\x7fELF")).unwrap();
        assert_eq!(loaded.strategy(), "generic");
        assert_eq!(loaded.failures().len(), 1);
        assert_eq!(loaded.failures()[0].error, "structured refused");
        assert_eq!(calls.borrow().len(), 2);
        loaded.close();
    }

    #[test]
    fn failed_download_still_tries_every_strategy() {
        let (acq, calls) = acquirer(&[("structured", false), ("generic", false)]);
        let err = acq.load(Err(anyhow!("404 Not Found"))).err().unwrap();
        assert_eq!(*calls.borrow(), vec![("structured", false), ("generic", false)]);
        let names: Vec<_> = err.attempts.iter().map(|a| a.strategy.as_str()).collect();
        assert_eq!(names, vec!["download", "structured", "generic"]);
        assert_eq!(err.exit_code(), 1);
        let text = err.to_string();
        assert!(text.starts_with("module could not be loaded:"));
        assert!(text.contains("\n  - download: 404 Not Found"));
        assert!(text.contains("\n  - generic: generic refused"));
    }

    #[test]
    fn temp_file_is_removed_when_every_strategy_fails() {
        let (acq, _) = acquirer(&[("structured", false)]);
        let artifact = Artifact::persist(b"not a library").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert!(acq.load(Ok(artifact)).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn close_removes_downloaded_file_but_keeps_local_one() {
        let (acq, _) = acquirer(&[("structured", true)]);

        let downloaded = Artifact::persist(b"bytes").unwrap();
        let tmp_path = downloaded.path().to_path_buf();
        assert!(tmp_path.file_name().unwrap().to_string_lossy().starts_with("module_kvlkcl"));
        let loaded = acq.load(Ok(downloaded)).unwrap();
        assert_eq!(loaded.artifact_path(), Some(tmp_path.as_path()));
        loaded.close();
        assert!(!tmp_path.exists());

        let local = tempfile::NamedTempFile::new().unwrap();
        let artifact = Artifact::local(local.path()).unwrap();
        assert!(!artifact.is_temporary());
        acq.load(Ok(artifact)).unwrap().close();
        assert!(local.path().exists());
    }

    #[test]
    fn local_artifact_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Artifact::local(&dir.path().join("missing.so")).is_err());
    }

    #[test]
    fn missing_local_module_is_not_reported_as_download() {
        let (acq, calls) = acquirer(&[("structured", false)]);
        let dir = tempfile::tempdir().unwrap();
        let fetched = Artifact::local(&dir.path().join("missing.so"));
        let err = acq.load_from(Source::Local, fetched).err().unwrap();
        assert_eq!(*calls.borrow(), vec![("structured", false)]);
        assert_eq!(err.attempts[0].strategy, "local module");
        assert!(err.attempts[0].error.contains("does not exist"));
        assert!(!err.to_string().contains("download"));
    }
}
