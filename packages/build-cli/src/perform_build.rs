//! Perform Build
//!
//! Runs the whole pipeline: configuration, analysis pass, rewrite pass.

use std::path::PathBuf;

use bundler::{Format, OutputFile};
use regex::Regex;
use tracing::{error, info};
use ts::file_system::FileSystem;

use crate::analysis::{run_analysis, ImportTable};
use crate::config::ProjectConfig;
use crate::paths::PathResolver;
use crate::rewrite::{run_rewrite, DEFAULT_LOAD_FILTER};
use crate::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    Idle,
    ConfigLoaded,
    AnalysisRunning,
    AnalysisComplete,
    RewriteRunning,
    BuildSucceeded,
    BuildFailed,
}

#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Config file or directory; `None` searches upward from the cwd.
    pub project: Option<PathBuf>,
    pub format: Format,
    /// Regex selecting the files the rewrite pass loads.
    pub load_filter: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            project: None,
            format: Format::Cjs,
            load_filter: DEFAULT_LOAD_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub config: ProjectConfig,
    pub imports: ImportTable,
    pub output_files: Vec<OutputFile>,
}

pub struct BuildPipeline<'a> {
    fs: &'a dyn FileSystem,
    settings: BuildSettings,
    state: BuildState,
    history: Vec<BuildState>,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(fs: &'a dyn FileSystem, settings: BuildSettings) -> Self {
        BuildPipeline {
            fs,
            settings,
            state: BuildState::Idle,
            history: vec![BuildState::Idle],
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[BuildState] {
        &self.history
    }

    pub fn run(&mut self) -> Result<BuildOutcome, BuildError> {
        match self.run_stages() {
            Ok(outcome) => {
                self.transition(BuildState::BuildSucceeded);
                Ok(outcome)
            }
            Err(err) => {
                error!(state = ?self.state, "{}", err);
                self.transition(BuildState::BuildFailed);
                Err(err)
            }
        }
    }

    fn run_stages(&mut self) -> Result<BuildOutcome, BuildError> {
        let filter = Regex::new(&self.settings.load_filter).map_err(|source| BuildError::InvalidFilter {
            pattern: self.settings.load_filter.clone(),
            source,
        })?;

        let config = ProjectConfig::load(self.fs, self.settings.project.as_deref())?;
        self.transition(BuildState::ConfigLoaded);

        self.transition(BuildState::AnalysisRunning);
        let resolver = PathResolver::new(self.fs, config.aliases.clone());
        let imports = run_analysis(self.fs, &config, &resolver)?;
        self.transition(BuildState::AnalysisComplete);

        self.transition(BuildState::RewriteRunning);
        let result = run_rewrite(self.fs, &config, &imports, self.settings.format, filter)?;

        Ok(BuildOutcome {
            config,
            imports,
            output_files: result.output_files,
        })
    }

    fn transition(&mut self, next: BuildState) {
        info!(from = ?self.state, to = ?next, "build state");
        self.state = next;
        self.history.push(next);
    }
}

/// Run one build to completion.
pub fn perform_build(fs: &dyn FileSystem, settings: BuildSettings) -> Result<BuildOutcome, BuildError> {
    BuildPipeline::new(fs, settings).run()
}
