//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::fixtures::FixtureResolver;
use crate::history::HistoryLog;
use crate::render::{Evaluator, JinjaEvaluator};
use crate::settings::{SettingsError, SettingsStore};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Runtime settings, persisted to the settings file.
    pub settings: Arc<SettingsStore>,

    /// Bounded render history, persisted to the history file.
    pub history: Arc<HistoryLog>,

    /// Fixture directory access.
    pub fixtures: FixtureResolver,

    /// Template evaluator used by `/render`.
    pub evaluator: Arc<dyn Evaluator>,
}

impl AppState {
    /// Open the stores named by `config` and build the default evaluator.
    pub fn new(config: Config) -> Result<Self, SettingsError> {
        Self::with_evaluator(config, Arc::new(JinjaEvaluator::new()))
    }

    /// Like [`AppState::new`] with a caller-supplied evaluator.
    pub fn with_evaluator(
        config: Config,
        evaluator: Arc<dyn Evaluator>,
    ) -> Result<Self, SettingsError> {
        let settings = Arc::new(SettingsStore::open(&config.settings_path)?);
        let history = Arc::new(HistoryLog::new(&config.history_path, settings.clone()));
        let fixtures = FixtureResolver::new(settings.clone(), &config.data_dir);

        tracing::info!(
            settings = %config.settings_path.display(),
            history = %config.history_path.display(),
            max_entries = settings.max_entries(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            settings,
            history,
            fixtures,
            evaluator,
        })
    }
}
