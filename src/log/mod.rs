//! The `log` module defines an interface to the crate's logging facilities. Log messages describe
//! what happens to individual vaccination records: doses given, protection gained or lost, and
//! rejected calls. This is not to be confused with _reporting_ (see [`crate::report`]), which
//! records model output as data.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`, `info!`, `debug!` and
//! `trace!` where `error!` represents the highest-priority log messages and `trace!` the lowest.
//!
//! Logging is _disabled_ by default. Logging can be enabled/disabled from code using the
//! functions:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! In addition, per-module filtering of messages can be configured using `set_module_filter()` /
//! `set_module_filters()` and `remove_module_filter()`:
//!
//! ```rust
//! use ixa_vaccination::log::{set_module_filter, set_log_level, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Enable `info` log messages globally.
//!     set_log_level(LevelFilter::Info);
//!     // Show every dose given and every window opened or closed.
//!     set_module_filter("ixa_vaccination::vaccination_record", LevelFilter::Trace);
//! }
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::str::FromStr;

use crate::error::VaccinationError;

#[cfg(feature = "logging")]
use log4rs::Handle;
use rustc_hash::FxHashMap as HashMap;
use std::sync::LazyLock;
use std::sync::{Mutex, MutexGuard};

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
// Global level used by `LogLevels` naming only module filters
const MODULE_ONLY_GLOBAL_LEVEL: LevelFilter = LevelFilter::Error;

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Different log level filters can be applied to the log messages emitted from different modules
/// according to the module path (e.g. `"ixa_vaccination::history"`). These are stored in the global
/// `LogConfiguration`.
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    /// The module path this configuration applies to
    module: String,
    /// The maximum log level for this module path
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Holds logging configuration. It's primary responsibility is to keep track of the filter levels
/// of modules and hold a handle to the global logger.
///
/// Because loggers are globally installed, only one instance of this struct should exist. The
/// public API are free functions which fetch the singleton and call the appropriate member
/// function.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The "default" level filter for modules ("targets") without an explicitly set filter. A
    /// global filter level of `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,

    #[cfg(feature = "logging")]
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations: HashMap::default(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    /// The module filters currently in force. A global level of `LevelFilter::Off` switches
    /// every module off, whatever its own filter says.
    pub(in crate::log) fn active_module_filters(
        &self,
    ) -> impl Iterator<Item = &ModuleLogConfiguration> {
        let enabled = self.global_log_level != LevelFilter::Off;
        self.module_configurations
            .values()
            .filter(move |_| enabled)
    }

    /// The most verbose level any record, history or report message can currently be logged at.
    #[cfg(any(test, not(feature = "logging")))]
    pub(in crate::log) fn max_level(&self) -> LevelFilter {
        self.active_module_filters()
            .map(|module_config| module_config.level)
            .fold(self.global_log_level, Ord::max)
    }

    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &String, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.clone()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    // Don't bother building a setting a new config
                    return false;
                }
                module_config.level = level;
            }

            Entry::Vacant(entry) => {
                let new_configuration = ModuleLogConfiguration {
                    module: module.to_string(),
                    level,
                };
                entry.insert(new_configuration);
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter<S: ToString>(
        &mut self,
        module: &S,
        level: LevelFilter,
    ) {
        if self.insert_module_filter(&module.to_string(), level) {
            self.set_config();
        }
    }

    pub(in crate::log) fn set_module_filters<S: ToString>(
        &mut self,
        module_filters: &[(&S, LevelFilter)],
    ) {
        let mut mutated: bool = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(&module.to_string(), *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

// The public API

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely, including modules with their own filter. Equivalent to
/// `set_log_level(LevelFilter::Off)`. Module filters are kept and apply again once a global level
/// is set.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filter(&module_path, level_filter);
}

/// Removes a module-specific level filter for the given module path. The global level filter will
/// apply to the module.
pub fn remove_module_filter(module_path: &str) {
    let mut log_configuration = get_log_configuration();
    log_configuration.remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules according to the provided map. Use this instead of
/// `set_module_filter()` to set filters in bulk.
#[allow(clippy::implicit_hasher)]
pub fn set_module_filters<S: ToString>(module_filters: &[(&S, LevelFilter)]) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(module_filters);
}

/// A parsed `--log-level` argument such as `"info"` or `"warn,ixa_vaccination::history=trace"`:
/// an optional global level followed by `module=level` filters, separated by commas.
#[derive(Debug, Default, PartialEq)]
pub struct LogLevels {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

impl LogLevels {
    /// # Errors
    ///
    /// Returns a `ConfigError` if a level name is not recognized.
    pub fn parse(directives: &str) -> Result<Self, VaccinationError> {
        let parse_level = |level: &str| {
            LevelFilter::from_str(level.trim())
                .map_err(|_| VaccinationError::ConfigError(format!("unknown log level {level:?}")))
        };
        let mut levels = LogLevels::default();
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.split_once('=') {
                Some((module, level)) => {
                    levels
                        .modules
                        .push((module.trim().to_string(), parse_level(level)?));
                }
                None => levels.global = Some(parse_level(directive)?),
            }
        }
        Ok(levels)
    }

    /// Installs these levels. Without a global level only errors are logged outside the modules
    /// named here.
    pub fn apply(&self) {
        let global = match (self.global, self.modules.is_empty()) {
            (Some(level), _) => level,
            (None, true) => DEFAULT_LOG_LEVEL,
            (None, false) => MODULE_ONLY_GLOBAL_LEVEL,
        };
        set_log_level(global);
        for (module, level) in &self.modules {
            info!("Logging enabled for {module} at level {level}");
            set_module_filter(module, *level);
        }
    }
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::{
        disable_logging, get_log_configuration, remove_module_filter, set_log_level,
        set_module_filter, set_module_filters, LogLevels,
    };
    use log::{error, trace, LevelFilter};
    use std::sync::{LazyLock, Mutex};

    const RECORD_MODULE: &str = "ixa_vaccination::vaccination_record";
    const HISTORY_MODULE: &str = "ixa_vaccination::history";

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Trace);
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            // Note: `log::max_level()` is not necessarily accurate when global filtering is done
            //       by the `log4rs::Root` logger. The following assert may not be satisfied.
            // assert_eq!(log::max_level(), LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Trace);
            assert_eq!(log::max_level(), LevelFilter::Trace);
            trace!("test_set_log_level: global set to trace");
        }
    }

    #[test]
    fn test_set_remove_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        // Initialize logging
        set_log_level(LevelFilter::Trace);
        remove_module_filter(RECORD_MODULE);
        remove_module_filter(HISTORY_MODULE);
        assert!(get_log_configuration().module_configurations.is_empty());

        let filters: [(&&str, LevelFilter); 2] = [
            (&RECORD_MODULE, LevelFilter::Error),
            (&HISTORY_MODULE, LevelFilter::Debug),
        ];
        // Install new filters
        set_module_filters(&filters);

        // The filters are now the set of filters we just installed
        {
            let config = get_log_configuration();
            assert_eq!(config.module_configurations.len(), 2);
            for (module_path, level) in &filters {
                assert_eq!(
                    config.module_configurations.get(**module_path),
                    Some(&((**module_path, *level).into()))
                );
            }
        }

        // Remove one filter
        remove_module_filter(RECORD_MODULE);
        // Check that it was removed
        {
            let config = get_log_configuration();
            // There is only one filer...
            assert_eq!(config.module_configurations.len(), 1);
            // ...and that filter is for `ixa_vaccination::history`
            assert_eq!(
                config.module_configurations.get(HISTORY_MODULE),
                Some(&(HISTORY_MODULE, LevelFilter::Debug).into())
            );
        }
        remove_module_filter(HISTORY_MODULE);
    }

    #[test]
    fn no_module_is_logged_by_default() {
        let config = super::LogConfiguration::default();
        assert!(config.module_configurations.is_empty());
        assert_eq!(config.max_level(), LevelFilter::Off);
    }

    #[test]
    fn disable_logging_silences_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_module_filter(RECORD_MODULE, LevelFilter::Trace);
        set_log_level(LevelFilter::Warn);
        assert_eq!(get_log_configuration().max_level(), LevelFilter::Trace);
        assert_eq!(log::max_level(), LevelFilter::Trace);

        disable_logging();
        assert_eq!(get_log_configuration().max_level(), LevelFilter::Off);
        assert_eq!(log::max_level(), LevelFilter::Off);
        error!("disable_logging_silences_module_filters: NOT EMITTED");

        // The filter is kept for when logging is turned back on.
        set_log_level(LevelFilter::Error);
        assert_eq!(log::max_level(), LevelFilter::Trace);
        remove_module_filter(RECORD_MODULE);
        disable_logging();
    }

    #[test]
    fn module_levels_without_global_level_log_errors_elsewhere() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        LogLevels::parse("ixa_vaccination::history=debug")
            .unwrap()
            .apply();
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            assert_eq!(config.max_level(), LevelFilter::Debug);
        }
        remove_module_filter(HISTORY_MODULE);

        LogLevels::default().apply();
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Off);
    }

    #[test]
    fn parse_global_and_module_levels() {
        let levels = LogLevels::parse("warn, ixa_vaccination::history=TRACE").unwrap();
        assert_eq!(levels.global, Some(LevelFilter::Warn));
        assert_eq!(
            levels.modules,
            vec![(HISTORY_MODULE.to_string(), LevelFilter::Trace)]
        );
        assert_eq!(LogLevels::parse("").unwrap(), LogLevels::default());
    }

    #[test]
    fn parse_rejects_unknown_level() {
        assert!(LogLevels::parse("loud").is_err());
        assert!(LogLevels::parse("ixa_vaccination=verbose").is_err());
    }
}
