//! Console logging through `log4rs`.
//!
//! Every line carries the module that emitted it, so record, history and report messages can be
//! told apart and filtered with the same module paths passed to `set_module_filter()`.
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::runtime::ConfigBuilder;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::{LogConfiguration, ModuleLogConfiguration};

const APPENDER: &str = "stderr";
// ISO 8601 timestamp, color coded level tag and the emitting module
const DEFAULT_LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

impl From<&ModuleLogConfiguration> for Logger {
    fn from(module_config: &ModuleLogConfiguration) -> Self {
        Logger::builder().build(module_config.module.clone(), module_config.level)
    }
}

impl LogConfiguration {
    fn build_config(&self) -> Config {
        let console = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
            .build();
        let mut config: ConfigBuilder =
            Config::builder().appender(Appender::builder().build(APPENDER, Box::new(console)));
        for module_config in self.active_module_filters() {
            config = config.logger(module_config.into());
        }

        // The `Root` determines the global log level
        let root = Root::builder().appender(APPENDER).build(self.global_log_level);
        match config.build(root) {
            Ok(config) => config,
            Err(e) => panic!("failed to build logging config: {e}"),
        }
    }

    /// Sets the global logger to conform to this [`LogConfiguration`].
    pub(in crate::log) fn set_config(&mut self) {
        let config = self.build_config();
        match self.root_handle {
            // The global logger has already been installed
            Some(ref mut handle) => handle.set_config(config),
            None => match log4rs::init_config(config) {
                Ok(handle) => self.root_handle = Some(handle),
                Err(e) => panic!("failed to install logger: {e}"),
            },
        }
    }
}
