//! Used when the crate is built without the `logging` feature. Nothing is installed as the
//! global logger, so log messages go nowhere, but `log::max_level()` still follows the
//! configured levels and the macros skip formatting when logging is off.
use crate::log::LogConfiguration;

impl LogConfiguration {
    /// Sets the global logger to conform to this `LogConfiguration`.
    pub(in crate::log) fn set_config(&mut self) {
        log::set_max_level(self.max_level());
    }
}
