//! Timing helpers for the generation pipeline.

use std::time::Instant;

/// RAII timer that logs elapsed time on drop.
///
/// # Example
/// ```ignore
/// let _t = Timed::debug("Streets");
/// // ... build streets ...
/// // logs "Streets: 1.234ms" when _t is dropped
/// ```
pub(crate) struct Timed {
    name: &'static str,
    start: Instant,
    level: log::Level,
}

impl Timed {
    /// Timer that reports at INFO level.
    pub(crate) fn info(name: &'static str) -> Self {
        log::debug!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Info,
        }
    }

    /// Timer that reports at DEBUG level.
    pub(crate) fn debug(name: &'static str) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
            level: log::Level::Debug,
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::log!(self.level, "{}: {:.3?}", self.name, self.start.elapsed());
    }
}
