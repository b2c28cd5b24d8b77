//! Host configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the event loop and logging of the table host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Milliseconds between frame ticks; `0` turns the frame clock off.
    pub frame_interval_ms: u64,
    /// Directory for the log file. Logs only go to stderr when unset.
    pub log_dir: Option<PathBuf>,
    /// Capacity of the host event queue. Read it through
    /// [`ClientConfig::queue_capacity`], which never yields zero.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            log_dir: None,
            event_buffer: 64,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `GOLF_FRAME_INTERVAL_MS` - Frame clock period (default: 16, 0 disables)
    /// - `GOLF_LOG_DIR` - Log file directory (default: unset)
    /// - `GOLF_EVENT_BUFFER` - Event queue capacity (default: 64)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(interval) = read_env::<u64>("GOLF_FRAME_INTERVAL_MS") {
            config.frame_interval_ms = interval;
        }
        if let Some(dir) = env::var_os("GOLF_LOG_DIR").filter(|dir| !dir.is_empty()) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(capacity) = read_env::<usize>("GOLF_EVENT_BUFFER") {
            config.event_buffer = capacity;
        }

        config
    }

    /// Event queue capacity, at least one slot.
    pub fn queue_capacity(&self) -> usize {
        self.event_buffer.max(1)
    }

    /// Frame clock period, or `None` when the clock is disabled.
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_interval_ms > 0).then(|| Duration::from_millis(self.frame_interval_ms))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
