//! Global constants for headroom
//!
//! Centralized location for application-wide constants

/// Application subsystem identifier used as the log target for structured events
pub const APP_SUBSYSTEM: &str = "com.microsoft.sysinternals.headroom";

/// Environment variable that marks a development build of the host application
pub const DEV_ENV_VAR: &str = "HEADROOM_ENV";

/// Size units (binary)
pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// Status snapshots younger than this are served from cache
pub const DEFAULT_CACHE_TIMEOUT_MS: u64 = 5000;

/// Default tick of the monitoring task
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 1000;

/// Capacity of the operation history ring buffer
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Upper bound on a single storage quota read
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 2000;

/// Polling interval bounds in seconds for the `watch` command and config file
pub const POLLING_INTERVAL_MIN: f64 = 0.1;
pub const POLLING_INTERVAL_MAX: f64 = 300.0;

/// Device-class memory budgets used when the host exposes no memory figures
pub const MOBILE_MEMORY_ESTIMATE: u64 = 2 * GB;
pub const DESKTOP_MEMORY_ESTIMATE: u64 = 4 * GB;

/// Core count assumed when the host does not report one
pub const DEFAULT_CPU_CORES: usize = 4;

/// Busy-loop CPU estimate parameters. Hardware dependent, not calibrated.
pub const BUSY_LOOP_ITERATIONS: u64 = 1_000_000;
pub const BUSY_LOOP_THRESHOLD_MS: f64 = 10.0;
pub const BUSY_LOOP_BASELINE_PERCENT: f64 = 30.0;
pub const BUSY_LOOP_CEILING_PERCENT: f64 = 90.0;

/// Exit code of `headroom check` when the operation is not safe to run
pub const EXIT_UNSAFE: u8 = 2;
