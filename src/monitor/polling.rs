use crate::constants::{DEFAULT_MONITOR_INTERVAL_MS, POLLING_INTERVAL_MAX, POLLING_INTERVAL_MIN};
use crate::models::{MonitorError, ResourceStatus};
use crate::monitor::{MonitorInner, ResourceMonitor};
use crate::probe::SystemProbe;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Options for continuous monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitoringOptions {
    /// Time between status reports. Zero means the default.
    pub interval: Duration,
}

impl MonitoringOptions {
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Build from a user-supplied number of seconds, enforcing the bounds
    pub fn from_secs_f64(seconds: f64) -> Result<Self, MonitorError> {
        validate_interval(seconds)?;
        Ok(Self::with_interval(Duration::from_secs_f64(seconds)))
    }

    /// Interval with zero mapped to the default
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            Duration::from_millis(DEFAULT_MONITOR_INTERVAL_MS)
        } else {
            self.interval
        }
    }
}

impl Default for MonitoringOptions {
    fn default() -> Self {
        Self::with_interval(Duration::from_millis(DEFAULT_MONITOR_INTERVAL_MS))
    }
}

/// Check a polling interval in seconds against the supported range
pub fn validate_interval(seconds: f64) -> Result<(), MonitorError> {
    if !(POLLING_INTERVAL_MIN..=POLLING_INTERVAL_MAX).contains(&seconds) {
        return Err(MonitorError::InvalidInterval(seconds));
    }
    Ok(())
}

/// Spawn the repeating status task.
///
/// The first report comes one interval after the start. The task holds the
/// monitor weakly and ends once every monitor handle is gone.
pub(crate) fn spawn_polling<P, F>(
    monitor: Weak<MonitorInner<P>>,
    interval: Duration,
    callback: F,
) -> JoinHandle<()>
where
    P: SystemProbe,
    F: Fn(Arc<ResourceStatus>) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let Some(inner) = monitor.upgrade() else {
                break;
            };
            let status = ResourceMonitor { inner }.get_status().await;
            callback(status);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_bounds() {
        assert!(MonitoringOptions::from_secs_f64(0.1).is_ok());
        assert!(MonitoringOptions::from_secs_f64(300.0).is_ok());
        assert!(matches!(
            MonitoringOptions::from_secs_f64(0.05),
            Err(MonitorError::InvalidInterval(_))
        ));
        assert!(MonitoringOptions::from_secs_f64(301.0).is_err());
        assert!(MonitoringOptions::from_secs_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_interval_means_default() {
        let options = MonitoringOptions::with_interval(Duration::ZERO);
        assert_eq!(options.effective_interval(), Duration::from_millis(1000));
        assert_eq!(MonitoringOptions::default().effective_interval(), Duration::from_millis(1000));
    }
}
