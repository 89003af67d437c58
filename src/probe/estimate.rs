//! Estimation fallbacks for hosts without usable instrumentation
//!
//! These are guesses, not measurements. The busy-loop timing in particular
//! depends on hardware speed and has not been calibrated against a reference
//! machine, so its constants are a starting point only.

use crate::constants::{
    BUSY_LOOP_BASELINE_PERCENT, BUSY_LOOP_CEILING_PERCENT, BUSY_LOOP_ITERATIONS,
    BUSY_LOOP_THRESHOLD_MS, DESKTOP_MEMORY_ESTIMATE, MOBILE_MEMORY_ESTIMATE,
};
use crate::models::{CpuInfo, CpuSource, EnvironmentProfile, MemoryInfo, MemorySource};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Device-class memory guess with half of the budget assumed in use
pub fn device_memory(profile: EnvironmentProfile) -> MemoryInfo {
    let total = match profile {
        EnvironmentProfile::Mobile => MOBILE_MEMORY_ESTIMATE,
        _ => DESKTOP_MEMORY_ESTIMATE,
    };
    let used = total / 2;

    MemoryInfo {
        available: total - used,
        total,
        used,
        source: MemorySource::DeviceEstimate,
    }
}

/// Time a fixed counting loop on the calling thread
pub fn time_reference_loop() -> Duration {
    let start = Instant::now();
    let mut counter = 0u64;
    for i in 0..BUSY_LOOP_ITERATIONS {
        counter = black_box(counter.wrapping_add(i));
    }
    black_box(counter);
    start.elapsed()
}

/// Map the reference loop duration to a usage estimate.
///
/// Below the threshold the system is assumed to sit at the baseline; above
/// it, usage grows with the delay up to the ceiling.
pub fn busy_loop_usage(elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms > BUSY_LOOP_THRESHOLD_MS {
        (BUSY_LOOP_BASELINE_PERCENT + elapsed_ms * 2.0).min(BUSY_LOOP_CEILING_PERCENT)
    } else {
        BUSY_LOOP_BASELINE_PERCENT
    }
}

/// Last-resort CPU reading
pub fn busy_loop_cpu(cores: usize) -> CpuInfo {
    CpuInfo {
        cores,
        usage_percent: busy_loop_usage(time_reference_loop()),
        source: CpuSource::BusyLoop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GB;

    #[test]
    fn test_device_memory_budgets() {
        let mobile = device_memory(EnvironmentProfile::Mobile);
        assert_eq!(mobile.total, 2 * GB);
        assert_eq!(mobile.available, GB);
        assert_eq!(mobile.used, GB);

        let desktop = device_memory(EnvironmentProfile::Development);
        assert_eq!(desktop.total, 4 * GB);
        assert_eq!(desktop.available + desktop.used, desktop.total);
        assert_eq!(desktop.source, MemorySource::DeviceEstimate);
    }

    #[test]
    fn test_fast_loop_reports_baseline() {
        assert_eq!(busy_loop_usage(Duration::from_millis(2)), 30.0);
        assert_eq!(busy_loop_usage(Duration::from_millis(10)), 30.0);
    }

    #[test]
    fn test_slow_loop_scales_and_caps() {
        assert_eq!(busy_loop_usage(Duration::from_millis(20)), 70.0);
        assert_eq!(busy_loop_usage(Duration::from_millis(500)), 90.0);
    }

    #[test]
    fn test_busy_loop_cpu_stays_in_range() {
        let cpu = busy_loop_cpu(4);
        assert_eq!(cpu.cores, 4);
        assert!((30.0..=90.0).contains(&cpu.usage_percent));
    }
}
