//! Process metrics backed by sysinfo.

use std::time::Instant;

use deckhand_events::{MetricsProvider, ProcessMetrics};
use parking_lot::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Reads host and current-process health through sysinfo.
pub struct SysinfoMetrics {
    system: Mutex<System>,
    pid: Pid,
    started: Instant,
}

impl SysinfoMetrics {
    /// Create a provider; uptime counts from this call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            pid: Pid::from_u32(std::process::id()),
            started: Instant::now(),
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoMetrics {
    fn sample(&self) -> Option<ProcessMetrics> {
        let mut sys = self.system.lock();
        sys.refresh_memory();
        let _ = sys.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), false);

        let memory_rss_bytes = sys.process(self.pid)?.memory();
        let load = System::load_average();

        Some(ProcessMetrics {
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            uptime_secs: self.started.elapsed().as_secs(),
            memory_rss_bytes,
            memory_total_bytes: sys.total_memory(),
            load: [load.one, load.five, load.fifteen],
        })
    }
}
