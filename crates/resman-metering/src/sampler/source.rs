//! Cumulative network counter sources

use std::fs;
use std::path::{Path, PathBuf};

use resman_common::{CounterSample, ResmanError, Result};
use tracing::debug;

/// Default location of the kernel's per-interface counters
pub const PROC_NET_DEV: &str = "/proc/net/dev";

/// Anything that can produce a snapshot of cumulative host byte counters
pub trait CounterSource: Send + Sync {
    fn read(&self) -> Result<CounterSample>;
}

impl<F> CounterSource for F
where
    F: Fn() -> Result<CounterSample> + Send + Sync,
{
    fn read(&self) -> Result<CounterSample> {
        self()
    }
}

/// Counters summed over every non-loopback interface in `/proc/net/dev`
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new(PROC_NET_DEV)
    }
}

impl CounterSource for ProcNetDev {
    fn read(&self) -> Result<CounterSample> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            ResmanError::HostCounters(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let (bytes_sent, bytes_received) = parse_net_dev(&content);
        Ok(CounterSample::new(bytes_sent, bytes_received))
    }
}

/// Sum `(bytes_sent, bytes_received)` over all interfaces except `lo`.
///
/// Header lines and lines that do not parse are ignored.
pub fn parse_net_dev(content: &str) -> (u64, u64) {
    let mut sent = 0u64;
    let mut received = 0u64;

    for line in content.lines() {
        // "  eth0: 1234 ..." (counters can be glued to the colon)
        let Some((iface, counters)) = line.split_once(':') else {
            continue;
        };
        let iface = iface.trim();
        if iface == "lo" || iface.contains('|') {
            continue;
        }

        let fields: Vec<&str> = counters.split_whitespace().collect();
        if fields.len() < 16 {
            debug!(iface, "Skipping short /proc/net/dev line");
            continue;
        }
        match (fields[0].parse::<u64>(), fields[8].parse::<u64>()) {
            (Ok(rx), Ok(tx)) => {
                received = received.saturating_add(rx);
                sent = sent.saturating_add(tx);
            }
            _ => debug!(iface, "Skipping unparseable /proc/net/dev line"),
        }
    }

    (sent, received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:  900000    1000    0    0    0     0          0         0   900000    1000    0    0    0     0       0          0
  eth0: 2000 20 0 0 0 0 0 0 1000 10 0 0 0 0 0 0
 wlan0:3000 30 0 0 0 0 0 0 500 5 0 0 0 0 0 0
";

    #[test]
    fn test_parse_net_dev_skips_loopback() {
        assert_eq!(parse_net_dev(SAMPLE), (1500, 5000));
    }

    #[test]
    fn test_parse_net_dev_ignores_garbage() {
        let content = "eth0: not numbers at all\nbogus line\n";
        assert_eq!(parse_net_dev(content), (0, 0));
        assert_eq!(parse_net_dev(""), (0, 0));
    }

    #[test]
    fn test_proc_net_dev_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = ProcNetDev::new(file.path());
        let sample = source.read().unwrap();
        assert_eq!(sample.bytes_sent, 1500);
        assert_eq!(sample.bytes_received, 5000);
    }

    #[test]
    fn test_proc_net_dev_missing_file() {
        let source = ProcNetDev::new("/nonexistent/net/dev");
        assert!(matches!(source.read(), Err(ResmanError::HostCounters(_))));
    }

    #[test]
    fn test_closure_source() {
        let source = || -> Result<CounterSample> { Ok(CounterSample::new(7, 9)) };
        assert_eq!(source.read().unwrap().bytes_received, 9);
    }
}
