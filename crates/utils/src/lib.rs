use config::{PrintCounterType, BANNER_WIDTH, MIN_PRINT_INTERVAL_MS};
use std::time::Duration;

pub struct Utils;

impl Utils {
    /// Blocks the calling thread for `duration`
    #[inline(always)]
    pub fn delay(duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }

    /// The sleep between two prints of a worker, once the time spent holding the console
    /// is discounted. Never shorter than `MIN_PRINT_INTERVAL_MS`.
    pub fn adjusted_print_interval(print_interval: Duration) -> Duration {
        let min_interval = Duration::from_millis(MIN_PRINT_INTERVAL_MS);
        if print_interval > min_interval {
            print_interval - min_interval
        } else {
            min_interval
        }
    }

    pub fn format_print_report(thread_id: u16, num_prints: PrintCounterType) -> String {
        let banner = "-".repeat(BANNER_WIDTH);
        format!(
            "{banner}\nRunning thread with ID {}!\nNumber of performed prints: {}\n{banner}\n\n",
            thread_id, num_prints
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjusted_interval() {
        assert_eq!(
            Utils::adjusted_print_interval(Duration::from_millis(1000)),
            Duration::from_millis(990)
        );
        assert_eq!(
            Utils::adjusted_print_interval(Duration::from_millis(11)),
            Duration::from_millis(1)
        );
        assert_eq!(
            Utils::adjusted_print_interval(Duration::from_millis(10)),
            Duration::from_millis(10)
        );
        assert_eq!(
            Utils::adjusted_print_interval(Duration::ZERO),
            Duration::from_millis(10)
        );
    }

    #[test]
    fn print_report_layout() {
        let report = Utils::format_print_report(2, 17);
        let lines: Vec<_> = report.split('\n').collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "-".repeat(80));
        assert_eq!(lines[1], "Running thread with ID 2!");
        assert_eq!(lines[2], "Number of performed prints: 17");
        assert_eq!(lines[3], lines[0]);
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "");
    }

    #[test]
    fn zero_delay_returns_immediately() {
        let start = std::time::Instant::now();
        Utils::delay(Duration::ZERO);
        assert!(start.elapsed() < Duration::from_millis(5));
    }
}
