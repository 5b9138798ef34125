//! The search controller: deadline, node limit, and the cooperative stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One hour, used as a sentinel "no real deadline" for `depth`/`nodes`/`infinite` searches.
const NO_DEADLINE: Duration = Duration::from_secs(3600);

/// How the caller asked the searcher to budget its time, per the `go` command.
#[derive(Debug, Clone, Copy)]
pub enum GoSettings {
    Depth(u8),
    Nodes(u64),
    Movetime(u64),
    Time { own_remaining_ms: u64 },
    Infinite,
}

/// Deadline/node-limit/stop-flag owner. Written by the protocol thread,
/// polled cooperatively by the searcher at every node entry.
pub struct Controller {
    stop: Arc<AtomicBool>,
    start: Instant,
    deadline: Duration,
    max_nodes: u64,
    target_depth: u8,
}

impl Controller {
    /// Build a controller from the root `go` settings. See spec §4.6 step 2.
    pub fn new(settings: GoSettings, stop: Arc<AtomicBool>) -> Controller {
        let (deadline, max_nodes, target_depth) = match settings {
            GoSettings::Time { own_remaining_ms } => {
                let ms = (own_remaining_ms / 30).max(1);
                (Duration::from_millis(ms), u64::MAX, crate::search::MAX_DEPTH as u8)
            }
            GoSettings::Movetime(ms) => {
                (Duration::from_millis(ms), u64::MAX, crate::search::MAX_DEPTH as u8)
            }
            GoSettings::Depth(d) => (NO_DEADLINE, u64::MAX, d),
            GoSettings::Nodes(n) => (NO_DEADLINE, n, crate::search::MAX_DEPTH as u8),
            GoSettings::Infinite => (NO_DEADLINE, u64::MAX, crate::search::MAX_DEPTH as u8),
        };
        Controller { stop, start: Instant::now(), deadline, max_nodes, target_depth }
    }

    /// An already-running controller with no limits, for tests and `eval`.
    pub fn infinite() -> Controller {
        Controller::new(GoSettings::Infinite, Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    pub fn max_nodes(&self) -> u64 {
        self.max_nodes
    }

    #[inline]
    pub fn target_depth(&self) -> u8 {
        self.target_depth
    }

    /// `true` once the deadline has passed, the stop flag was set, or `nodes`
    /// reached the node budget.
    #[inline]
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if nodes >= self.max_nodes {
            return true;
        }
        self.start.elapsed() >= self.deadline
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_settings_allocate_one_thirtieth() {
        let stop = Arc::new(AtomicBool::new(false));
        let controller = Controller::new(GoSettings::Time { own_remaining_ms: 3000 }, stop);
        assert_eq!(controller.deadline, Duration::from_millis(100));
    }

    #[test]
    fn time_settings_clamp_to_at_least_1ms() {
        let stop = Arc::new(AtomicBool::new(false));
        let controller = Controller::new(GoSettings::Time { own_remaining_ms: 5 }, stop);
        assert_eq!(controller.deadline, Duration::from_millis(1));
    }

    #[test]
    fn depth_settings_have_no_real_deadline() {
        let stop = Arc::new(AtomicBool::new(false));
        let controller = Controller::new(GoSettings::Depth(6), stop);
        assert_eq!(controller.target_depth(), 6);
        assert_eq!(controller.max_nodes(), u64::MAX);
    }

    #[test]
    fn nodes_settings_cap_node_budget() {
        let stop = Arc::new(AtomicBool::new(false));
        let controller = Controller::new(GoSettings::Nodes(1_000), stop);
        assert_eq!(controller.max_nodes(), 1_000);
        assert!(controller.should_stop(1_000));
        assert!(!controller.should_stop(999));
    }

    #[test]
    fn stop_flag_is_observed() {
        let stop = Arc::new(AtomicBool::new(false));
        let controller = Controller::new(GoSettings::Infinite, Arc::clone(&stop));
        assert!(!controller.should_stop(0));
        stop.store(true, Ordering::Relaxed);
        assert!(controller.should_stop(0));
    }
}
