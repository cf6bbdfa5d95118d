/// A direction of change of the debounced level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edge {
    /// The switch closed
    Rising,
    /// The switch opened
    Falling,
}

/// A counting switch Schmitt trigger.
///
/// Every sample is compared with the previous one. Any difference restarts
/// the count, and the stable level only follows the raw level once the raw
/// level has been seen on `window` samples in a row:
///
/// ```text
///              __    ____________________________________
/// Raw    _____/  \/\/
///                    |<--------- window ---------->|
///                                                   _____
/// Stable __________________________________________/
/// ```
///
/// Unlike a press-first debouncer, this one reports nothing until the input
/// has settled. The added latency is the window, 20ms on the reference board,
/// which is noise compared to the one second resolution of the timer.
///
/// The counter counts samples at the current raw level, including the sample
/// that changed it, and saturates. A switch held for hours never wraps it
/// around into a second transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Debouncer {
    raw: bool,
    stable: bool,
    counter: u16,
    window: u16,
}

impl Debouncer {
    /// A debouncer that has been stable at `level` since forever.
    pub fn new(level: bool, window: u16) -> Self {
        Debouncer {
            raw: level,
            stable: level,
            counter: window,
            window,
        }
    }

    /// Feed one sample. Call this once per tick.
    pub fn sample(&mut self, raw: bool) -> Option<Edge> {
        if raw != self.raw {
            self.raw = raw;
            self.counter = 0;
        }
        self.counter = self.counter.saturating_add(1);
        if self.counter < self.window || self.stable == self.raw {
            return None;
        }
        self.stable = self.raw;
        Some(if self.stable {
            Edge::Rising
        } else {
            Edge::Falling
        })
    }

    /// The debounced level.
    pub fn stable(&self) -> bool {
        self.stable
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn feed(deb: &mut Debouncer, level: bool, n: usize) -> Option<Edge> {
        let mut last = None;
        for _ in 0..n {
            if let Some(e) = deb.sample(level) {
                assert!(last.is_none(), "two edges for one level");
                last = Some(e);
            }
        }
        last
    }

    #[test]
    fn rising_edge_on_the_window_th_sample() {
        let mut deb = Debouncer::new(false, 20);
        for _ in 0..19 {
            assert_eq!(deb.sample(true), None);
            assert!(!deb.stable());
        }
        assert_eq!(deb.sample(true), Some(Edge::Rising));
        assert!(deb.stable());
        assert_eq!(feed(&mut deb, true, 100), None);
    }

    #[test]
    fn falling_edge() {
        let mut deb = Debouncer::new(true, 20);
        assert_eq!(feed(&mut deb, false, 19), None);
        assert_eq!(deb.sample(false), Some(Edge::Falling));
        assert!(!deb.stable());
    }

    #[test]
    fn bounces_restart_the_window() {
        let mut deb = Debouncer::new(false, 20);
        assert_eq!(feed(&mut deb, true, 15), None);
        assert_eq!(deb.sample(false), None);
        assert_eq!(feed(&mut deb, true, 19), None);
        assert!(!deb.stable());
        assert_eq!(deb.sample(true), Some(Edge::Rising));
    }

    #[test]
    fn glitch_shorter_than_window_is_ignored() {
        let mut deb = Debouncer::new(false, 20);
        // toggling every 10 samples never settles
        for _ in 0..50 {
            assert_eq!(feed(&mut deb, true, 10), None);
            assert_eq!(feed(&mut deb, false, 10), None);
        }
        assert!(!deb.stable());
    }

    #[test]
    fn slow_signal_is_followed() {
        // changes no more often than once per window are all reported
        let mut deb = Debouncer::new(false, 20);
        for _ in 0..10 {
            assert_eq!(feed(&mut deb, true, 20), Some(Edge::Rising));
            assert_eq!(feed(&mut deb, false, 20), Some(Edge::Falling));
        }
    }

    #[test]
    fn counter_saturates() {
        let mut deb = Debouncer::new(false, 20);
        assert_eq!(feed(&mut deb, true, 200_000), Some(Edge::Rising));
        assert_eq!(deb.counter, u16::MAX);
        assert_eq!(feed(&mut deb, true, 10), None);
        assert!(deb.stable());
    }

    #[test]
    fn returning_to_stable_level_emits_nothing() {
        let mut deb = Debouncer::new(true, 20);
        assert_eq!(feed(&mut deb, false, 5), None);
        assert_eq!(feed(&mut deb, true, 50), None);
        assert!(deb.stable());
    }
}
