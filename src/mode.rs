//! Global Scatter/Chase/Scared timer.
//!
//! Scatter and Chase alternate on elapsed time. Scared interrupts either of
//! them and always hands control back to Chase. The scatter period shortens
//! once, when the first Chase period after the second Scatter period ends.

use tracing::debug;

use crate::clock::Millis;
use crate::config::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalMode {
    Scatter,
    Chase,
    Scared,
}

/// What changed during an [`ModeTimer::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    ToChase,
    ToScatter,
    ScaredExpired,
}

#[derive(Debug, Clone)]
pub struct ModeTimer {
    mode: GlobalMode,
    in_mode_ms: Millis,
    scatter_ms: Millis,
    scatter_short_ms: Millis,
    chase_ms: Millis,
    scared_ms: Millis,
    times_scattered: u32,
    shortened: bool,
}

impl ModeTimer {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            mode: GlobalMode::Scatter,
            in_mode_ms: 0,
            scatter_ms: tuning.scatter_ms,
            scatter_short_ms: tuning.scatter_short_ms,
            chase_ms: tuning.chase_ms,
            scared_ms: tuning.scared_ms,
            times_scattered: 0,
            shortened: false,
        }
    }

    pub fn mode(&self) -> GlobalMode {
        self.mode
    }

    pub fn scatter_duration(&self) -> Millis {
        self.scatter_ms
    }

    pub fn times_scattered(&self) -> u32 {
        self.times_scattered
    }

    /// Back to Scatter with fresh counters. The scatter duration keeps
    /// whatever value it had reached.
    pub fn restart(&mut self) {
        self.mode = GlobalMode::Scatter;
        self.in_mode_ms = 0;
    }

    /// Enter Scared. Re-triggering while Scared only restarts the timer.
    pub fn frighten(&mut self) {
        self.mode = GlobalMode::Scared;
        self.in_mode_ms = 0;
    }

    pub fn advance(&mut self, elapsed: Millis) -> Option<ModeChange> {
        self.in_mode_ms = self.in_mode_ms.saturating_add(elapsed);
        match self.mode {
            GlobalMode::Scatter if self.in_mode_ms >= self.scatter_ms => {
                self.times_scattered += 1;
                self.enter(GlobalMode::Chase);
                Some(ModeChange::ToChase)
            }
            GlobalMode::Chase if self.in_mode_ms >= self.chase_ms => {
                if self.times_scattered >= 2 && !self.shortened {
                    self.scatter_ms = self.scatter_short_ms;
                    self.shortened = true;
                    debug!(scatter_ms = self.scatter_ms, "scatter period shortened");
                }
                self.enter(GlobalMode::Scatter);
                Some(ModeChange::ToScatter)
            }
            GlobalMode::Scared if self.in_mode_ms >= self.scared_ms => {
                self.enter(GlobalMode::Chase);
                Some(ModeChange::ScaredExpired)
            }
            _ => None,
        }
    }

    fn enter(&mut self, mode: GlobalMode) {
        debug!(from = ?self.mode, to = ?mode, "global mode change");
        self.mode = mode;
        self.in_mode_ms = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> ModeTimer {
        ModeTimer::new(&Tuning::default())
    }

    #[test]
    fn starts_in_scatter_and_alternates() {
        let mut t = timer();
        assert_eq!(t.mode(), GlobalMode::Scatter);
        assert_eq!(t.advance(6999), None);
        assert_eq!(t.advance(1), Some(ModeChange::ToChase));
        assert_eq!(t.mode(), GlobalMode::Chase);
        assert_eq!(t.advance(19999), None);
        assert_eq!(t.advance(1), Some(ModeChange::ToScatter));
        assert_eq!(t.mode(), GlobalMode::Scatter);
    }

    #[test]
    fn scatter_shortens_once_after_second_period() {
        let mut t = timer();
        let mut durations = Vec::new();
        for _ in 0..6 {
            durations.push(t.scatter_duration());
            let scatter = t.scatter_duration();
            assert_eq!(t.advance(scatter), Some(ModeChange::ToChase));
            assert_eq!(t.advance(20000), Some(ModeChange::ToScatter));
        }
        assert_eq!(durations, vec![7000, 7000, 5000, 5000, 5000, 5000]);
    }

    #[test]
    fn scared_reverts_to_chase_not_scatter() {
        let mut t = timer();
        t.advance(100);
        t.frighten();
        assert_eq!(t.mode(), GlobalMode::Scared);
        assert_eq!(t.advance(5999), None);
        assert_eq!(t.advance(1), Some(ModeChange::ScaredExpired));
        assert_eq!(t.mode(), GlobalMode::Chase);
    }

    #[test]
    fn retrigger_resets_instead_of_stacking() {
        let mut t = timer();
        t.frighten();
        t.advance(5000);
        t.frighten();
        assert_eq!(t.advance(5000), None);
        assert_eq!(t.mode(), GlobalMode::Scared);
        assert_eq!(t.advance(1000), Some(ModeChange::ScaredExpired));
    }

    #[test]
    fn scared_pauses_the_alternation() {
        let mut t = timer();
        t.frighten();
        t.advance(6000);
        // Chase restarts from zero after Scared.
        assert_eq!(t.advance(19999), None);
        assert_eq!(t.times_scattered(), 0);
    }
}
