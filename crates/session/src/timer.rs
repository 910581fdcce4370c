//! Countdown timer for a focus session.

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not running; nothing changed
    Stopped,
    /// One second elapsed, time remains
    Counting(u32),
    /// This tick reached zero
    Finished,
}

/// Countdown state: remaining seconds plus a running flag.
///
/// The timer only counts; it never completes a session on its own. The
/// controller reacts to [`TickOutcome::Finished`], which is reported once
/// per countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTimer {
    duration_minutes: u32,
    remaining_seconds: u32,
    running: bool,
}

impl SessionTimer {
    /// A stopped timer holding the full duration.
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            remaining_seconds: duration_minutes.saturating_mul(60),
            running: false,
        }
    }

    /// Restart from the full duration and run.
    pub fn start(&mut self) {
        self.remaining_seconds = self.total_seconds();
        self.running = true;
    }

    /// Stop counting, keeping the remaining time.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue from the current remaining time.
    pub fn resume(&mut self) {
        self.running = true;
    }

    /// Stop and restore the full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_seconds = self.total_seconds();
    }

    /// Advance one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running || self.remaining_seconds == 0 {
            return TickOutcome::Stopped;
        }

        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.running = false;
            TickOutcome::Finished
        } else {
            TickOutcome::Counting(self.remaining_seconds)
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn total_seconds(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds() - self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once the countdown has reached zero.
    pub fn is_finished(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Share of the duration already elapsed, 0 to 100.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 100.0;
        }
        self.elapsed_seconds() as f64 / total as f64 * 100.0
    }

    /// Remaining time as `m:ss`.
    pub fn display(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}

/// Format seconds as `m:ss` (`25:00`, `4:05`).
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_single_finish() {
        let mut timer = SessionTimer::new(1);
        timer.start();

        for _ in 0..59 {
            assert!(matches!(timer.tick(), TickOutcome::Counting(_)));
        }
        assert_eq!(timer.tick(), TickOutcome::Finished);
        assert_eq!(timer.tick(), TickOutcome::Stopped);
        assert!(timer.is_finished());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_keeps_remaining() {
        let mut timer = SessionTimer::new(25);
        timer.start();
        timer.tick();
        timer.tick();
        timer.pause();

        assert_eq!(timer.tick(), TickOutcome::Stopped);
        assert_eq!(timer.remaining_seconds(), 25 * 60 - 2);

        timer.resume();
        assert_eq!(timer.tick(), TickOutcome::Counting(25 * 60 - 3));
    }

    #[test]
    fn test_reset_restores_duration() {
        let mut timer = SessionTimer::new(5);
        timer.start();
        for _ in 0..30 {
            timer.tick();
        }
        timer.reset();
        assert_eq!(timer.remaining_seconds(), 300);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_display_and_progress() {
        let mut timer = SessionTimer::new(25);
        assert_eq!(timer.display(), "25:00");
        assert_eq!(timer.progress_percent(), 0.0);

        timer.start();
        for _ in 0..(25 * 60 - 245) {
            timer.tick();
        }
        assert_eq!(timer.display(), "4:05");
        assert_eq!(format_clock(59), "0:59");

        let mut half = SessionTimer::new(2);
        half.start();
        for _ in 0..60 {
            half.tick();
        }
        assert_eq!(half.progress_percent(), 50.0);
        assert_eq!(half.elapsed_seconds(), 60);
    }
}
