//! Pomodoro countdown
//!
//! A tick-driven state machine; the caller owns the clock and calls
//! [`PomodoroTimer::tick`] once per elapsed second while running.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Pomodoro, TimerMode::ShortBreak, TimerMode::LongBreak];

    pub fn duration_secs(&self) -> u32 {
        match self {
            TimerMode::Pomodoro => 25 * 60,
            TimerMode::ShortBreak => 5 * 60,
            TimerMode::LongBreak => 15 * 60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "Pomodoro",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running { remaining: u32 },
    Finished,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroTimer {
    mode: TimerMode,
    remaining: u32,
    running: bool,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(TimerMode::default())
    }
}

impl PomodoroTimer {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            remaining: mode.duration_secs(),
            running: false,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switch modes. Refused while running; otherwise resets the countdown.
    pub fn set_mode(&mut self, mode: TimerMode) -> bool {
        if self.running {
            return false;
        }
        *self = Self::new(mode);
        true
    }

    /// Start or pause. Starting a finished countdown restarts it.
    pub fn toggle(&mut self) {
        if self.running {
            self.running = false;
            return;
        }
        if self.remaining == 0 {
            self.remaining = self.mode.duration_secs();
        }
        self.running = true;
    }

    pub fn reset(&mut self) {
        self.remaining = self.mode.duration_secs();
        self.running = false;
    }

    /// Whether `reset` would change anything
    pub fn can_reset(&self) -> bool {
        self.running || self.remaining != self.mode.duration_secs()
    }

    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Finished
        } else {
            Tick::Running {
                remaining: self.remaining,
            }
        }
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pomodoro_runs_down() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.display(), "25:00");
        assert!(!timer.can_reset());

        timer.toggle();
        let mut finished = 0;
        for _ in 0..(25 * 60) {
            if timer.tick() == Tick::Finished {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert_eq!(timer.display(), "00:00");
        assert!(!timer.is_running());
        assert_eq!(timer.tick(), Tick::Idle);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut timer = PomodoroTimer::new(TimerMode::ShortBreak);
        timer.toggle();
        timer.tick();
        timer.tick();
        timer.toggle();
        assert_eq!(timer.tick(), Tick::Idle);
        assert_eq!(timer.display(), "04:58");
        assert!(timer.can_reset());

        timer.toggle();
        assert_eq!(timer.tick(), Tick::Running { remaining: 297 });
    }

    #[test]
    fn test_mode_switch_refused_while_running() {
        let mut timer = PomodoroTimer::default();
        timer.toggle();
        assert!(!timer.set_mode(TimerMode::LongBreak));
        assert_eq!(timer.mode(), TimerMode::Pomodoro);

        timer.toggle();
        assert!(timer.set_mode(TimerMode::LongBreak));
        assert_eq!(timer.display(), "15:00");
    }

    #[test]
    fn test_restart_after_finish() {
        let mut timer = PomodoroTimer::new(TimerMode::ShortBreak);
        timer.toggle();
        while timer.tick() != Tick::Finished {}
        timer.toggle();
        assert!(timer.is_running());
        assert_eq!(timer.remaining(), 300);
    }

    #[test]
    fn test_reset() {
        let mut timer = PomodoroTimer::default();
        timer.toggle();
        timer.tick();
        timer.reset();
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 1500);
    }
}
