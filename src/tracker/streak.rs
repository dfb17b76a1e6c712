//! Daily completion streak

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Consecutive days with at least one completed task
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completion_date: Option<NaiveDate>,
}

impl StreakState {
    /// Record a completion on `today`.
    ///
    /// Same day is a no-op, the next day extends the streak, and any longer
    /// gap starts over at 1. A clock that moved backwards leaves the count
    /// alone but still stamps the date.
    pub fn record_completion(&mut self, today: NaiveDate) {
        match self.last_completion_date {
            Some(last) if last == today => return,
            None => self.streak = 1,
            Some(last) => {
                let gap = (today - last).num_days();
                if gap == 1 {
                    self.streak += 1;
                } else if gap > 1 {
                    self.streak = 1;
                }
            }
        }
        self.last_completion_date = Some(today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_first_completion_starts_streak() {
        let mut s = StreakState::default();
        s.record_completion(day(1));
        assert_eq!(s.streak, 1);
        assert_eq!(s.last_completion_date, Some(day(1)));
    }

    #[test]
    fn test_consecutive_days_extend() {
        let mut s = StreakState::default();
        for d in 1..=4 {
            s.record_completion(day(d));
            s.record_completion(day(d));
        }
        assert_eq!(s.streak, 4);
    }

    #[test]
    fn test_gap_resets() {
        let mut s = StreakState {
            streak: 6,
            last_completion_date: Some(day(1)),
        };
        s.record_completion(day(3));
        assert_eq!(s.streak, 1);
        assert_eq!(s.last_completion_date, Some(day(3)));
    }

    #[test]
    fn test_backwards_clock_keeps_count() {
        let mut s = StreakState {
            streak: 3,
            last_completion_date: Some(day(10)),
        };
        s.record_completion(day(9));
        assert_eq!(s.streak, 3);
        assert_eq!(s.last_completion_date, Some(day(9)));
    }
}
