use chrono::NaiveDate;
use serde::Serialize;

/// A consecutive-day counter as stored on `user_streaks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: i64,
    pub longest: i64,
    pub last: Option<NaiveDate>,
}

impl Streak {
    pub fn new(current: i64, longest: i64, last: Option<NaiveDate>) -> Self {
        Self { current, longest, last }
    }

    /// Advance the streak for activity on `day`.
    ///
    /// Same day leaves it untouched, the following day extends it, any gap
    /// restarts it at 1. A day earlier than `last` is a back-filled entry and
    /// does not move the streak.
    pub fn advance(self, day: NaiveDate) -> Streak {
        let current = match self.last {
            Some(last) if day <= last => return self,
            Some(last) if last.succ_opt() == Some(day) => self.current + 1,
            _ => 1,
        };

        Streak {
            current,
            longest: self.longest.max(current),
            last: Some(day),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn first_day_starts_at_one() {
        let s = Streak::new(0, 0, None).advance(day(1));
        assert_eq!(s, Streak::new(1, 1, Some(day(1))));
    }

    #[test]
    fn consecutive_days_extend() {
        let s = Streak::new(0, 0, None).advance(day(1)).advance(day(2)).advance(day(3));
        assert_eq!(s.current, 3);
        assert_eq!(s.longest, 3);
    }

    #[test]
    fn same_day_is_unchanged() {
        let s = Streak::new(4, 6, Some(day(10)));
        assert_eq!(s.advance(day(10)), s);
    }

    #[test]
    fn gap_resets_but_keeps_longest() {
        let s = Streak::new(5, 5, Some(day(10))).advance(day(12));
        assert_eq!(s, Streak::new(1, 5, Some(day(12))));
    }

    #[test]
    fn backfilled_day_is_ignored() {
        let s = Streak::new(3, 3, Some(day(10)));
        assert_eq!(s.advance(day(8)), s);
    }

    #[test]
    fn month_boundary_counts_as_consecutive() {
        let feb_end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let s = Streak::new(2, 2, Some(feb_end)).advance(day(1));
        assert_eq!(s.current, 3);
    }
}
