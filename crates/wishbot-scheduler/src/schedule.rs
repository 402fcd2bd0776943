//! Daily anchor schedule.
//!
//! The first fire lands on the next occurrence of the anchor time. After
//! each fire the next one is the following day's anchor in local time, so
//! time spent inside a run never shifts the cadence and a daylight-saving
//! change does not move it off the wall clock.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};

/// Fallback step when no local anchor exists on the following day.
pub fn daily_interval() -> Duration {
    Duration::hours(24)
}

/// Next occurrence of `anchor` at or after `now`.
///
/// If `now` is already past today's anchor the result is tomorrow's anchor.
pub fn next_anchor_after<Tz: TimeZone>(now: &DateTime<Tz>, anchor: NaiveTime) -> DateTime<Tz> {
    let today = now.date_naive();
    match anchor_on(&now.timezone(), today, anchor) {
        Some(candidate) if candidate >= *now => candidate,
        _ => today
            .succ_opt()
            .and_then(|tomorrow| anchor_on(&now.timezone(), tomorrow, anchor))
            .unwrap_or_else(|| now.clone() + daily_interval()),
    }
}

/// Local `date` at `anchor`. An anchor inside a DST gap moves one hour later.
fn anchor_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate, anchor: NaiveTime) -> Option<DateTime<Tz>> {
    let naive = date.and_time(anchor);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}

/// When the scheduler fires next.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState<Tz: TimeZone> {
    next_fire_at: DateTime<Tz>,
    anchor: NaiveTime,
}

impl<Tz: TimeZone> ScheduleState<Tz> {
    /// First fire at the next anchor after `now`.
    pub fn starting_at(now: &DateTime<Tz>, anchor: NaiveTime) -> Self {
        Self {
            next_fire_at: next_anchor_after(now, anchor),
            anchor,
        }
    }

    pub fn next_fire_at(&self) -> &DateTime<Tz> {
        &self.next_fire_at
    }

    pub fn anchor(&self) -> NaiveTime {
        self.anchor
    }

    /// Time left until the next fire, zero if it is due.
    pub fn delay_from(&self, now: &DateTime<Tz>) -> std::time::Duration {
        (self.next_fire_at.clone() - now.clone())
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    pub fn is_due(&self, now: &DateTime<Tz>) -> bool {
        *now >= self.next_fire_at
    }

    /// Move to the following fire time after a run.
    ///
    /// The next fire is the first local anchor strictly after both the
    /// previous fire and `now`. Days whose anchor already passed are skipped,
    /// never caught up. Returns the number of skipped days.
    pub fn advance(&mut self, now: &DateTime<Tz>) -> u32 {
        let previous = self.next_fire_at.clone();
        let from = previous.clone().max(now.clone()) + Duration::seconds(1);
        self.next_fire_at = next_anchor_after(&from, self.anchor);

        let days = (self.next_fire_at.date_naive() - previous.date_naive()).num_days();
        u32::try_from(days - 1).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, LocalResult, NaiveDateTime, Timelike, Utc};

    /// A zone that springs forward on 2026-03-08: 02:00 at UTC-5 becomes 03:00 at UTC-4.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn standard() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn daylight() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }

        fn local(h: u32) -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2026, 3, 8)
                .and_then(|d| d.and_hms_opt(h, 0, 0))
                .unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            if *local < Self::local(2) {
                LocalResult::Single(Self::standard())
            } else if *local < Self::local(3) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::daylight())
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // 02:00 local standard time is 07:00 UTC.
            if *utc < Self::local(7) {
                Self::standard()
            } else {
                Self::daylight()
            }
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, h, m, s).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn test_before_anchor_targets_today() {
        let next = next_anchor_after(&at(7, 15, 0), nine());
        assert_eq!(next, at(9, 0, 0));
    }

    #[test]
    fn test_after_anchor_targets_tomorrow() {
        let now = at(9, 0, 1);
        let next = next_anchor_after(&now, nine());
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap());

        let state = ScheduleState::starting_at(&now, nine());
        assert_eq!(
            state.delay_from(&now),
            std::time::Duration::from_secs(24 * 3600 - 1)
        );
    }

    #[test]
    fn test_exactly_at_anchor_fires_now() {
        let now = at(9, 0, 0);
        let state = ScheduleState::starting_at(&now, nine());
        assert_eq!(state.delay_from(&now), std::time::Duration::ZERO);
        assert!(state.is_due(&now));
    }

    #[test]
    fn test_month_rollover() {
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap();
        let next = next_anchor_after(&now, nine());
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_advance_does_not_drift() {
        let mut state = ScheduleState::starting_at(&at(8, 0, 0), nine());
        // The run took 42 seconds.
        let skipped = state.advance(&at(9, 0, 42));
        assert_eq!(skipped, 0);
        assert_eq!(
            *state.next_fire_at(),
            Utc.with_ymd_and_hms(2026, 1, 3, 9, 0, 0).unwrap()
        );
        assert_eq!(state.next_fire_at().second(), 0);
    }

    #[test]
    fn test_advance_skips_missed_days() {
        let mut state = ScheduleState::starting_at(&at(8, 0, 0), nine());
        let late = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let skipped = state.advance(&late);
        assert_eq!(skipped, 3);
        assert_eq!(
            *state.next_fire_at(),
            Utc.with_ymd_and_hms(2026, 1, 6, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_anchor_holds_across_dst_change() {
        let now = SpringForward.with_ymd_and_hms(2026, 3, 7, 8, 0, 0).unwrap();
        let mut state = ScheduleState::starting_at(&now, nine());

        let mut fires = vec![state.next_fire_at().clone()];
        for _ in 0..2 {
            let after_run = state.next_fire_at().clone() + Duration::seconds(30);
            assert_eq!(state.advance(&after_run), 0);
            fires.push(state.next_fire_at().clone());
        }

        for fire in &fires {
            assert_eq!((fire.hour(), fire.minute(), fire.second()), (9, 0, 0));
        }
        let days: Vec<u32> = fires.iter().map(|f| f.day()).collect();
        assert_eq!(days, vec![7, 8, 9]);
        // The day of the change is an hour short.
        assert_eq!(fires[1].clone() - fires[0].clone(), Duration::hours(23));
        assert_eq!(fires[2].clone() - fires[1].clone(), Duration::hours(24));
    }

    #[test]
    fn test_anchor_in_dst_gap_moves_later() {
        let now = SpringForward.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap();
        let next = next_anchor_after(&now, NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        assert_eq!(
            next.naive_local(),
            SpringForward::local(3) + Duration::minutes(30)
        );

        // The next day is back on the configured time.
        let mut state = ScheduleState::starting_at(&now, NaiveTime::from_hms_opt(2, 30, 0).unwrap());
        state.advance(&next);
        assert_eq!((state.next_fire_at().day(), state.next_fire_at().hour()), (9, 2));
    }

    #[test]
    fn test_delay_is_zero_when_overdue() {
        let state = ScheduleState::starting_at(&at(8, 0, 0), nine());
        assert_eq!(state.delay_from(&at(10, 0, 0)), std::time::Duration::ZERO);
    }
}
