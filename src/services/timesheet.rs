//! Pure time arithmetic over attendance timestamps. No I/O, no clock access;
//! callers pass immutable snapshots and get hour-denominated metrics back.

use chrono::{DateTime, Utc};

use crate::database::models::{
    AttendanceHistoryEntry, AttendanceRecordWithBreaks, BreakInterval, UserInfo,
};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Elapsed hours between check-in and check-out. `None` while the record is
/// still open, so callers can tell "not yet computable" from a genuine zero.
pub fn total_hours(check_in: DateTime<Utc>, check_out: Option<DateTime<Utc>>) -> Option<f64> {
    check_out.map(|out| {
        let millis = (out - check_in).num_milliseconds();
        (millis.max(0) as f64) / MILLIS_PER_HOUR
    })
}

/// Sum of closed break durations in hours. An open break (no end time)
/// contributes exactly 0 until it is closed.
pub fn break_hours(breaks: &[BreakInterval]) -> f64 {
    breaks
        .iter()
        .filter_map(|b| {
            b.end_time
                .map(|end| (end - b.start_time).num_milliseconds().max(0) as f64 / MILLIS_PER_HOUR)
        })
        .sum()
}

/// Attendance minus breaks, floored at zero so anomalous data (recorded break
/// time exceeding recorded attendance time) never surfaces as a negative.
pub fn effective_hours(total: f64, break_total: f64) -> f64 {
    (total - break_total).max(0.0)
}

/// Fixed 2-decimal display rounding. Internal computation stays at full
/// float precision until this edge.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Assemble a history entry with all three derived metrics for one record.
pub fn history_entry(
    loaded: AttendanceRecordWithBreaks,
    user: Option<UserInfo>,
) -> AttendanceHistoryEntry {
    let AttendanceRecordWithBreaks { record, breaks } = loaded;

    let total = total_hours(record.check_in_time, record.check_out_time);
    let break_total = break_hours(&breaks);
    let effective = total.map(|t| effective_hours(t, break_total));

    AttendanceHistoryEntry {
        total_hours: total.map(round_hours),
        break_hours: round_hours(break_total),
        effective_hours: effective.map(round_hours),
        record,
        breaks,
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn closed_break(start: DateTime<Utc>, end: DateTime<Utc>) -> BreakInterval {
        BreakInterval {
            id: "b1".to_string(),
            attendance_record_id: "a1".to_string(),
            start_time: start,
            end_time: Some(end),
        }
    }

    #[test]
    fn total_hours_is_none_while_open() {
        assert_eq!(total_hours(ts(9, 0), None), None);
    }

    #[test]
    fn total_hours_is_non_negative() {
        // Clock skew: check-out recorded before check-in clamps to zero.
        assert_eq!(total_hours(ts(9, 0), Some(ts(8, 0))), Some(0.0));
        assert!(total_hours(ts(9, 0), Some(ts(17, 0))).unwrap() >= 0.0);
    }

    #[test]
    fn open_break_contributes_zero() {
        let breaks = vec![BreakInterval {
            id: "b1".to_string(),
            attendance_record_id: "a1".to_string(),
            start_time: ts(12, 0),
            end_time: None,
        }];
        assert!(breaks[0].is_open());
        assert_eq!(break_hours(&breaks), 0.0);
    }

    #[test]
    fn break_hours_sums_closed_intervals() {
        let breaks = vec![
            closed_break(ts(10, 0), ts(10, 15)),
            closed_break(ts(12, 0), ts(12, 30)),
        ];
        assert_eq!(round_hours(break_hours(&breaks)), 0.75);
    }

    #[test]
    fn effective_hours_never_negative() {
        assert_eq!(effective_hours(1.0, 2.5), 0.0);
        assert_eq!(effective_hours(8.0, 0.5), 7.5);
    }

    #[test]
    fn standard_work_day_scenario() {
        // Check-in 09:00, break 12:00-12:30, check-out 17:00.
        let total = total_hours(ts(9, 0), Some(ts(17, 0))).unwrap();
        let breaks = vec![closed_break(ts(12, 0), ts(12, 30))];
        let break_total = break_hours(&breaks);

        assert_eq!(round_hours(total), 8.00);
        assert_eq!(round_hours(break_total), 0.50);
        assert_eq!(round_hours(effective_hours(total, break_total)), 7.50);
    }

    #[test]
    fn rounding_is_two_decimal() {
        // 10 minutes = 0.1666... hours
        let total = total_hours(ts(9, 0), Some(ts(9, 10))).unwrap();
        assert_eq!(round_hours(total), 0.17);
    }
}
