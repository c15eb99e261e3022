//! Next-run computation for cron schedules.

use {
    chrono::{DateTime, Utc},
    chrono_tz::Tz,
    cron::Schedule,
};

use crate::{Error, Result, types::CronSchedule};

/// Parse a cron expression, accepting the 5-field form.
///
/// The `cron` crate requires 6 or 7 fields (sec min hour dom month dow
/// [year]); a 5-field expression gets `0` seconds prepended and `*` year
/// appended.
pub fn parse_expression(expr: &str) -> Result<Schedule> {
    expr.parse::<Schedule>()
        .or_else(|_| format!("0 {expr} *").parse::<Schedule>())
        .map_err(|e| Error::invalid_expression(expr, e))
}

/// Compute the next run time (epoch millis) strictly after `now_ms`.
///
/// Returns `None` if the expression has no future occurrence.
pub fn compute_next_run(schedule: &CronSchedule, now_ms: u64) -> Result<Option<u64>> {
    let parsed = parse_expression(&schedule.expr)?;

    let now_dt =
        DateTime::from_timestamp_millis(now_ms as i64).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    let next = match schedule.tz {
        Some(tz) => parsed
            .after(&now_dt.with_timezone(&tz))
            .next()
            .map(|dt| dt.timestamp_millis() as u64),
        None => parsed
            .after(&now_dt)
            .next()
            .map(|dt| dt.timestamp_millis() as u64),
    };

    Ok(next)
}

/// Build a schedule that fires once per day at `hour:minute` local time.
pub fn daily_at(hour: u32, minute: u32, tz: Option<Tz>) -> Result<CronSchedule> {
    if hour > 23 || minute > 59 {
        return Err(Error::message(format!(
            "invalid time of day {hour:02}:{minute:02}"
        )));
    }
    Ok(CronSchedule::new(format!("{minute} {hour} * * *"), tz))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const FEB_1_2024_UTC_MS: u64 = 1_706_745_600_000; // 2024-02-01T00:00:00Z

    fn fmt_hm(ms: u64) -> String {
        DateTime::from_timestamp_millis(ms as i64)
            .unwrap()
            .format("%H:%M")
            .to_string()
    }

    #[test]
    fn five_field_utc() {
        let s = CronSchedule::new("0 9 * * *", None);
        let next = compute_next_run(&s, FEB_1_2024_UTC_MS).unwrap().unwrap();
        assert!(next > FEB_1_2024_UTC_MS);
        assert_eq!(fmt_hm(next), "09:00");
    }

    #[test]
    fn five_field_in_taipei() {
        // 08:00 Taipei = 00:00 UTC; strictly after midnight UTC means next day.
        let s = CronSchedule::new("0 8 * * *", Some(chrono_tz::Asia::Taipei));
        let next = compute_next_run(&s, FEB_1_2024_UTC_MS).unwrap().unwrap();
        assert_eq!(next, FEB_1_2024_UTC_MS + 86_400_000);
    }

    #[test]
    fn timezone_shifts_wall_clock() {
        let s = CronSchedule::new("0 9 * * *", Some(chrono_tz::Europe::Paris));
        let next = compute_next_run(&s, FEB_1_2024_UTC_MS).unwrap().unwrap();
        // 9:00 Paris = 08:00 UTC in winter.
        assert_eq!(fmt_hm(next), "08:00");
    }

    #[test]
    fn seconds_field_is_accepted() {
        let s = CronSchedule::new("*/10 * * * * *", None);
        let next = compute_next_run(&s, FEB_1_2024_UTC_MS).unwrap().unwrap();
        assert_eq!(next, FEB_1_2024_UTC_MS + 10_000);
    }

    #[test]
    fn invalid_expression() {
        let s = CronSchedule::new("not valid", None);
        assert!(matches!(
            compute_next_run(&s, 1000),
            Err(Error::InvalidExpression { .. })
        ));
    }

    #[rstest]
    #[case(8, 0, "0 8 * * *")]
    #[case(14, 30, "30 14 * * *")]
    #[case(0, 5, "5 0 * * *")]
    fn daily_at_builds_expression(#[case] hour: u32, #[case] minute: u32, #[case] expected: &str) {
        let s = daily_at(hour, minute, None).unwrap();
        assert_eq!(s.expr, expected);
        assert!(parse_expression(&s.expr).is_ok());
    }

    #[rstest]
    #[case(24, 0)]
    #[case(8, 60)]
    fn daily_at_rejects_out_of_range(#[case] hour: u32, #[case] minute: u32) {
        assert!(daily_at(hour, minute, None).is_err());
    }
}
