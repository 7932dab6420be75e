use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeDelta, Utc};

/// Weekly partner refresh slot: Sunday, 02:00 UTC.
pub const REFRESH_HOUR_UTC: i64 = 2;

/// Next refresh slot strictly after `now`.
pub fn next_weekly_run(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_until_sunday = (7 - now.weekday().num_days_from_sunday()) % 7;
    let sunday = now.date_naive() + Days::new(u64::from(days_until_sunday));
    let slot = sunday.and_time(NaiveTime::MIN).and_utc() + TimeDelta::hours(REFRESH_HOUR_UTC);

    if slot > now {
        slot
    } else {
        slot + TimeDelta::days(7)
    }
}

pub fn until_next_run(now: DateTime<Utc>) -> Duration {
    (next_weekly_run(now) - now).to_std().unwrap_or(Duration::ZERO)
}
