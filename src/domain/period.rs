use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Aggregation window for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Some(Period::Daily),
            "weekly" => Some(Period::Weekly),
            "monthly" => Some(Period::Monthly),
            _ => None,
        }
    }

    /// Parse a period selector, falling back to `Daily` for anything unknown.
    pub fn from_str_or_daily(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Start of the current period, at local midnight in `now`'s time zone.
    ///
    /// Weeks start on Sunday. Months start on the 1st.
    pub fn start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        let today = now.date_naive();
        let first_day = match self {
            Period::Daily => today,
            Period::Weekly => {
                let days_since_sunday = today.weekday().num_days_from_sunday();
                today - Duration::days(i64::from(days_since_sunday))
            }
            Period::Monthly => today.with_day(1).unwrap_or(today),
        };
        local_midnight(&now.timezone(), first_day)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First existing instant of `date` in `tz`. Zones that skip midnight on a
/// DST change start the day at the first hour that exists.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|hour| {
            tz.from_local_datetime(&(midnight + Duration::hours(hour)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_period_roundtrip() {
        for p in [Period::Daily, Period::Weekly, Period::Monthly] {
            assert_eq!(Period::from_str(p.as_str()), Some(p));
        }
    }

    #[test]
    fn test_unknown_period_falls_back_to_daily() {
        assert_eq!(Period::from_str("yearly"), None);
        assert_eq!(Period::from_str_or_daily("yearly"), Period::Daily);
        assert_eq!(Period::from_str_or_daily(""), Period::Daily);
        assert_eq!(Period::from_str_or_daily("WEEKLY"), Period::Weekly);
    }

    #[test]
    fn test_daily_start() {
        // Wednesday
        let now = at("2024-01-17T15:30:00Z");
        assert_eq!(Period::Daily.start(&now), at("2024-01-17T00:00:00Z"));
    }

    #[test]
    fn test_weekly_start_is_sunday() {
        let now = at("2024-01-17T15:30:00Z");
        assert_eq!(Period::Weekly.start(&now), at("2024-01-14T00:00:00Z"));

        // On a Sunday the week starts that same day
        let sunday = at("2024-01-14T09:00:00Z");
        assert_eq!(Period::Weekly.start(&sunday), at("2024-01-14T00:00:00Z"));
    }

    #[test]
    fn test_weekly_start_crosses_month() {
        // Thursday 1 Feb 2024 -> Sunday 28 Jan 2024
        let now = at("2024-02-01T08:00:00Z");
        assert_eq!(Period::Weekly.start(&now), at("2024-01-28T00:00:00Z"));
    }

    #[test]
    fn test_monthly_start() {
        let now = at("2024-03-31T23:59:59Z");
        assert_eq!(Period::Monthly.start(&now), at("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn test_start_uses_local_midnight() {
        // 01:00 on the 17th in UTC+7 is still the 16th in UTC
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = at("2024-01-16T18:00:00Z").with_timezone(&jakarta);

        assert_eq!(Period::Daily.start(&now), at("2024-01-16T17:00:00Z"));
    }
}
