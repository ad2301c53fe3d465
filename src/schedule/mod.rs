use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Monday-start/Sunday-end bounds for the week `offset` weeks away from
/// the week containing `today`. Offset 0 is the current week.
pub fn week_bounds(today: NaiveDate, offset: i64) -> (NaiveDate, NaiveDate) {
    let days_from_monday = today.weekday().num_days_from_monday() as i64;
    let monday = today - Duration::days(days_from_monday) + Duration::days(offset * 7);
    let sunday = monday + Duration::days(6);
    (monday, sunday)
}

/// Strict `YYYY-MM-DD` parsing; anything else (including unpadded
/// components) is rejected.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Expand a calendar date to full-day instants: 00:00:00.000 through
/// 23:59:59.999, so a range query covers both edge dates.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_time(
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("constant time of day"),
    );
    (start, end)
}

/// Map a day token ("Sun" through "Sat") to its weekday.
pub fn parse_weekday(token: &str) -> Option<Weekday> {
    match token {
        "Sun" => Some(Weekday::Sun),
        "Mon" => Some(Weekday::Mon),
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Every date in `[start, end]` whose weekday is in `days`. An inverted
/// range or an empty day set yields no dates.
pub fn expand_weekly(start: NaiveDate, end: NaiveDate, days: &[Weekday]) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| days.contains(&d.weekday()))
        .collect()
}
