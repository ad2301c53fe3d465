//! Pure request validators. Each returns the full list of problems so
//! callers can surface every message at once; an empty list means the
//! input is acceptable. Nothing here touches the database.

use chrono::{DateTime, NaiveTime, Utc};

use crate::schedule;

pub const MAX_AMOUNT_CENTS: i64 = 99_999_999; // 999,999.99

pub const GROUP_MAX_MEMBERS: usize = 100;

pub fn validate_client_fields(
    name: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = name {
        if name.trim().is_empty() {
            errors.push("Name is required".to_string());
        } else if name.len() > 100 {
            errors.push("Name must be at most 100 characters".to_string());
        }
    }

    if let Some(username) = username {
        if username.len() < 3 || username.len() > 30 {
            errors.push("Username must be between 3 and 30 characters".to_string());
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            errors.push(
                "Username may only contain letters, digits, underscores and dots".to_string(),
            );
        }
    }

    if let Some(password) = password {
        if password.len() < 8 {
            errors.push("Password must be at least 8 characters".to_string());
        }
    }

    errors
}

pub fn validate_class_fields(
    title: &str,
    capacity: i32,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Vec<String> {
    let mut errors = Vec::new();

    if title.trim().is_empty() {
        errors.push("Title is required".to_string());
    } else if title.len() > 100 {
        errors.push("Title must be at most 100 characters".to_string());
    }

    if capacity < 1 {
        errors.push("Capacity must be a positive number".to_string());
    }

    if start_time >= end_time {
        errors.push("Start time must be before end time".to_string());
    }

    errors
}

/// Recurring creation validates the shared template plus the day tokens;
/// an inverted date range is deliberately not an error here (it expands
/// to zero sessions).
pub fn validate_recurring_class(
    title: &str,
    capacity: i32,
    start_time: NaiveTime,
    end_time: NaiveTime,
    days: &[String],
) -> Vec<String> {
    let mut errors = validate_class_fields(title, capacity, start_time, end_time);

    for day in days {
        if schedule::parse_weekday(day).is_none() {
            errors.push(format!("Unknown day token: {}", day));
        }
    }

    errors
}

pub fn validate_group_fields(
    name: &str,
    description: Option<&str>,
    member_count: usize,
    is_create: bool,
) -> Vec<String> {
    let mut errors = Vec::new();
    let min_name = if is_create { 3 } else { 2 };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.push("Group name is required".to_string());
    } else if trimmed.len() < min_name || trimmed.len() > 50 {
        errors.push(format!(
            "Group name must be between {} and 50 characters",
            min_name
        ));
    }

    if let Some(description) = description {
        if description.len() > 500 {
            errors.push("Description must be at most 500 characters".to_string());
        }
    }

    if member_count == 0 {
        errors.push("At least one client is required".to_string());
    } else if member_count > GROUP_MAX_MEMBERS {
        errors.push(format!(
            "A group may have at most {} clients",
            GROUP_MAX_MEMBERS
        ));
    }

    errors
}

pub fn validate_payment_fields(
    amount_cents: i64,
    payment_date: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    notes: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if amount_cents <= 0 {
        errors.push("Amount must be a positive number".to_string());
    } else if amount_cents > MAX_AMOUNT_CENTS {
        errors.push("Amount must be at most 999,999.99".to_string());
    }

    if valid_until <= payment_date {
        errors.push("Valid-until date must be after the payment date".to_string());
    }

    if let Some(notes) = notes {
        if notes.len() > 500 {
            errors.push("Notes must be at most 500 characters".to_string());
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn class_fields_collect_every_problem() {
        let errors = validate_class_fields("", 0, t(10, 0), t(9, 0));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn class_fields_accept_valid_input() {
        assert!(validate_class_fields("Yoga", 20, t(9, 0), t(10, 0)).is_empty());
    }

    #[test]
    fn recurring_rejects_unknown_day_tokens() {
        let days = vec!["Mon".to_string(), "Funday".to_string()];
        let errors = validate_recurring_class("Yoga", 10, t(9, 0), t(10, 0), &days);
        assert_eq!(errors, vec!["Unknown day token: Funday".to_string()]);
    }

    #[test]
    fn group_name_bounds_differ_between_create_and_edit() {
        // Two characters: too short for create, fine for edit
        assert!(!validate_group_fields("ab", None, 5, true).is_empty());
        assert!(validate_group_fields("ab", None, 5, false).is_empty());
    }

    #[test]
    fn group_member_count_is_bounded() {
        assert!(!validate_group_fields("Regulars", None, 0, true).is_empty());
        assert!(!validate_group_fields("Regulars", None, 101, true).is_empty());
        assert!(validate_group_fields("Regulars", None, 100, true).is_empty());
    }

    #[test]
    fn payment_amount_and_dates_are_checked() {
        let paid = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        assert!(validate_payment_fields(5000, paid, until, None).is_empty());
        assert!(!validate_payment_fields(0, paid, until, None).is_empty());
        assert!(!validate_payment_fields(MAX_AMOUNT_CENTS + 1, paid, until, None).is_empty());
        // valid_until equal to payment_date is rejected
        assert!(!validate_payment_fields(5000, paid, paid, None).is_empty());
    }
}
