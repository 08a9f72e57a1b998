use omniflow_core::OmniflowError;
use omniflow_prompt::{TimeContext, TimeOfDay};

#[test]
fn tuesday_morning_is_weekday_commute() {
    let ctx = TimeContext::analyze("2024-05-14T07:30").expect("parse");
    assert_eq!(ctx.hour, 7);
    assert_eq!(ctx.time_of_day, TimeOfDay::MorningCommute);
    assert!(!ctx.is_weekend);
    assert_eq!(ctx.readable_date, "Tuesday, May 14");
}

#[test]
fn sunday_morning_is_weekend_commute_classification() {
    let ctx = TimeContext::analyze("2024-05-19T07:00").expect("parse");
    assert_eq!(ctx.time_of_day, TimeOfDay::MorningCommute);
    assert!(ctx.is_weekend);
}

#[test]
fn describe_renders_prompt_fragment() {
    let ctx = TimeContext::analyze("2024-05-14 17:05").expect("parse");
    assert_eq!(
        ctx.describe(),
        "Time: 17:00 (Evening Commute). Day: Tuesday, May 14 (Weekday)."
    );
}

#[test]
fn accepts_seconds_and_rfc3339_without_zone_conversion() {
    let ctx = TimeContext::analyze("2024-05-18T23:15:00").expect("parse");
    assert_eq!(ctx.time_of_day, TimeOfDay::Night);
    assert!(ctx.is_weekend);

    let ctx = TimeContext::analyze("2024-05-14T08:00:00-07:00").expect("parse");
    assert_eq!(ctx.hour, 8);
}

#[test]
fn forecast_hours_wrap() {
    let ctx = TimeContext::analyze("2024-12-31T21:00").expect("parse");
    assert_eq!(
        ctx.forecast_hours(),
        ["21:00", "22:00", "23:00", "00:00", "01:00"]
    );
}

#[test]
fn garbage_is_rejected() {
    let err = TimeContext::analyze("next tuesday").unwrap_err();
    assert!(matches!(err, OmniflowError::InvalidInput(_)));
}
