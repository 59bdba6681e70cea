//! Donation cooldown arithmetic.
//!
//! Works purely on calendar dates, so there is no timezone or DST drift.

use serde::Serialize;
use time::{Date, Duration};

/// Minimum number of days between two whole-blood donations.
pub const ELIGIBILITY_WINDOW_DAYS: i64 = 56;

/// First date a donor may give again, or `None` if they never donated
/// (eligible now).
pub fn next_eligible_date(last_donation: Option<Date>) -> Option<Date> {
    // Saturates at Date::MAX instead of overflowing.
    last_donation.map(|d| d.saturating_add(Duration::days(ELIGIBILITY_WINDOW_DAYS)))
}

/// Whole days from `today` until the donor becomes eligible, 0 if already
/// eligible.
pub fn days_until_eligible(last_donation: Option<Date>, today: Date) -> u32 {
    match next_eligible_date(last_donation) {
        Some(next) => {
            let days = (next - today).whole_days();
            u32::try_from(days.max(0)).unwrap_or(u32::MAX)
        }
        None => 0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    #[serde(with = "crate::dates::option")]
    pub last_donation: Option<Date>,
    #[serde(with = "crate::dates::option")]
    pub next_eligible_date: Option<Date>,
    pub days_until_eligible: u32,
    pub eligible: bool,
}

impl Eligibility {
    pub fn evaluate(last_donation: Option<Date>, today: Date) -> Self {
        let days = days_until_eligible(last_donation, today);
        Self {
            last_donation,
            next_eligible_date: next_eligible_date(last_donation),
            days_until_eligible: days,
            eligible: days == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn next_date_is_fifty_six_days_later() {
        assert_eq!(
            next_eligible_date(Some(date!(2024 - 01 - 01))),
            Some(date!(2024 - 02 - 26))
        );
    }

    #[test]
    fn next_date_crosses_year_and_leap_day() {
        assert_eq!(
            next_eligible_date(Some(date!(2023 - 12 - 20))),
            Some(date!(2024 - 02 - 14))
        );
        assert_eq!(
            next_eligible_date(Some(date!(2024 - 02 - 01))),
            Some(date!(2024 - 03 - 28))
        );
    }

    #[test]
    fn days_remaining_counts_down_and_clamps() {
        let last = Some(date!(2024 - 01 - 01));
        assert_eq!(days_until_eligible(last, date!(2024 - 02 - 20)), 6);
        assert_eq!(days_until_eligible(last, date!(2024 - 02 - 26)), 0);
        assert_eq!(days_until_eligible(last, date!(2024 - 03 - 01)), 0);
        assert_eq!(days_until_eligible(last, date!(2024 - 01 - 01)), 56);
    }

    #[test]
    fn never_donated_is_eligible_now() {
        assert_eq!(next_eligible_date(None), None);
        assert_eq!(days_until_eligible(None, date!(2024 - 06 - 15)), 0);

        let e = Eligibility::evaluate(None, date!(2024 - 06 - 15));
        assert!(e.eligible);
        assert_eq!(e.next_eligible_date, None);
    }

    #[test]
    fn eligibility_serializes_dates_as_plain_strings() {
        let e = Eligibility::evaluate(Some(date!(2024 - 01 - 01)), date!(2024 - 02 - 20));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["lastDonation"], "2024-01-01");
        assert_eq!(json["nextEligibleDate"], "2024-02-26");
        assert_eq!(json["daysUntilEligible"], 6);
        assert_eq!(json["eligible"], false);
    }
}
