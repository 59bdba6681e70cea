//! Read-only directory queries over the donor store.

use std::cmp::Reverse;

use super::{DonorStore, User};

pub const DEFAULT_LATEST_LIMIT: usize = 3;

/// Optional directory filters. `None` or a blank value lets every donor pass.
#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
    pub blood_group: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

fn active(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// A [`DonorFilter`] with blank terms dropped and the rest trimmed and
/// lowercased, ready to test many users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveTerms {
    blood_group: Option<String>,
    location: Option<String>,
    search: Option<String>,
}

impl DonorFilter {
    pub fn active_terms(&self) -> ActiveTerms {
        ActiveTerms {
            blood_group: active(&self.blood_group),
            location: active(&self.location),
            search: active(&self.search),
        }
    }

    /// True when `user` passes every active filter.
    pub fn matches(&self, user: &User) -> bool {
        self.active_terms().matches(user)
    }
}

impl ActiveTerms {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(group) = &self.blood_group {
            if !user.blood_group.label().eq_ignore_ascii_case(group) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            if !(contains_ci(&user.city, location) || contains_ci(&user.state, location)) {
                return false;
            }
        }

        if let Some(term) = &self.search {
            if !(contains_ci(&user.full_name, term)
                || contains_ci(&user.city, term)
                || contains_ci(&user.state, term))
            {
                return false;
            }
        }

        true
    }
}

/// Parses a raw `limit` query value from its leading integer, so `"10abc"`
/// reads as 10 and `"2.9"` as 2. Anything without a leading integer, or not
/// positive, falls back to [`DEFAULT_LATEST_LIMIT`].
pub fn resolve_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim_start) else {
        return DEFAULT_LATEST_LIMIT;
    };
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..digits];
    if negative || digits.is_empty() || digits.bytes().all(|b| b == b'0') {
        return DEFAULT_LATEST_LIMIT;
    }
    // More digits than fit in usize still means "everyone".
    digits.parse().unwrap_or(usize::MAX)
}

impl DonorStore {
    /// Directory listing: every user passing `filter`, in insertion order.
    pub fn all_donors_filtered(&self, filter: &DonorFilter) -> Vec<User> {
        let terms = filter.active_terms();
        self.get_all_users()
            .into_iter()
            .filter(|u| terms.matches(u))
            .collect()
    }

    /// Users who have donated, most recent `last_donation` first.
    ///
    /// Equal dates keep insertion order.
    pub fn latest_donors(&self, limit: usize) -> Vec<User> {
        let mut donors: Vec<User> = self
            .get_all_users()
            .into_iter()
            .filter(|u| u.last_donation.is_some())
            .collect();
        donors.sort_by_key(|u| Reverse(u.last_donation));
        donors.truncate(limit);
        donors
    }
}
