use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// ABO/Rh blood group of a donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts any letter case, e.g. `"ab-"`.
impl FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown blood group: {s}"))
    }
}

/// Registered donor as held by the store.
///
/// Not serializable on purpose: outbound views go through
/// `donors::dto::DonorProfile`, which has no password field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,                           // assigned by the store
    pub username: String,                  // unique
    pub password_hash: String,             // argon2 PHC string
    pub full_name: String,
    pub age: u32,
    pub email: String,                     // unique
    pub phone: String,
    pub blood_group: BloodGroup,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub last_donation: Option<Date>,
    pub created_at: OffsetDateTime,
}

/// Everything needed to create a user; id and created_at come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub blood_group: BloodGroup,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub last_donation: Option<Date>,
}

pub const DEFAULT_UNITS: u32 = 1;
pub const DEFAULT_STATUS: &str = "completed";

/// One recorded donation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: u64,
    pub user_id: u64,
    #[serde(with = "crate::dates")]
    pub donation_date: Date,
    pub location: String,
    pub units: u32,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: u64,
    pub donation_date: Date,
    pub location: String,
    pub units: u32,
    pub status: String,
}

impl NewDonation {
    /// Donation with the default units and status.
    pub fn new(user_id: u64, donation_date: Date, location: impl Into<String>) -> Self {
        Self {
            user_id,
            donation_date,
            location: location.into(),
            units: DEFAULT_UNITS,
            status: DEFAULT_STATUS.to_string(),
        }
    }
}
