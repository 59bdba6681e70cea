use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::store::{BloodGroup, DonorFilter, User};

/// Outbound view of a user. Carries no password material, and is the only
/// shape in which a user leaves the service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorProfile {
    pub id: u64,
    pub username: String,
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
    #[serde(with = "crate::dates::option")]
    pub last_donation: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for DonorProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            age: u.age,
            email: u.email,
            phone: u.phone,
            blood_group: u.blood_group,
            address_line1: u.address_line1,
            address_line2: u.address_line2,
            city: u.city,
            state: u.state,
            postal_code: u.postal_code,
            last_donation: u.last_donation,
            created_at: u.created_at,
        }
    }
}

pub fn profiles(users: Vec<User>) -> Vec<DonorProfile> {
    users.into_iter().map(DonorProfile::from).collect()
}

/// `GET /donors` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorQuery {
    pub blood_group: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
}

impl From<DonorQuery> for DonorFilter {
    fn from(q: DonorQuery) -> Self {
        Self {
            blood_group: q.blood_group,
            location: q.location,
            search: q.search,
        }
    }
}

/// `GET /donors/latest` query string. Kept raw so a bad value falls back to
/// the default instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::new_user;
    use crate::store::DonorStore;

    #[test]
    fn profile_never_contains_password() {
        let store = DonorStore::new();
        let user = store
            .create_user(new_user("alice", "Alice", "Boston", "MA", BloodGroup::OPositive))
            .unwrap();
        let json = serde_json::to_string(&DonorProfile::from(user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"bloodGroup\":\"O+\""));
        assert!(json.contains("\"lastDonation\":null"));
    }
}
