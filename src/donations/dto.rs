use serde::Deserialize;

use crate::dates;
use crate::store::repo_types::{DEFAULT_STATUS, DEFAULT_UNITS};
use crate::store::NewDonation;

/// `POST /donations` body. The owner comes from the access token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    pub donation_date: String,
    pub location: String,
    #[serde(default)]
    pub units: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateDonationRequest {
    /// Checks the payload and builds a donation owned by `user_id`.
    pub fn into_new_donation(self, user_id: u64) -> Result<NewDonation, String> {
        let donation_date = dates::parse(&self.donation_date)
            .map_err(|_| format!("Invalid donationDate: {}", self.donation_date.trim()))?;

        let location = self.location.trim().to_string();
        if location.is_empty() {
            return Err("Location is required".into());
        }

        let units = match self.units {
            None => DEFAULT_UNITS,
            Some(n) if n >= 1 => u32::try_from(n).map_err(|_| "Too many units".to_string())?,
            Some(_) => return Err("Minimum of 1 unit required".into()),
        };

        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        Ok(NewDonation {
            user_id,
            donation_date,
            location,
            units,
            status,
        })
    }
}
