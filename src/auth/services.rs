use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

use super::dto::RegisterRequest;
use crate::store::{BloodGroup, NewUser};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: &str, value: &mut String) -> Result<(), String> {
    *value = value.trim().to_string();
    if value.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

/// Normalizes a registration payload in place and checks every profile field.
/// The password is checked when it is hashed.
///
/// Returns the parsed blood group; the error string is meant for the client.
pub fn validate_registration(req: &mut RegisterRequest, today: Date) -> Result<BloodGroup, String> {
    required("username", &mut req.username)?;
    required("fullName", &mut req.full_name)?;
    required("phone", &mut req.phone)?;
    required("addressLine1", &mut req.address_line1)?;
    required("city", &mut req.city)?;
    required("state", &mut req.state)?;
    required("postalCode", &mut req.postal_code)?;

    req.email = req.email.trim().to_lowercase();
    if !is_valid_email(&req.email) {
        return Err("Invalid email".into());
    }

    if req.age <= 0 || req.age > i64::from(u32::MAX) {
        return Err("Age must be a positive number".into());
    }

    req.address_line2 = req
        .address_line2
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if matches!(req.last_donation, Some(d) if d > today) {
        return Err("lastDonation cannot be in the future".into());
    }

    req.blood_group.parse::<BloodGroup>()
}

/// Builds the store record once the password has been hashed.
pub fn new_user_from(req: RegisterRequest, blood_group: BloodGroup, password_hash: String) -> NewUser {
    NewUser {
        username: req.username,
        password_hash,
        full_name: req.full_name,
        age: u32::try_from(req.age).unwrap_or(u32::MAX),
        email: req.email,
        phone: req.phone,
        blood_group,
        address_line1: req.address_line1,
        address_line2: req.address_line2,
        city: req.city,
        state: req.state,
        postal_code: req.postal_code,
        last_donation: req.last_donation,
    }
}
