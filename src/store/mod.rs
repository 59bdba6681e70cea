//! In-memory donor store.
//!
//! Users and donations live in two keyed tables with independent id
//! sequences. Both tables and the username/email indexes sit behind one
//! `RwLock`, so a write touching users and donations together is applied
//! as a unit and readers never see half of it.

pub mod error;
pub mod query;
pub mod repo_types;

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use time::{Date, OffsetDateTime};
use tracing::debug;

pub use error::{StoreError, StoreResult};
pub use query::{resolve_limit, ActiveTerms, DonorFilter, DEFAULT_LATEST_LIMIT};
pub use repo_types::{BloodGroup, Donation, NewDonation, NewUser, User};

struct Tables {
    // Ids only grow, so key order is insertion order.
    users: BTreeMap<u64, User>,
    donations: BTreeMap<u64, Donation>,
    by_username: HashMap<String, u64>,
    by_email: HashMap<String, u64>,
    next_user_id: u64,
    next_donation_id: u64,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            donations: BTreeMap::new(),
            by_username: HashMap::new(),
            by_email: HashMap::new(),
            next_user_id: 1,
            next_donation_id: 1,
        }
    }

    fn insert_donation(&mut self, new: NewDonation) -> Donation {
        let id = self.next_donation_id;
        self.next_donation_id += 1;
        let donation = Donation {
            id,
            user_id: new.user_id,
            donation_date: new.donation_date,
            location: new.location,
            units: new.units,
            status: new.status,
        };
        self.donations.insert(id, donation.clone());
        donation
    }
}

pub struct DonorStore {
    tables: RwLock<Tables>,
}

impl Default for DonorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DonorStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    /// Stores a new user under the next free id.
    ///
    /// Username and email must both be unused; the check and the insert
    /// happen under the same write lock.
    pub fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write();

        if t.by_username.contains_key(&new.username) {
            return Err(StoreError::UsernameTaken(new.username));
        }
        if t.by_email.contains_key(&new.email) {
            return Err(StoreError::EmailTaken(new.email));
        }

        let id = t.next_user_id;
        t.next_user_id += 1;

        let user = User {
            id,
            username: new.username,
            password_hash: new.password_hash,
            full_name: new.full_name,
            age: new.age,
            email: new.email,
            phone: new.phone,
            blood_group: new.blood_group,
            address_line1: new.address_line1,
            address_line2: new.address_line2,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            last_donation: new.last_donation,
            created_at: OffsetDateTime::now_utc(),
        };

        t.by_username.insert(user.username.clone(), id);
        t.by_email.insert(user.email.clone(), id);
        t.users.insert(id, user.clone());
        debug!(user_id = id, username = %user.username, "user stored");
        Ok(user)
    }

    pub fn get_user(&self, id: u64) -> Option<User> {
        self.tables.read().users.get(&id).cloned()
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        let t = self.tables.read();
        t.by_username
            .get(username)
            .and_then(|id| t.users.get(id))
            .cloned()
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        let t = self.tables.read();
        t.by_email.get(email).and_then(|id| t.users.get(id)).cloned()
    }

    /// All users in insertion order.
    pub fn get_all_users(&self) -> Vec<User> {
        self.tables.read().users.values().cloned().collect()
    }

    /// Appends a donation without checking its owner or touching the owner's
    /// `last_donation`. Request handling goes through [`Self::record_donation`].
    pub fn create_donation(&self, new: NewDonation) -> Donation {
        let donation = self.tables.write().insert_donation(new);
        debug!(donation_id = donation.id, user_id = donation.user_id, "donation stored");
        donation
    }

    /// Donations owned by `user_id`, in insertion order.
    pub fn get_donations_by_user_id(&self, user_id: u64) -> Vec<Donation> {
        self.tables
            .read()
            .donations
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Records a donation and moves the owner's `last_donation` forward in
    /// one step.
    ///
    /// Fails without writing anything when the owner does not exist or the
    /// date lies after `today`. A back-dated donation is kept in the history
    /// but leaves a later `last_donation` in place.
    pub fn record_donation(&self, new: NewDonation, today: Date) -> StoreResult<(Donation, User)> {
        if new.donation_date > today {
            return Err(StoreError::InvalidDonationDate {
                date: new.donation_date,
                today,
            });
        }

        let mut t = self.tables.write();
        if !t.users.contains_key(&new.user_id) {
            return Err(StoreError::UserNotFound(new.user_id));
        }

        let donation = t.insert_donation(new);
        let owner = t
            .users
            .get_mut(&donation.user_id)
            .ok_or(StoreError::UserNotFound(donation.user_id))?;
        if owner.last_donation.map_or(true, |prev| donation.donation_date > prev) {
            owner.last_donation = Some(donation.donation_date);
        }
        let owner = owner.clone();

        debug!(
            donation_id = donation.id,
            user_id = owner.id,
            last_donation = ?owner.last_donation,
            "donation recorded"
        );
        Ok((donation, owner))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::new_user;
    use super::*;
    use std::sync::Arc;
    use time::macros::date;

    fn alice() -> NewUser {
        new_user("alice", "Alice Smith", "Boston", "MA", BloodGroup::OPositive)
    }

    #[test]
    fn user_ids_are_distinct_and_increasing() {
        let store = DonorStore::new();
        let ids: Vec<u64> = (0..5)
            .map(|i| {
                let name = format!("user{i}");
                store
                    .create_user(new_user(&name, "Someone", "Austin", "TX", BloodGroup::APositive))
                    .unwrap()
                    .id
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn donation_ids_are_independent_of_user_ids() {
        let store = DonorStore::new();
        store.create_user(alice()).unwrap();
        store.create_user(new_user("bob", "Bob", "Boston", "MA", BloodGroup::APositive)).unwrap();

        let first = store.create_donation(NewDonation::new(1, date!(2024 - 01 - 01), "Clinic"));
        let second = store.create_donation(NewDonation::new(2, date!(2024 - 01 - 02), "Clinic"));
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(first.units, 1);
        assert_eq!(first.status, "completed");
    }

    #[test]
    fn lookups_by_username_email_and_id() {
        let store = DonorStore::new();
        let created = store.create_user(alice()).unwrap();

        assert_eq!(store.get_user(created.id), Some(created.clone()));
        assert_eq!(store.get_user_by_username("alice"), Some(created.clone()));
        assert_eq!(store.get_user_by_email("alice@example.com"), Some(created));
        assert_eq!(store.get_user(99), None);
        assert_eq!(store.get_user_by_username("nobody"), None);
        assert_eq!(store.get_user_by_email("nobody@example.com"), None);
    }

    #[test]
    fn duplicate_username_or_email_is_rejected() {
        let store = DonorStore::new();
        store.create_user(alice()).unwrap();

        let err = store.create_user(alice()).unwrap_err();
        assert_eq!(err, StoreError::UsernameTaken("alice".into()));

        let mut same_email = new_user("alice2", "Alice Two", "Boston", "MA", BloodGroup::OPositive);
        same_email.email = "alice@example.com".into();
        let err = store.create_user(same_email).unwrap_err();
        assert_eq!(err, StoreError::EmailTaken("alice@example.com".into()));

        // Rejected creates do not burn ids.
        let next = store
            .create_user(new_user("carol", "Carol", "Denver", "CO", BloodGroup::BNegative))
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn get_all_users_is_stable_between_reads() {
        let store = DonorStore::new();
        store.create_user(alice()).unwrap();
        store.create_user(new_user("bob", "Bob", "Boston", "MA", BloodGroup::APositive)).unwrap();

        let first = store.get_all_users();
        let second = store.get_all_users();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn create_donation_does_not_validate_owner() {
        let store = DonorStore::new();
        let d = store.create_donation(NewDonation::new(42, date!(2024 - 05 - 05), "Mobile unit"));
        assert_eq!(d.user_id, 42);
        assert_eq!(store.get_donations_by_user_id(42), vec![d]);
    }

    #[test]
    fn donations_are_scoped_to_their_owner_in_order() {
        let store = DonorStore::new();
        let a = store.create_donation(NewDonation::new(1, date!(2024 - 01 - 01), "A"));
        store.create_donation(NewDonation::new(2, date!(2024 - 01 - 02), "B"));
        let c = store.create_donation(NewDonation::new(1, date!(2023 - 12 - 01), "C"));

        assert_eq!(store.get_donations_by_user_id(1), vec![a, c]);
        assert!(store.get_donations_by_user_id(3).is_empty());
    }

    #[test]
    fn record_donation_updates_last_donation() {
        let store = DonorStore::new();
        let user = store.create_user(alice()).unwrap();

        let (donation, owner) = store
            .record_donation(NewDonation::new(user.id, date!(2024 - 03 - 01), "Red Cross"), date!(2024 - 03 - 10))
            .unwrap();
        assert_eq!(donation.user_id, user.id);
        assert_eq!(owner.last_donation, Some(date!(2024 - 03 - 01)));
        assert_eq!(store.get_user(user.id).unwrap().last_donation, Some(date!(2024 - 03 - 01)));
    }

    #[test]
    fn back_dated_donation_keeps_later_last_donation() {
        let store = DonorStore::new();
        let user = store.create_user(alice()).unwrap();
        let today = date!(2024 - 06 - 01);

        store
            .record_donation(NewDonation::new(user.id, date!(2024 - 05 - 01), "A"), today)
            .unwrap();
        let (_, owner) = store
            .record_donation(NewDonation::new(user.id, date!(2024 - 01 - 01), "B"), today)
            .unwrap();

        assert_eq!(owner.last_donation, Some(date!(2024 - 05 - 01)));
        assert_eq!(store.get_donations_by_user_id(user.id).len(), 2);
    }

    #[test]
    fn record_donation_for_unknown_user_writes_nothing() {
        let store = DonorStore::new();
        let err = store
            .record_donation(NewDonation::new(7, date!(2024 - 01 - 01), "A"), date!(2024 - 02 - 01))
            .unwrap_err();
        assert_eq!(err, StoreError::UserNotFound(7));
        assert!(store.get_donations_by_user_id(7).is_empty());

        // The donation sequence was not advanced either.
        let d = store.create_donation(NewDonation::new(7, date!(2024 - 01 - 01), "A"));
        assert_eq!(d.id, 1);
    }

    #[test]
    fn record_donation_rejects_future_dates() {
        let store = DonorStore::new();
        let user = store.create_user(alice()).unwrap();
        let err = store
            .record_donation(NewDonation::new(user.id, date!(2024 - 02 - 02), "A"), date!(2024 - 02 - 01))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDonationDate { .. }));
        assert_eq!(store.get_user(user.id).unwrap().last_donation, None);
        assert!(store.get_donations_by_user_id(user.id).is_empty());
    }

    #[test]
    fn concurrent_recordings_lose_no_donations() {
        let store = Arc::new(DonorStore::new());
        let user_id = store.create_user(alice()).unwrap().id;
        let today = date!(2024 - 12 - 31);

        let handles: Vec<_> = (1..=8u8)
            .map(|day| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let when = Date::from_calendar_date(2024, time::Month::March, day).unwrap();
                    store.record_donation(NewDonation::new(user_id, when, "Clinic"), today).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let donations = store.get_donations_by_user_id(user_id);
        assert_eq!(donations.len(), 8);
        let mut ids: Vec<u64> = donations.iter().map(|d| d.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.get_user(user_id).unwrap().last_donation, Some(date!(2024 - 03 - 08)));
    }
}
