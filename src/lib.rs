//! LifeShare blood-donor registry.
//!
//! An in-memory donor store with directory queries and donation cooldown
//! tracking, served over a small JSON API.

pub mod app;
pub mod auth;
pub mod config;
pub mod dates;
pub mod donations;
pub mod donors;
pub mod eligibility;
pub mod state;
pub mod store;
