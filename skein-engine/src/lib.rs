//! Content aggregation and pagination engine for thread feeds.
//!
//! Four components, all reading and writing through the [`store::ThreadStore`]
//! collaborator: [`aggregate::PostAggregator`] assembles denormalized profile
//! feeds, [`directory::UserDirectory`] pages a filtered user search,
//! [`activity::ActivityResolver`] collects replies by others on a user's
//! posts, and [`profile::ProfileWriter`] upserts profile attributes.

pub mod activity;
pub mod aggregate;
pub mod directory;
pub mod error;
pub mod profile;
pub mod store;
