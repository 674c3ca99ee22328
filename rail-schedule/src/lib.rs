//! Train schedule viewer core.
//!
//! Search for a station by (possibly misspelt) name or code, view the
//! trains due there, and look up where each train is on its journey.

pub mod cache;
pub mod domain;
pub mod favourites;
pub mod irishrail;
pub mod provider;
pub mod schedule;
pub mod search;
pub mod session;
