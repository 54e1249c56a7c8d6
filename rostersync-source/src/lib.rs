//! Remote roster source for rostersync.
//!
//! Fetches the roster of a universe and one detail document per roster
//! entry from the public XML API, and parses both into
//! `rostersync-types` records.

mod client;
mod config;
mod parse;

pub use client::XmlApiSource;
pub use config::{DEFAULT_COMMUNITY, SourceConfig};
pub use parse::{parse_detail, parse_roster};
