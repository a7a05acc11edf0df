//! Terminal front end for a headlines API with per-user saved articles.
//!
//! Accounts and saved articles live in a local SQLite database; headlines
//! and the list of sources come from the remote API.

pub mod config;
pub mod menu;
pub mod news;
pub mod password;
pub mod storage;
pub mod util;
