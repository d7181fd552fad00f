//! SQLite backend for the SNS Growth engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
