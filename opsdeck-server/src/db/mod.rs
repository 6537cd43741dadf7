//! Database layer - lazy connection handle, migrations, and repositories
//!
//! # Design Principles
//!
//! - One pool per process, created on first use - no Arc<Mutex<Connection>>
//! - Rely on DB constraints (UNIQUE, CHECK), handle conflicts - no check-then-insert
//! - Single-statement writes; nothing here opens a transaction

pub mod error;
pub mod handle;
pub mod migrations;
pub mod repos;

pub use error::DbError;
pub use handle::Database;
pub use repos::*;
