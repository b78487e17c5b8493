//! Filebox record store
//!
//! [`FileRecordRepository`] is the narrow interface the services use to persist file
//! records. [`PgFileRecordRepository`] backs it with PostgreSQL;
//! [`InMemoryFileRecordRepository`] keeps records in process for tests and local runs.

mod memory;
mod postgres;
mod repository;

pub use memory::InMemoryFileRecordRepository;
pub use postgres::{PgFileRecordRepository, MIGRATOR};
pub use repository::FileRecordRepository;
