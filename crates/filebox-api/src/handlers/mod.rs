pub mod fetch;
pub mod files;
pub mod health;
