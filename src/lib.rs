pub mod config;
pub mod data;
pub mod detail;
pub mod error;
pub mod page;
pub mod selection;
pub mod server;
pub mod table;
pub mod types;
pub mod view;

pub use error::LoadError;
