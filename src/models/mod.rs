//! Data models shared by the capability traits and the drivers.

pub mod connection;
pub mod query;
pub mod transaction;

pub use connection::DatabaseType;
pub use query::{CommandTag, JsonRow, QueryParam, Row, Rows};
pub use transaction::{AccessMode, DeferrableMode, IsolationLevel, TxOptions};
