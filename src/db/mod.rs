//! Database layer.
//!
//! - `driver`: the context-first driver surface the adapters are written against
//! - `executor` / `transaction`: adapters from that surface to the capability traits
//! - `pool` / `tx`: the sqlx implementation of the driver surface
//! - `params` / `types`: parameter binding and row decoding for sqlx
//! - `macros`: backend dispatch for the sqlx enums

#[macro_use]
pub mod macros;
pub mod driver;
pub mod executor;
pub mod params;
pub mod pool;
pub mod transaction;
pub mod tx;
pub mod types;

pub use driver::{BoxTx, DriverPool, DriverTx};
pub use executor::PoolExecutor;
pub use pool::DbPool;
pub use transaction::{Background, PoolContextTransactor, PoolTransactor, Scoped, TxAdapter};
pub use tx::{DbTransaction, SqlxTx};
