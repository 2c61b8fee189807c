//! sqlcap
//!
//! Capability traits over a pooled SQL client (SQLite, PostgreSQL, MySQL).
//! Code written against [`Executor`], [`ContextExecutor`], [`Transactor`] and
//! friends runs unchanged on any driver implementing [`db::DriverPool`]; the
//! sqlx binding [`db::DbPool`] ships with the crate.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqlcap::{Context, Executor, Handle, Transactor, TxOptions};
//! use sqlcap::{config::DatabaseConfig, db::DbPool};
//!
//! # async fn run() -> sqlcap::DbResult<()> {
//! let pool = DbPool::connect(&DatabaseConfig::parse("sqlite:app.db")?).await?;
//! sqlcap::set_db(Arc::new(Handle::from_pool(pool)));
//!
//! let tx = sqlcap::begin_tx(&Context::background(), TxOptions::new().read_only()).await?;
//! let rows = tx.query("SELECT id FROM users", &[]).await?;
//! tx.commit(&Context::background()).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod global;
pub mod handle;
pub mod models;

pub use capability::{
    Beginner, Capability, ContextBeginner, ContextExecutor, ContextTransactor, Executor,
    Transactor,
};
pub use config::Config;
pub use context::{CancelHandle, Context};
pub use error::{DbError, DbResult};
pub use global::{begin, begin_tx, get_db, set_db};
pub use handle::Handle;
pub use models::{CommandTag, QueryParam, Row, Rows, TxOptions};
