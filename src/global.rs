//! Process-wide current database handle.
//!
//! Application code that does not want to thread a [`Handle`] through every
//! call installs one with [`set_db`] at startup and uses the top-level
//! [`begin`] / [`begin_tx`]. These panic when the current handle lacks the
//! capability; use [`Handle::begin`] / [`Handle::begin_tx`] for a typed error.

use crate::capability::{Capability, ContextTransactor, Transactor};
use crate::context::Context;
use crate::error::DbResult;
use crate::handle::Handle;
use crate::models::TxOptions;
use std::sync::{Arc, PoisonError, RwLock};

static CURRENT_DB: RwLock<Option<Arc<Handle>>> = RwLock::new(None);

/// Install `handle` as the current database handle, replacing any previous one.
pub fn set_db(handle: Arc<Handle>) {
    *CURRENT_DB.write().unwrap_or_else(PoisonError::into_inner) = Some(handle);
}

/// The current database handle, exactly as last passed to [`set_db`].
pub fn get_db() -> Option<Arc<Handle>> {
    CURRENT_DB
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn require(capability: Capability) -> Arc<Handle> {
    match get_db() {
        Some(handle) if handle.supports(capability) => handle,
        _ => panic!("database does not support {capability}"),
    }
}

/// Begin a transaction on the current handle.
///
/// # Panics
///
/// Panics with "database does not support transactions" when no handle is
/// installed or the current one cannot begin transactions.
pub async fn begin() -> DbResult<Box<dyn Transactor>> {
    require(Capability::Begin).begin().await
}

/// Begin a context-scoped transaction with options on the current handle.
///
/// # Panics
///
/// Panics with "database does not support context-aware transactions" when
/// no handle is installed or the current one cannot begin them.
pub async fn begin_tx(ctx: &Context, opts: TxOptions) -> DbResult<Box<dyn ContextTransactor>> {
    require(Capability::BeginTx).begin_tx(ctx, opts).await
}
