//! Transaction adapters.
//!
//! A single [`TxAdapter`] wraps one live [`DriverTx`]. Its mode marker
//! decides which capabilities it exposes:
//!
//! - [`Background`] ([`PoolTransactor`]): `Transactor` only. Every call except
//!   `commit` runs under [`Context::background`].
//! - [`Scoped`] ([`PoolContextTransactor`]): additionally `ContextExecutor`,
//!   so it satisfies `ContextTransactor`.
//!
//! The adapter keeps no state of its own. Calling `commit` or `rollback`
//! twice reaches the driver twice; whatever the driver reports is returned.

use crate::capability::{ContextExecutor, Executor, Transactor};
use crate::context::Context;
use crate::db::driver::{BoxTx, DriverTx};
use crate::error::DbResult;
use crate::models::{CommandTag, QueryParam, Row, Rows};
use async_trait::async_trait;
use std::marker::PhantomData;

/// Mode marker: context-free calls only.
#[derive(Debug, Clone, Copy)]
pub enum Background {}

/// Mode marker: context-free and context-scoped calls.
#[derive(Debug, Clone, Copy)]
pub enum Scoped {}

/// Adapter from a driver transaction to the transaction capabilities.
pub struct TxAdapter<T, M> {
    tx: T,
    _mode: PhantomData<fn() -> M>,
}

/// Transaction exposing `Transactor`.
pub type PoolTransactor<T = BoxTx> = TxAdapter<T, Background>;

/// Transaction exposing `ContextTransactor`.
pub type PoolContextTransactor<T = BoxTx> = TxAdapter<T, Scoped>;

impl<T: DriverTx, M> TxAdapter<T, M> {
    pub fn new(tx: T) -> Self {
        Self {
            tx,
            _mode: PhantomData,
        }
    }

    /// The wrapped driver transaction.
    pub fn inner(&self) -> &T {
        &self.tx
    }

    pub fn into_inner(self) -> T {
        self.tx
    }
}

impl<T, M> std::fmt::Debug for TxAdapter<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxAdapter")
            .field("mode", &std::any::type_name::<M>())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: DriverTx, M> Executor for TxAdapter<T, M> {
    async fn exec(&self, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        self.tx.exec(&Context::background(), query, args).await
    }

    async fn query(&self, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        self.tx.query(&Context::background(), query, args).await
    }

    async fn query_row(&self, query: &str, args: &[QueryParam]) -> Row {
        self.tx.query_row(&Context::background(), query, args).await
    }
}

#[async_trait]
impl<T: DriverTx, M> Transactor for TxAdapter<T, M> {
    async fn commit(&self, ctx: &Context) -> DbResult<()> {
        self.tx.commit(ctx).await
    }

    async fn rollback(&self) -> DbResult<()> {
        self.tx.rollback(&Context::background()).await
    }
}

#[async_trait]
impl<T: DriverTx> ContextExecutor for TxAdapter<T, Scoped> {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<CommandTag> {
        self.tx.exec(ctx, query, args).await
    }

    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<Rows> {
        self.tx.query(ctx, query, args).await
    }

    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        self.tx.query_row(ctx, query, args).await
    }
}
