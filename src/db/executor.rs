//! Pool adapter.
//!
//! [`PoolExecutor`] lifts a [`DriverPool`] into the capability traits. The
//! context-free calls run under [`Context::background`]; the `*_context`
//! calls hand the caller's context to the pool untouched. Results and
//! errors pass through as the pool produced them.

use crate::capability::{Beginner, ContextBeginner, ContextExecutor, Executor};
use crate::context::Context;
use crate::db::driver::{BoxTx, DriverPool};
use crate::error::DbResult;
use crate::models::{CommandTag, QueryParam, Row, Rows, TxOptions};
use async_trait::async_trait;

/// Adapter giving a pool the `ContextExecutor`, `Beginner` and
/// `ContextBeginner` capabilities.
#[derive(Debug, Clone)]
pub struct PoolExecutor<P> {
    pool: P,
}

impl<P: DriverPool> PoolExecutor<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn into_inner(self) -> P {
        self.pool
    }
}

#[async_trait]
impl<P: DriverPool> Executor for PoolExecutor<P> {
    async fn exec(&self, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        self.pool.exec(&Context::background(), query, args).await
    }

    async fn query(&self, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        self.pool.query(&Context::background(), query, args).await
    }

    async fn query_row(&self, query: &str, args: &[QueryParam]) -> Row {
        self.pool.query_row(&Context::background(), query, args).await
    }
}

#[async_trait]
impl<P: DriverPool> ContextExecutor for PoolExecutor<P> {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<CommandTag> {
        self.pool.exec(ctx, query, args).await
    }

    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<Rows> {
        self.pool.query(ctx, query, args).await
    }

    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        self.pool.query_row(ctx, query, args).await
    }
}

#[async_trait]
impl<P: DriverPool> Beginner for PoolExecutor<P> {
    async fn begin(&self) -> DbResult<BoxTx> {
        self.pool.begin().await
    }
}

#[async_trait]
impl<P: DriverPool> ContextBeginner for PoolExecutor<P> {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> DbResult<BoxTx> {
        self.pool.begin_tx(ctx, opts).await
    }
}
