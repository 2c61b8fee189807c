//! Driver surface the adapters are written against.
//!
//! The driver is context-first: every call takes a [`Context`]. The sqlx
//! binding in [`crate::db::pool`] and [`crate::db::tx`] implements these
//! traits; any other driver (or a test stub) can be plugged in the same way.

use crate::context::Context;
use crate::error::DbResult;
use crate::models::{CommandTag, QueryParam, Row, Rows, TxOptions};
use async_trait::async_trait;

/// An open driver transaction.
pub type BoxTx = Box<dyn DriverTx>;

/// A pooled connection source.
#[async_trait]
pub trait DriverPool: Send + Sync {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag>;
    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows>;
    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row;

    async fn begin(&self) -> DbResult<BoxTx>;
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> DbResult<BoxTx>;
}

/// A single live transaction.
#[async_trait]
pub trait DriverTx: Send + Sync {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag>;
    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows>;
    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row;

    async fn commit(&self, ctx: &Context) -> DbResult<()>;
    async fn rollback(&self, ctx: &Context) -> DbResult<()>;
}

#[async_trait]
impl DriverTx for BoxTx {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        (**self).exec(ctx, query, args).await
    }

    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        (**self).query(ctx, query, args).await
    }

    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        (**self).query_row(ctx, query, args).await
    }

    async fn commit(&self, ctx: &Context) -> DbResult<()> {
        (**self).commit(ctx).await
    }

    async fn rollback(&self, ctx: &Context) -> DbResult<()> {
        (**self).rollback(ctx).await
    }
}
