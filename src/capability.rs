//! Capability traits.
//!
//! A database handle is described by which of these traits it implements,
//! not by its concrete type:
//! - [`Executor`]: run statements without a context
//! - [`ContextExecutor`]: the same, scoped to a caller-supplied [`Context`]
//! - [`Transactor`] / [`ContextTransactor`]: executors that can also end a transaction
//! - [`Beginner`] / [`ContextBeginner`]: handles that can start one

use crate::context::Context;
use crate::db::driver::BoxTx;
use crate::error::DbResult;
use crate::models::{CommandTag, QueryParam, Row, Rows, TxOptions};
use async_trait::async_trait;
use std::fmt;

/// Executor can perform SQL queries.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn exec(&self, query: &str, args: &[QueryParam]) -> DbResult<CommandTag>;
    async fn query(&self, query: &str, args: &[QueryParam]) -> DbResult<Rows>;
    async fn query_row(&self, query: &str, args: &[QueryParam]) -> Row;
}

/// ContextExecutor can perform SQL queries with a cancellation-bearing context.
#[async_trait]
pub trait ContextExecutor: Executor {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<CommandTag>;
    async fn query_context(&self, ctx: &Context, query: &str, args: &[QueryParam])
    -> DbResult<Rows>;
    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row;
}

/// Transactor can commit and rollback, on top of being able to execute queries.
#[async_trait]
pub trait Transactor: Executor {
    async fn commit(&self, ctx: &Context) -> DbResult<()>;
    async fn rollback(&self) -> DbResult<()>;
}

/// ContextTransactor can commit and rollback, on top of being able to execute
/// context-aware queries.
pub trait ContextTransactor: ContextExecutor + Transactor {}

impl<T: ContextExecutor + Transactor + ?Sized> ContextTransactor for T {}

/// Beginner begins transactions.
#[async_trait]
pub trait Beginner: Send + Sync {
    async fn begin(&self) -> DbResult<BoxTx>;
}

/// ContextBeginner begins context-aware transactions with options.
#[async_trait]
pub trait ContextBeginner: Send + Sync {
    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> DbResult<BoxTx>;
}

/// Transaction capability a handle may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`Beginner`]
    Begin,
    /// [`ContextBeginner`]
    BeginTx,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Begin => write!(f, "transactions"),
            Self::BeginTx => write!(f, "context-aware transactions"),
        }
    }
}
