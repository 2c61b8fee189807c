//! Database handle.
//!
//! A [`Handle`] owns a [`ContextExecutor`] and whichever transaction
//! capabilities that executor has. The capabilities are fixed when the
//! handle is built: [`Handle::new`] wraps a plain executor,
//! [`Handle::transactional`] one that can also begin transactions.

use crate::capability::{
    Beginner, Capability, ContextBeginner, ContextExecutor, ContextTransactor, Executor,
    Transactor,
};
use crate::context::Context;
use crate::db::{DriverPool, PoolContextTransactor, PoolExecutor, PoolTransactor};
use crate::error::{DbError, DbResult};
use crate::models::{CommandTag, QueryParam, Row, Rows, TxOptions};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Handle {
    executor: Arc<dyn ContextExecutor>,
    beginner: Option<Arc<dyn Beginner>>,
    context_beginner: Option<Arc<dyn ContextBeginner>>,
}

impl Handle {
    /// A handle that can execute statements but not begin transactions.
    pub fn new<E>(executor: E) -> Self
    where
        E: ContextExecutor + 'static,
    {
        Self {
            executor: Arc::new(executor),
            beginner: None,
            context_beginner: None,
        }
    }

    /// A handle with both transaction capabilities.
    pub fn transactional<E>(executor: E) -> Self
    where
        E: ContextExecutor + Beginner + ContextBeginner + 'static,
    {
        let executor = Arc::new(executor);
        Self {
            beginner: Some(executor.clone()),
            context_beginner: Some(executor.clone()),
            executor,
        }
    }

    /// Wrap a driver pool in a [`PoolExecutor`].
    pub fn from_pool<P>(pool: P) -> Self
    where
        P: DriverPool + 'static,
    {
        Self::transactional(PoolExecutor::new(pool))
    }

    pub fn executor(&self) -> &Arc<dyn ContextExecutor> {
        &self.executor
    }

    pub fn as_beginner(&self) -> Option<&Arc<dyn Beginner>> {
        self.beginner.as_ref()
    }

    pub fn as_context_beginner(&self) -> Option<&Arc<dyn ContextBeginner>> {
        self.context_beginner.as_ref()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Begin => self.beginner.is_some(),
            Capability::BeginTx => self.context_beginner.is_some(),
        }
    }

    /// Begin a transaction.
    ///
    /// Fails with [`DbError::Unsupported`] when the handle cannot begin
    /// transactions; driver errors are returned unchanged.
    pub async fn begin(&self) -> DbResult<Box<dyn Transactor>> {
        let beginner = self
            .as_beginner()
            .ok_or(DbError::unsupported(Capability::Begin))?;
        let tx = beginner.begin().await?;
        Ok(Box::new(PoolTransactor::new(tx)))
    }

    /// Begin a transaction scoped by `ctx` with the given options.
    ///
    /// `ctx` and `opts` reach the driver unchanged.
    pub async fn begin_tx(
        &self,
        ctx: &Context,
        opts: TxOptions,
    ) -> DbResult<Box<dyn ContextTransactor>> {
        let beginner = self
            .as_context_beginner()
            .ok_or(DbError::unsupported(Capability::BeginTx))?;
        let tx = beginner.begin_tx(ctx, opts).await?;
        Ok(Box::new(PoolContextTransactor::new(tx)))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("begin", &self.supports(Capability::Begin))
            .field("begin_tx", &self.supports(Capability::BeginTx))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Executor for Handle {
    async fn exec(&self, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        self.executor.exec(query, args).await
    }

    async fn query(&self, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        self.executor.query(query, args).await
    }

    async fn query_row(&self, query: &str, args: &[QueryParam]) -> Row {
        self.executor.query_row(query, args).await
    }
}

#[async_trait]
impl ContextExecutor for Handle {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<CommandTag> {
        self.executor.exec_context(ctx, query, args).await
    }

    async fn query_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[QueryParam],
    ) -> DbResult<Rows> {
        self.executor.query_context(ctx, query, args).await
    }

    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        self.executor.query_row_context(ctx, query, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    #[async_trait]
    impl Executor for Plain {
        async fn exec(&self, _query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
            Ok(CommandTag::new(args.len() as u64))
        }

        async fn query(&self, _query: &str, _args: &[QueryParam]) -> DbResult<Rows> {
            Ok(Rows::default())
        }

        async fn query_row(&self, _query: &str, _args: &[QueryParam]) -> Row {
            Row::from_error(DbError::Canceled)
        }
    }

    #[async_trait]
    impl ContextExecutor for Plain {
        async fn exec_context(
            &self,
            _ctx: &Context,
            query: &str,
            args: &[QueryParam],
        ) -> DbResult<CommandTag> {
            self.exec(query, args).await
        }

        async fn query_context(
            &self,
            _ctx: &Context,
            query: &str,
            args: &[QueryParam],
        ) -> DbResult<Rows> {
            self.query(query, args).await
        }

        async fn query_row_context(&self, _ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
            self.query_row(query, args).await
        }
    }

    #[tokio::test]
    async fn test_plain_handle_has_no_transactions() {
        let handle = Handle::new(Plain);
        assert!(!handle.supports(Capability::Begin));
        assert!(!handle.supports(Capability::BeginTx));
        assert!(handle.as_beginner().is_none());

        let err = handle.begin().await.err().unwrap();
        assert!(matches!(
            err,
            DbError::Unsupported {
                capability: Capability::Begin
            }
        ));
        let err = handle
            .begin_tx(&Context::background(), TxOptions::default())
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "database handle does not support context-aware transactions"
        );
    }

    #[tokio::test]
    async fn test_handle_forwards_execution() {
        let handle = Handle::new(Plain);
        let tag = handle
            .exec("DELETE FROM t WHERE id = ?", &[QueryParam::Int(3)])
            .await
            .unwrap();
        assert_eq!(tag.rows_affected(), 1);
        assert_eq!(
            format!("{:?}", handle),
            "Handle { begin: false, begin_tx: false, .. }"
        );
    }
}
