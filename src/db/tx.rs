//! sqlx transactions.
//!
//! [`SqlxTx`] holds one backend-specific sqlx transaction and implements
//! [`DriverTx`]. The transaction's connection sits behind an async mutex so
//! statements on one transaction are always issued one at a time. Once
//! committed or rolled back, every further call fails with
//! [`DbError::TxClosed`].

use crate::context::Context;
use crate::db::driver::DriverTx;
use crate::db::params::BindParams;
use crate::db::types::{RowToJson, collect_rows};
use crate::error::{DbError, DbResult};
use crate::models::{AccessMode, CommandTag, DatabaseType, QueryParam, Row, Rows, TxOptions};
use async_trait::async_trait;
use sqlx::{MySql, Postgres, Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

/// Database-specific transaction wrapper.
pub enum DbTransaction {
    /// MySQL transaction
    MySql(Transaction<'static, MySql>),
    /// PostgreSQL transaction
    Postgres(Transaction<'static, Postgres>),
    /// SQLite transaction
    SQLite(Transaction<'static, Sqlite>),
}

impl DbTransaction {
    /// Get the database type for this transaction.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbTransaction::MySql(_) => DatabaseType::MySQL,
            DbTransaction::Postgres(_) => DatabaseType::PostgreSQL,
            DbTransaction::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

pub struct SqlxTx {
    inner: Mutex<Option<DbTransaction>>,
}

impl SqlxTx {
    pub fn new(tx: DbTransaction) -> Self {
        Self {
            inner: Mutex::new(Some(tx)),
        }
    }

    /// True once the transaction has been committed or rolled back.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }

    async fn take(&self) -> DbResult<DbTransaction> {
        self.inner.lock().await.take().ok_or(DbError::TxClosed)
    }
}

impl From<Transaction<'static, MySql>> for SqlxTx {
    fn from(tx: Transaction<'static, MySql>) -> Self {
        Self::new(DbTransaction::MySql(tx))
    }
}

impl From<Transaction<'static, Postgres>> for SqlxTx {
    fn from(tx: Transaction<'static, Postgres>) -> Self {
        Self::new(DbTransaction::Postgres(tx))
    }
}

impl From<Transaction<'static, Sqlite>> for SqlxTx {
    fn from(tx: Transaction<'static, Sqlite>) -> Self {
        Self::new(DbTransaction::SQLite(tx))
    }
}

#[async_trait]
impl DriverTx for SqlxTx {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        ctx.run(async {
            let mut guard = self.inner.lock().await;
            let tx = guard.as_mut().ok_or(DbError::TxClosed)?;
            let rows_affected = impl_db_dispatch!(tx, DbTransaction, |tx, Db| {
                sqlx::query::<Db>(query)
                    .bind_all(args)
                    .execute(&mut **tx)
                    .await?
                    .rows_affected()
            });

            debug!(sql = %query, rows_affected = rows_affected, "Executed in transaction");
            Ok::<_, DbError>(CommandTag::new(rows_affected))
        })
        .await
    }

    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        ctx.run(async {
            let mut guard = self.inner.lock().await;
            let tx = guard.as_mut().ok_or(DbError::TxClosed)?;
            let rows = impl_db_dispatch!(tx, DbTransaction, |tx, Db| {
                collect_rows(
                    sqlx::query::<Db>(query)
                        .bind_all(args)
                        .fetch_all(&mut **tx)
                        .await?,
                )?
            });

            debug!(sql = %query, row_count = rows.len(), "Queried in transaction");
            Ok::<_, DbError>(rows)
        })
        .await
    }

    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        let result = ctx
            .run(async {
                let mut guard = self.inner.lock().await;
                let tx = guard.as_mut().ok_or(DbError::TxClosed)?;
                let row = impl_db_dispatch!(tx, DbTransaction, |tx, Db| {
                    sqlx::query::<Db>(query)
                        .bind_all(args)
                        .fetch_one(&mut **tx)
                        .await?
                        .to_json_map()?
                });
                Ok::<_, DbError>(row)
            })
            .await;
        Row::new(result)
    }

    async fn commit(&self, ctx: &Context) -> DbResult<()> {
        ctx.run(async {
            let tx = self.take().await?;
            let db_type = tx.db_type();
            impl_db_dispatch!(tx, DbTransaction, |tx| tx.commit().await?);
            debug!(db_type = %db_type, "Transaction committed");
            Ok::<_, DbError>(())
        })
        .await
    }

    async fn rollback(&self, ctx: &Context) -> DbResult<()> {
        ctx.run(async {
            let tx = self.take().await?;
            let db_type = tx.db_type();
            impl_db_dispatch!(tx, DbTransaction, |tx| tx.rollback().await?);
            debug!(db_type = %db_type, "Transaction rolled back");
            Ok::<_, DbError>(())
        })
        .await
    }
}

/// The statement that opens a transaction with `opts`, or `None` when a
/// plain `BEGIN` does.
///
/// - PostgreSQL takes every option on `BEGIN`.
/// - MySQL sets the isolation level for the next transaction, then takes the
///   access mode on `START TRANSACTION`. Deferrable mode does not exist.
/// - SQLite transactions are always serializable; a read-write transaction
///   takes the write lock up front with `BEGIN IMMEDIATE`.
pub(crate) fn begin_statement(db_type: DatabaseType, opts: &TxOptions) -> Option<String> {
    if opts.is_default() {
        return None;
    }

    match db_type {
        DatabaseType::PostgreSQL => {
            let mut sql = String::from("BEGIN");
            if let Some(level) = opts.isolation {
                sql.push_str(" ISOLATION LEVEL ");
                sql.push_str(level.as_sql());
            }
            if let Some(mode) = opts.access_mode {
                sql.push(' ');
                sql.push_str(mode.as_sql());
            }
            if let Some(mode) = opts.deferrable {
                sql.push(' ');
                sql.push_str(mode.as_sql());
            }
            Some(sql)
        }
        DatabaseType::MySQL => {
            let mut sql = String::new();
            if let Some(level) = opts.isolation {
                sql.push_str("SET TRANSACTION ISOLATION LEVEL ");
                sql.push_str(level.as_sql());
                sql.push_str("; ");
            }
            sql.push_str("START TRANSACTION");
            if let Some(mode) = opts.access_mode {
                sql.push(' ');
                sql.push_str(mode.as_sql());
            }
            Some(sql)
        }
        DatabaseType::SQLite => match opts.access_mode {
            Some(AccessMode::ReadWrite) => Some("BEGIN IMMEDIATE".to_string()),
            _ => None,
        },
    }
}
