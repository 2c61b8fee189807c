//! Database dispatch macros for reducing code duplication.
//!
//! `DbPool` and `DbTransaction` both wrap one sqlx type per backend. The
//! sqlx calls made on each variant are textually identical, so the match
//! arms are generated from a single body that is type-checked once per
//! backend.

/// Generate a match over the `MySql` / `Postgres` / `SQLite` variants of a
/// `crate::db` enum, evaluating the same body in every arm.
///
/// The two-identifier form also brings a `$db` type alias for the arm's
/// `sqlx::Database` into scope.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(pool, DbPool, |p, Db| {
///     sqlx::query::<Db>(sql).execute(p).await
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($value:expr, $enum:ident, |$p:ident| $body:expr) => {
        match $value {
            $crate::db::$enum::MySql($p) => $body,
            $crate::db::$enum::Postgres($p) => $body,
            $crate::db::$enum::SQLite($p) => $body,
        }
    };
    ($value:expr, $enum:ident, |$p:ident, $db:ident| $body:expr) => {
        match $value {
            $crate::db::$enum::MySql($p) => {
                #[allow(dead_code)]
                type $db = ::sqlx::MySql;
                $body
            }
            $crate::db::$enum::Postgres($p) => {
                #[allow(dead_code)]
                type $db = ::sqlx::Postgres;
                $body
            }
            $crate::db::$enum::SQLite($p) => {
                #[allow(dead_code)]
                type $db = ::sqlx::Sqlite;
                $body
            }
        }
    };
}

/// Build a `Vec<QueryParam>` from anything convertible into a parameter.
///
/// ```
/// use sqlcap::models::QueryParam;
///
/// let args = sqlcap::params![1, "alice", None::<i64>];
/// assert_eq!(args[2], QueryParam::Null);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::models::QueryParam>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::models::QueryParam::from($arg)),+]
    };
}

pub use impl_db_dispatch;
