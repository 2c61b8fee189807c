//! Transaction options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL isolation level requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    ReadWrite,
    ReadOnly,
}

impl AccessMode {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadWrite => "READ WRITE",
            Self::ReadOnly => "READ ONLY",
        }
    }
}

/// Deferrable mode. Only PostgreSQL honors it, and only for
/// serializable read-only transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferrableMode {
    Deferrable,
    NotDeferrable,
}

impl DeferrableMode {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Deferrable => "DEFERRABLE",
            Self::NotDeferrable => "NOT DEFERRABLE",
        }
    }
}

/// Options for `begin_tx`. Unset fields use the server default.
///
/// # Examples
///
/// ```
/// use sqlcap::models::{AccessMode, IsolationLevel, TxOptions};
///
/// let opts = TxOptions::new()
///     .isolation(IsolationLevel::Serializable)
///     .access_mode(AccessMode::ReadOnly);
/// assert!(!opts.is_default());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxOptions {
    #[serde(default)]
    pub isolation: Option<IsolationLevel>,
    #[serde(default)]
    pub access_mode: Option<AccessMode>,
    #[serde(default)]
    pub deferrable: Option<DeferrableMode>,
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = Some(mode);
        self
    }

    pub fn deferrable(mut self, mode: DeferrableMode) -> Self {
        self.deferrable = Some(mode);
        self
    }

    pub fn read_only(self) -> Self {
        self.access_mode(AccessMode::ReadOnly)
    }

    /// True when no option is set and a plain `BEGIN` suffices.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
