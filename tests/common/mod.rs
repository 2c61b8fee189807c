//! Recording driver stubs shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use sqlcap::db::{BoxTx, DriverPool, DriverTx};
use sqlcap::{CommandTag, Context, DbError, DbResult, QueryParam, Row, Rows, TxOptions};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One call that reached the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub query: Option<String>,
    pub args: Vec<QueryParam>,
    pub background: bool,
    pub deadline: Option<Instant>,
    pub opts: Option<TxOptions>,
}

impl Call {
    fn new(op: &'static str, ctx: &Context) -> Self {
        Self {
            op,
            query: None,
            args: Vec::new(),
            background: ctx.is_background(),
            deadline: ctx.deadline(),
            opts: None,
        }
    }

    fn with_query(mut self, query: &str, args: &[QueryParam]) -> Self {
        self.query = Some(query.to_string());
        self.args = args.to_vec();
        self
    }
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

/// Error the stub transaction returns once it has been ended.
pub fn finished_error() -> DbError {
    DbError::invalid_input("stub transaction already finished")
}

/// Pool stub that records every call, including those made on the
/// transactions it hands out.
#[derive(Debug, Clone, Default)]
pub struct RecordingPool {
    log: CallLog,
    slow_begin: bool,
}

impl RecordingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// `begin_tx` takes a minute unless its context ends first.
    pub fn with_slow_begin() -> Self {
        Self {
            slow_begin: true,
            ..Self::default()
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DriverPool for RecordingPool {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        self.record(Call::new("exec", ctx).with_query(query, args));
        ctx.run(async { Ok(CommandTag::new(1)) }).await
    }

    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        self.record(Call::new("query", ctx).with_query(query, args));
        ctx.run(async { Ok(Rows::default()) }).await
    }

    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        self.record(Call::new("query_row", ctx).with_query(query, args));
        Row::from_error(DbError::invalid_input("stub has no rows"))
    }

    async fn begin(&self) -> DbResult<BoxTx> {
        self.record(Call::new("begin", &Context::background()));
        Ok(Box::new(RecordingTx::new(self.log.clone())))
    }

    async fn begin_tx(&self, ctx: &Context, opts: TxOptions) -> DbResult<BoxTx> {
        let mut call = Call::new("begin_tx", ctx);
        call.opts = Some(opts);
        self.record(call);

        let slow = self.slow_begin;
        ctx.run(async {
            if slow {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(Box::new(RecordingTx::new(self.log.clone())) as BoxTx)
        })
        .await
    }
}

/// Transaction stub. Succeeds on the first commit or rollback and returns
/// [`finished_error`] for every end call after that.
#[derive(Debug)]
pub struct RecordingTx {
    log: CallLog,
    finished: Mutex<bool>,
}

impl RecordingTx {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            finished: Mutex::new(false),
        }
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }

    fn finish(&self) -> DbResult<()> {
        let mut finished = self.finished.lock().unwrap();
        if *finished {
            return Err(finished_error());
        }
        *finished = true;
        Ok(())
    }
}

#[async_trait]
impl DriverTx for RecordingTx {
    async fn exec(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<CommandTag> {
        self.record(Call::new("tx.exec", ctx).with_query(query, args));
        Ok(CommandTag::new(args.len() as u64))
    }

    async fn query(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> DbResult<Rows> {
        self.record(Call::new("tx.query", ctx).with_query(query, args));
        Ok(Rows::default())
    }

    async fn query_row(&self, ctx: &Context, query: &str, args: &[QueryParam]) -> Row {
        self.record(Call::new("tx.query_row", ctx).with_query(query, args));
        Row::from_error(DbError::invalid_input("stub has no rows"))
    }

    async fn commit(&self, ctx: &Context) -> DbResult<()> {
        self.record(Call::new("tx.commit", ctx));
        self.finish()
    }

    async fn rollback(&self, ctx: &Context) -> DbResult<()> {
        self.record(Call::new("tx.rollback", ctx));
        self.finish()
    }
}

/// Calls in the log with the given op.
pub fn calls_named(log: &CallLog, op: &str) -> Vec<Call> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|c| c.op == op)
        .cloned()
        .collect()
}
