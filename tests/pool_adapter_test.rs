//! Integration tests for the pool adapter.

mod common;

use common::{RecordingPool, calls_named};
use sqlcap::db::PoolExecutor;
use sqlcap::models::{DeferrableMode, IsolationLevel};
use sqlcap::{
    Beginner, ContextBeginner, ContextExecutor, Context, DbError, Executor, QueryParam,
    TxOptions, params,
};
use std::time::Duration;

#[tokio::test]
async fn test_exec_select_one_reaches_driver_once() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool.clone());

    executor.exec("SELECT 1", &[]).await.unwrap();

    let calls = pool.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].op, "exec");
    assert_eq!(calls[0].query.as_deref(), Some("SELECT 1"));
    assert!(calls[0].args.is_empty());
    assert!(calls[0].background);
}

#[tokio::test]
async fn test_context_free_calls_keep_args_in_order() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool.clone());
    let args = params![7, "bob", None::<String>, true];

    executor
        .query("SELECT * FROM users WHERE id = $1 AND name = $2", &args)
        .await
        .unwrap();
    let row = executor.query_row("SELECT name FROM users", &[]).await;
    assert!(!row.is_ok());

    let calls = pool.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].args,
        vec![
            QueryParam::Int(7),
            QueryParam::String("bob".to_string()),
            QueryParam::Null,
            QueryParam::Bool(true),
        ]
    );
    assert!(calls.iter().all(|c| c.background && c.deadline.is_none()));
}

#[tokio::test]
async fn test_context_calls_forward_caller_context() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool.clone());
    let ctx = Context::background().with_timeout(Duration::from_secs(30));

    executor
        .exec_context(&ctx, "DELETE FROM sessions", &[])
        .await
        .unwrap();
    executor.query_context(&ctx, "SELECT 1", &[]).await.unwrap();
    executor.query_row_context(&ctx, "SELECT 2", &[]).await;

    let calls = pool.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert!(!call.background);
        assert_eq!(call.deadline, ctx.deadline());
    }
}

#[tokio::test]
async fn test_cancelled_context_errors_pass_through() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool);
    let (ctx, handle) = Context::background().with_cancel();
    handle.cancel();

    let err = executor.exec_context(&ctx, "SELECT 1", &[]).await.unwrap_err();
    assert!(matches!(err, DbError::Canceled));
}

#[tokio::test]
async fn test_begin_forwards_to_pool() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool.clone());

    let _tx = executor.begin().await.unwrap();
    assert_eq!(calls_named(&pool.log(), "begin").len(), 1);
}

#[tokio::test]
async fn test_begin_tx_forwards_context_and_options() {
    let pool = RecordingPool::new();
    let executor = PoolExecutor::new(pool.clone());
    let ctx = Context::background().with_timeout(Duration::from_secs(10));
    let opts = TxOptions::new()
        .isolation(IsolationLevel::Serializable)
        .read_only()
        .deferrable(DeferrableMode::Deferrable);

    let _tx = executor.begin_tx(&ctx, opts).await.unwrap();

    let calls = calls_named(&pool.log(), "begin_tx");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].opts, Some(opts));
    assert_eq!(calls[0].deadline, ctx.deadline());
}

#[tokio::test]
async fn test_begin_tx_cancelled_mid_call() {
    let pool = RecordingPool::with_slow_begin();
    let executor = PoolExecutor::new(pool);
    let (ctx, handle) = Context::background().with_cancel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let err = executor
        .begin_tx(&ctx, TxOptions::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::Canceled));
}
