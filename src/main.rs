//! sqlcap - run SQL statements through a capability-typed database handle.

use clap::Parser;
use sqlcap::config::Config;
use sqlcap::db::DbPool;
use sqlcap::{Context, ContextExecutor, DbResult, Handle, Transactor};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries results; logs go to stderr
    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Statements whose result is a row set rather than an affected-row count.
fn returns_rows(sql: &str) -> bool {
    let lower = sql.trim_start().to_ascii_lowercase();
    ["select", "with", "values", "show", "explain", "pragma", "describe"]
        .iter()
        .any(|kw| lower.starts_with(kw))
        || lower
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|word| word == "returning")
}

async fn run_statement<E>(executor: &E, ctx: &Context, sql: &str) -> DbResult<()>
where
    E: ContextExecutor + ?Sized,
{
    if returns_rows(sql) {
        let rows = executor.query_context(ctx, sql, &[]).await?;
        for row in &rows {
            println!("{}", serde_json::Value::Object(row.clone()));
        }
        info!(row_count = rows.len(), "Query complete");
    } else {
        let tag = executor.exec_context(ctx, sql, &[]).await?;
        println!("{}", tag);
    }
    Ok(())
}

async fn run(config: &Config, handle: &Handle) -> DbResult<()> {
    let ctx = match config.timeout_duration() {
        Some(timeout) => Context::background().with_timeout(timeout),
        None => Context::background(),
    };

    if !config.uses_transaction() {
        for sql in &config.statements {
            run_statement(handle, &ctx, sql).await?;
        }
        return Ok(());
    }

    let tx = sqlcap::begin_tx(&ctx, config.tx_options()).await?;
    for sql in &config.statements {
        if let Err(e) = run_statement(tx.as_ref(), &ctx, sql).await {
            warn!(error = %e, "Statement failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            return Err(e);
        }
    }
    tx.commit(&ctx).await?;
    info!(statements = config.statements.len(), "Transaction committed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_tracing(&config);

    let db_config = config.database_config()?;
    let pool = match DbPool::connect(&db_config).await {
        Ok(pool) => pool,
        Err(e) => {
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            return Err(e.into());
        }
    };

    let handle = Arc::new(Handle::from_pool(pool.clone()));
    sqlcap::set_db(handle.clone());

    let result = run(&config, &handle).await;
    pool.close().await;

    if let Err(e) = result {
        if e.is_cancellation() {
            error!(timeout_secs = config.timeout, "Timed out");
        }
        return Err(Box::new(e) as Box<dyn std::error::Error>);
    }
    Ok(())
}
