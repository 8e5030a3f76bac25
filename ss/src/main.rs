use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::info;

use statestore::cli::{Cli, Command};
use statestore::config::Config;
use statestore::queue::SerialQueue;
use statestore::reducer::FnReducer;
use statestore::store::StoreError;
use statestore::{AsyncStore, Store};

/// Demo action: a ledger operation
#[derive(Debug, Clone, Copy)]
enum LedgerOp {
    Deposit(i64),
    Withdraw(i64),
}

/// Rejection raised by the balance reducer
#[derive(Debug, thiserror::Error)]
#[error("insufficient funds: balance {balance}, withdrawal {amount}")]
struct Overdraw {
    balance: i64,
    amount: i64,
}

/// Second sub-state: running operation counts
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    deposits: u64,
    withdrawals: u64,
}

fn balance_reducer() -> FnReducer<impl Fn(&i64, &LedgerOp) -> Result<i64, Overdraw>, i64> {
    FnReducer::new(|state: &i64, op: &LedgerOp| -> Result<i64, Overdraw> {
        match *op {
            LedgerOp::Deposit(amount) => Ok(state + amount),
            LedgerOp::Withdraw(amount) if amount <= *state => Ok(state - amount),
            LedgerOp::Withdraw(amount) => Err(Overdraw {
                balance: *state,
                amount,
            }),
        }
    })
}

fn tally_reducer() -> FnReducer<impl Fn(&Tally, &LedgerOp) -> Result<Tally, Infallible>, Tally> {
    FnReducer::new(|state: &Tally, op: &LedgerOp| -> Result<Tally, Infallible> {
        let mut next = *state;
        match op {
            LedgerOp::Deposit(_) => next.deposits += 1,
            LedgerOp::Withdraw(_) => next.withdrawals += 1,
        }
        Ok(next)
    })
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("statestore demo starting");

    match cli.command {
        Command::Walk { steps } => walk(steps.unwrap_or(config.steps)),
        Command::Pump { tasks, steps } => {
            pump(
                tasks.unwrap_or(config.tasks),
                steps.unwrap_or(config.steps),
            )
            .await
        }
    }
}

/// Synchronous store walkthrough: composed reducers, rejection, full revert
fn walk(steps: usize) -> Result<()> {
    let mut store = Store::new((balance_reducer(), tally_reducer()));

    for n in 1..=steps as i64 {
        let op = if n % 3 == 0 {
            LedgerOp::Withdraw(n)
        } else {
            LedgerOp::Deposit(2 * n)
        };
        match store.dispatch(op) {
            Ok(()) => {
                let (balance, tally) = *store.state();
                println!(
                    "{} {:?} -> balance {} ({} in, {} out)",
                    "✓".green(),
                    op,
                    balance.to_string().cyan(),
                    tally.deposits,
                    tally.withdrawals,
                );
            }
            Err(e) => println!("{} {:?} rejected: {}", "✗".red(), op, e),
        }
    }

    // a withdrawal the balance reducer must reject, leaving every slot as-is
    let before = *store.state();
    let overdraw = LedgerOp::Withdraw(i64::MAX);
    match store.dispatch(overdraw) {
        Err(StoreError::Reducer(e)) => {
            println!("{} {:?} rejected: {}", "✗".red(), overdraw, e);
        }
        other => eyre::bail!("overdraw unexpectedly passed: {other:?}"),
    }
    eyre::ensure!(
        store.state().0 == before.0,
        "balance changed on a rejected dispatch"
    );

    println!(
        "history depth {} - reverting to the seed",
        store.depth().to_string().yellow()
    );
    while store.revert() {}
    let (balance, tally) = *store.state();
    println!(
        "{} back at the seed: balance {}, {} deposits, {} withdrawals",
        "✓".green(),
        balance,
        tally.deposits,
        tally.withdrawals,
    );

    Ok(())
}

/// Async store demo: concurrent dispatchers, one reducer worker, audited
/// through an async subscriber queue
async fn pump(tasks: usize, steps: usize) -> Result<()> {
    let store = Arc::new(
        AsyncStore::spawn((balance_reducer(), tally_reducer()))
            .context("Failed to spawn async store")?,
    );
    let audit_queue = SerialQueue::named("audit").context("Failed to spawn audit queue")?;

    let audited = Arc::new(AtomicUsize::new(0));
    let audit_log = {
        let audited = Arc::clone(&audited);
        store.subscribe_async(&audit_queue, move || {
            audited.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };

    let mut dispatchers = Vec::with_capacity(tasks);
    for task in 0..tasks {
        let store = Arc::clone(&store);
        dispatchers.push(tokio::spawn(async move {
            let mut committed = 0usize;
            let mut rejected = 0usize;
            for step in 0..steps as i64 {
                let op = if step % 4 == 3 {
                    LedgerOp::Withdraw(100 * (task as i64 + 1))
                } else {
                    LedgerOp::Deposit(step + 1)
                };
                match store.dispatch(op).wait().await {
                    Ok(()) => committed += 1,
                    Err(_) => rejected += 1,
                }
            }
            (committed, rejected)
        }));
    }

    let mut committed = 0;
    let mut rejected = 0;
    for dispatcher in dispatchers {
        let (ok, no) = dispatcher.await.context("dispatcher task panicked")?;
        committed += ok;
        rejected += no;
    }

    // every committed dispatch queued exactly one audit invocation
    audit_log
        .wait_all()
        .await
        .context("audit subscriber failed")?;

    let (balance, tally) = store.state();
    println!(
        "{} {} committed, {} rejected across {} tasks",
        "✓".green(),
        committed.to_string().cyan(),
        rejected.to_string().yellow(),
        tasks,
    );
    println!(
        "  balance {} after {} deposits / {} withdrawals, {} audits",
        balance,
        tally.deposits,
        tally.withdrawals,
        audited.load(Ordering::SeqCst),
    );

    store.shutdown();
    Ok(())
}
