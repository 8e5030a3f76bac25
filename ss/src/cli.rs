//! CLI argument parsing for the statestore demo

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Redux-style state container demo", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive a composed synchronous store: dispatch, inspect, revert
    Walk {
        /// Number of actions to dispatch
        #[arg(short, long)]
        steps: Option<usize>,
    },

    /// Dispatch to an async store from several tasks with an async subscriber
    Pump {
        /// Number of concurrent dispatching tasks
        #[arg(short, long)]
        tasks: Option<usize>,

        /// Actions dispatched per task
        #[arg(short, long)]
        steps: Option<usize>,
    },
}
