//! uitrace - record a browser task as a dataset entry
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::PathBuf;
use uitrace::cli::{init_logging, run_task_for_request, TaskRequest};
use uitrace::Config;

/// Run a browser task and record its UI states
#[derive(Parser, Debug)]
#[command(name = "uitrace")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// App name, e.g. 'linear' or 'notion'
    #[arg(long, default_value = "linear")]
    app: String,

    /// Natural language request
    #[arg(long, default_value = "How do I create a project in Linear?")]
    request: String,

    /// Identifier for this task run (used in the dataset folder name)
    #[arg(long, default_value = "demo_task")]
    task_id: String,

    /// Dataset root directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Run a plan from a JSON file instead of planning the request
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,

    /// Use the logging stand-in instead of a real browser
    #[arg(long)]
    mock: bool,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(out_dir) = args.out_dir {
        config.dataset.out_dir = out_dir;
    }

    if args.headed {
        config.browser.headed = true;
    }

    if args.debug {
        config.executor.debug = true;
    }

    init_logging(config.executor.debug);

    let task = TaskRequest {
        app_name: args.app,
        request: args.request,
        task_id: args.task_id,
        plan_file: args.plan,
        mock: args.mock,
    };

    let task_dir = run_task_for_request(&config, &task).await?;
    println!("Dataset written to {}", task_dir.display());

    Ok(())
}
