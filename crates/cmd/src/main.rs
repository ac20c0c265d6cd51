// Copyright 2026 Duraq Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use duraq::{Queue, QueueBuilder};
use snafu::{ResultExt, Whatever};

mod build_info;

#[derive(Debug, Parser)]
#[clap(
name = "duraq",
about= "duraq-cmd",
author = build_info::AUTHOR,
version = build_info::FULL_VERSION)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Push(PushArgs),
    Pop(PopArgs),
    Len(LenArgs),
}

impl Commands {
    const fn queue_args(&self) -> &QueueArgs {
        match self {
            Self::Push(args) => &args.queue,
            Self::Pop(args) => &args.queue,
            Self::Len(args) => &args.queue,
        }
    }
}

/// Options shared by every queue command.
#[derive(Debug, Clone, Args)]
struct QueueArgs {
    /// Snapshot file path; omit for a purely in-memory queue.
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Passphrase for snapshot encryption.
    #[arg(long)]
    passphrase: Option<String>,

    /// Auto-persist interval in seconds.
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Route operations through a registered native backend when available.
    #[arg(long)]
    native: bool,

    /// Enable log output.
    #[arg(short, long)]
    verbose: bool,
}

impl QueueArgs {
    fn open(&self) -> Result<Queue, Whatever> {
        let mut builder = QueueBuilder::new()
            .auto_persist_interval(Duration::from_secs(self.interval))
            .use_native_backend(self.native);
        if let Some(path) = &self.path {
            builder = builder.save_path(path);
        }
        if let Some(passphrase) = &self.passphrase {
            builder = builder.passphrase(passphrase);
        }
        builder.build().whatever_context("failed to open queue")
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Append one or more items to the queue, in order.
Examples:

duraq push --path queue.db 'hello'
duraq push --path queue.db 'first' 'second' 'third'

")]
struct PushArgs {
    /// Items to append.
    #[arg(required = true)]
    items: Vec<String>,

    #[command(flatten)]
    queue: QueueArgs,
}

impl PushArgs {
    fn run(&self) -> Result<(), Whatever> {
        let mut queue = self.queue.open()?;
        queue
            .push_batch(&self.items)
            .whatever_context("failed to push items")?;
        queue.stop().whatever_context("failed to stop queue")
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Remove and print the oldest items, one per line. Prints fewer than
requested when the queue runs empty.
Examples:

duraq pop --path queue.db
duraq pop --path queue.db -n 5

")]
struct PopArgs {
    /// Number of items to pop.
    #[arg(short, long, default_value_t = 1)]
    n: usize,

    #[command(flatten)]
    queue: QueueArgs,
}

impl PopArgs {
    fn run(&self) -> Result<(), Whatever> {
        let mut queue = self.queue.open()?;
        let items = queue
            .pop_batch(self.n)
            .whatever_context("failed to pop items")?;
        for item in items {
            println!("{item}");
        }
        queue.stop().whatever_context("failed to stop queue")
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Print the number of queued items.
Examples:

duraq len --path queue.db

")]
struct LenArgs {
    #[command(flatten)]
    queue: QueueArgs,
}

impl LenArgs {
    fn run(&self) -> Result<(), Whatever> {
        let mut queue = self.queue.open()?;
        let length = queue.length().whatever_context("failed to read length")?;
        println!("{length}");
        queue.stop().whatever_context("failed to stop queue")
    }
}

fn main() -> Result<(), Whatever> {
    let cli = Cli::parse();

    let _log_guards = if cli.commands.queue_args().verbose {
        duraq_common_telemetry::set_panic_hook();
        duraq_common_telemetry::init_tracing_subscriber("duraq")
    } else {
        Vec::new()
    };

    match cli.commands {
        Commands::Push(args) => args.run(),
        Commands::Pop(args) => args.run(),
        Commands::Len(args) => args.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_accepts_multiple_items() {
        let cli = Cli::try_parse_from(["duraq", "push", "--path", "q.db", "a", "b", "c"]).unwrap();
        let Commands::Push(args) = cli.commands else {
            panic!("expected push command");
        };
        assert_eq!(args.items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_push_requires_at_least_one_item() {
        assert!(Cli::try_parse_from(["duraq", "push", "--path", "q.db"]).is_err());
    }

    #[test]
    fn test_pop_count_defaults_to_one() {
        let cli = Cli::try_parse_from(["duraq", "pop", "--path", "q.db"]).unwrap();
        let Commands::Pop(args) = cli.commands else {
            panic!("expected pop command");
        };
        assert_eq!(args.n, 1);
    }

    #[test]
    fn test_pop_count_flag() {
        let cli = Cli::try_parse_from(["duraq", "pop", "-n", "5"]).unwrap();
        let Commands::Pop(args) = cli.commands else {
            panic!("expected pop command");
        };
        assert_eq!(args.n, 5);
    }
}
