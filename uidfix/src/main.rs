//! uidfix: repair duplicate and missing uids in node trees.
//!
//! Trees are read as JSON. `fix` prints the fixed tree together with the
//! renames it made; `check` only reports duplicates.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use uidfix::check::{CheckOutcome, check_file};
use uidfix::core::FatalError;
use uidfix::core::extract::stable_uid_of;
use uidfix::core::generator::{UidGenerator, next_counter_value};
use uidfix::core::path::uid_path;
use uidfix::exit_codes;
use uidfix::fix::{FixOptions, fix_from_files};
use uidfix::io::config::{init_config, load_config};
use uidfix::io::tree_store::{load_tree, write_json};
use uidfix::logging;

const DEFAULT_CONFIG: &str = "uidfix.toml";

#[derive(Parser)]
#[command(
    name = "uidfix",
    version,
    about = "Keep node uids unique across a document tree"
)]
struct Cli {
    /// Log reconciliation details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fix duplicate or missing uids and print the tree with its renames.
    Fix {
        /// Tree to fix (JSON).
        tree: PathBuf,
        /// JSON array of uids already used elsewhere in the document.
        #[arg(long)]
        used_ids: Option<PathBuf>,
        /// Highlight bounds keyed by uid, relocated to the new uids.
        #[arg(long)]
        highlight_bounds: Option<PathBuf>,
        /// Write the report here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Config file (TOML).
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Generate short, reproducible uids.
        #[arg(long)]
        deterministic: bool,
    },
    /// Write a default `uidfix.toml` if missing.
    Init {
        /// Config file to create.
        #[arg(long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
    /// Report duplicate uids; exits non-zero if any are found.
    Check {
        /// Tree to check (JSON).
        tree: PathBuf,
    },
    /// Print the `/`-separated uid path from the root to a uid.
    Path {
        /// Tree to search (JSON).
        tree: PathBuf,
        /// Uid to locate.
        uid: String,
    },
    /// Print the stable uid recorded on the node currently carrying UID.
    StableUid {
        /// Tree to search (JSON).
        tree: PathBuf,
        /// Current uid of the node.
        uid: String,
    },
    /// Print the counter value following VALUE.
    NextUid { value: String },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Fix {
            tree,
            used_ids,
            highlight_bounds,
            output,
            config,
            deterministic,
        } => {
            let options = FixOptions {
                tree_path: tree,
                used_ids_path: used_ids,
                highlight_bounds_path: highlight_bounds,
            };
            cmd_fix(&options, output.as_deref(), &config, deterministic)
        }
        Command::Init { config, force } => cmd_init(&config, force),
        Command::Check { tree } => cmd_check(&tree),
        Command::Path { tree, uid } => cmd_path(&tree, &uid),
        Command::StableUid { tree, uid } => cmd_stable_uid(&tree, &uid),
        Command::NextUid { value } => {
            println!("{}", next_counter_value(&value)?);
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_fix(
    options: &FixOptions,
    output: Option<&Path>,
    config_path: &Path,
    deterministic: bool,
) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let mut generator = if deterministic {
        UidGenerator::deterministic()
    } else {
        cfg.generator()
    };
    let report = fix_from_files(options, &mut generator)?;
    match output {
        Some(path) => write_json(path, &report)?,
        None => print_json(&report, cfg.pretty)?,
    }
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if !init_config(config_path, force)? {
        eprintln!(
            "{} already exists; pass --force to overwrite",
            config_path.display()
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_check(tree: &Path) -> Result<i32> {
    match check_file(tree)? {
        CheckOutcome::Unique => Ok(exit_codes::OK),
        CheckOutcome::Duplicates(errors) => {
            for error in &errors {
                println!("{}", error);
            }
            Ok(exit_codes::DUPLICATES)
        }
    }
}

fn cmd_path(tree: &Path, uid: &str) -> Result<i32> {
    let root = load_tree(tree)?;
    let path = uid_path(&root, uid).with_context(|| format!("uid '{}' not found", uid))?;
    println!("{}", path);
    Ok(exit_codes::OK)
}

fn cmd_stable_uid(tree: &Path, uid: &str) -> Result<i32> {
    let root = load_tree(tree)?;
    let stable = stable_uid_of(&root, uid)
        .with_context(|| format!("uid '{}' not found", uid))?
        .with_context(|| format!("read stable uid of '{}'", uid))?;
    println!("{}", stable);
    Ok(exit_codes::OK)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serialize json")?;
    println!("{}", payload);
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<FatalError>().is_some() {
        exit_codes::FATAL
    } else {
        exit_codes::INVALID
    }
}
