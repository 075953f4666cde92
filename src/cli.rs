use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::candidate::OperationKind;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Fold provisioned candidate trees into live server installations",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Installation selection shared by most commands
#[derive(Args, Debug, Clone)]
pub struct InstallationArgs {
    /// Installation directory (defaults to the configured one, then `.`)
    #[arg(short, long, env = "FERRY_INSTALLATION")]
    pub dir: Option<PathBuf>,
}

/// Candidate selection shared by candidate commands
#[derive(Args, Debug, Clone)]
pub struct CandidateArgs {
    /// Provisioned candidate directory
    pub candidate: PathBuf,

    /// Operation the candidate performs
    #[arg(short, long, value_enum, default_value_t = OperationKind::Update)]
    pub operation: OperationKind,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show installation state and local changes
    Status {
        #[command(flatten)]
        installation: InstallationArgs,

        /// Also validate this candidate
        #[arg(long)]
        candidate: Option<PathBuf>,

        /// Operation to validate the candidate for
        #[arg(short, long, value_enum, default_value_t = OperationKind::Update)]
        operation: OperationKind,
    },

    /// Record the current tree as the installation's baseline
    Init {
        #[command(flatten)]
        installation: InstallationArgs,

        /// Replace an existing baseline
        #[arg(long)]
        force: bool,
    },

    /// Check configured sources for newer component versions
    Updates {
        #[command(flatten)]
        installation: InstallationArgs,

        /// Number of concurrent lookups
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Mark a provisioned tree as a candidate for this installation
    Stamp {
        #[command(flatten)]
        candidate: CandidateArgs,

        #[command(flatten)]
        installation: InstallationArgs,
    },

    /// Preview the conflicts applying a candidate would produce
    Conflicts {
        #[command(flatten)]
        candidate: CandidateArgs,

        #[command(flatten)]
        installation: InstallationArgs,

        /// Show a text diff for each conflicting file
        #[arg(long)]
        diff: bool,
    },

    /// Merge a candidate into the installation
    Apply {
        #[command(flatten)]
        candidate: CandidateArgs,

        #[command(flatten)]
        installation: InstallationArgs,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Back up the installation first and restore it if the merge fails
        #[arg(long)]
        backup: bool,
    },

    /// List recorded revisions
    History {
        #[command(flatten)]
        installation: InstallationArgs,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
