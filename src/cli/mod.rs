//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::SharePolicy;

pub mod commands;

/// Hearth - shared recipes, meals, shopping and todos, kept in sync
#[derive(Parser, Debug)]
#[command(name = "hearth", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.hearth/data/hearth.db)
    #[arg(long, global = true, env = "HEARTH_DB")]
    pub db: Option<PathBuf>,

    /// User local actions are attributed to
    #[arg(long, global = true, env = "HEARTH_USER")]
    pub user: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output only the ID (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a remote payload to the local store
    Ingest {
        /// Payload file (JSON object keyed by kind)
        file: PathBuf,

        /// Skip recomputing space relationships afterwards
        #[arg(long)]
        no_reshare: bool,
    },

    /// Write locally changed entities to the outbox
    Export {
        /// Output file (default: ~/.hearth/outbox/payload.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show entity totals and pending changes
    Status,

    /// Space management
    Space {
        #[command(subcommand)]
        command: SpaceCommands,
    },

    /// Recompute space relationships for a user's content
    Reshare {
        /// User ID (default: the acting user)
        user: Option<String>,

        /// Recompute for every user in the store
        #[arg(long, conflicts_with = "user")]
        all: bool,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Space Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum SpaceCommands {
    /// Create a space owned by the acting user
    Create {
        /// Space name
        name: String,
    },

    /// Add a member to a space
    AddMember {
        /// Space ID
        space: String,
        /// User ID
        member: String,
    },

    /// Remove a member from a space
    RemoveMember {
        /// Space ID
        space: String,
        /// User ID
        member: String,
    },

    /// Turn an auto-share policy on or off
    Policy {
        /// Space ID
        space: String,
        /// Content kind the policy governs
        #[arg(value_enum)]
        policy: PolicyArg,
        /// Turn the policy off instead of on
        #[arg(long)]
        off: bool,
    },

    /// Share todo items of a category with the space
    ShareCategory {
        /// Space ID
        space: String,
        /// Category name
        category: String,
    },

    /// Stop sharing a todo category with the space
    UnshareCategory {
        /// Space ID
        space: String,
        /// Category name
        category: String,
    },

    /// List spaces
    List,
}

/// Auto-share policy names on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    Recipes,
    Meals,
    ShoppingItems,
}

impl From<PolicyArg> for SharePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Recipes => Self::Recipes,
            PolicyArg::Meals => Self::Meals,
            PolicyArg::ShoppingItems => Self::ShoppingItems,
        }
    }
}
