// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create an account
    Signup {
        #[arg(value_name = "EMAIL")]
        email: String,

        /// Read from PNOTE_PASSWORD or prompt when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in and remember the session
    Login {
        #[arg(value_name = "EMAIL")]
        email: String,

        /// Read from PNOTE_PASSWORD or prompt when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the session
    Logout,

    /// Show who is signed in
    Status,

    /// List notes, newest first
    List {
        /// Only notes whose text contains this
        #[arg(short, long, value_name = "TEXT")]
        search: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one note
    Show {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a note
    Add {
        /// Note text
        #[arg(value_name = "TEXT", default_value = "")]
        text: String,

        /// Image file to attach
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,
    },

    /// Flip a note between done and not done
    Toggle {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,
    },

    /// Delete one or more notes
    Delete {
        #[arg(value_name = "NOTE_ID", required = true, num_args = 1..)]
        note_ids: Vec<i64>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Change a note's text or image
    Edit {
        #[arg(value_name = "NOTE_ID")]
        note_id: i64,

        /// New text
        #[arg(short, long)]
        text: Option<String>,

        /// New image file
        #[arg(short, long, value_name = "PATH", conflicts_with = "clear_image")]
        image: Option<PathBuf>,

        /// Remove the attached image
        #[arg(long)]
        clear_image: bool,
    },

    /// Show or change the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileAction {
    /// Show profile details
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update display name or phone
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Upload a new avatar image
    Avatar {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective config
    Show,
}
