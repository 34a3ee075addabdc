use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "reminder")]
#[command(about = "Notes and reminders kept as local JSON files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding notes.json and reminders.json
    #[arg(long, global = true, env = "REMINDER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "REMINDER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rolling log files (defaults to <data-dir>/logs)
    #[arg(long, global = true, env = "REMINDER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage notes
    Note {
        #[command(subcommand)]
        cmd: NoteCommands,
    },

    /// Manage reminders
    Reminder {
        #[command(subcommand)]
        cmd: ReminderCommands,
    },

    /// Request notification permission and print the resulting state
    Permission,
}

#[derive(Debug, Subcommand)]
pub enum NoteCommands {
    /// Create a note
    Add {
        /// Note text
        content: String,
    },

    /// List notes by title
    List,

    /// Print the full text of one note
    Show {
        /// 1-based position from `note list`, or the note id
        target: String,
    },

    /// Replace the text of one note
    Edit {
        /// 1-based position from `note list`, or the note id
        target: String,

        /// New note text
        content: String,
    },

    /// Delete notes
    Rm {
        /// 1-based positions from `note list`, or note ids
        #[arg(required = true)]
        targets: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReminderCommands {
    /// Create a reminder and print its notification payload
    Add {
        /// Reminder text
        content: String,

        /// Fire time: RFC 3339, or `YYYY-MM-DD HH:MM` in local time
        #[arg(long)]
        at: String,
    },

    /// List reminders with their fire times
    List,

    /// Delete reminders and cancel their notifications
    Rm {
        /// 1-based positions from `reminder list`, or reminder ids
        #[arg(required = true)]
        targets: Vec<String>,
    },
}
