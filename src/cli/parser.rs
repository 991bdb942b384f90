use crate::export::ExportFormat;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rollcall
/// CLI application to take event attendance with SQLite
#[derive(Parser)]
#[command(
    name = "rollcall",
    version = env!("CARGO_PKG_VERSION"),
    about = "Take attendance for events from a fixed roster, by badge scan or manual override",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Search text and status selector shared by listing and export.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Case-insensitive text matched against id, name, cohort and group
    #[arg(long, short = 's', default_value = "")]
    pub search: String,

    /// all, present, absent or excused
    #[arg(long, default_value = "all")]
    pub status: String,
}

/// Which attendance to look at: one session, or every session of an event.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ContextArgs {
    #[arg(long = "session", help = "Session id")]
    pub session: Option<i64>,

    #[arg(long = "event", help = "Event id (all its sessions)")]
    pub event: Option<i64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init {
        #[arg(long = "sample", help = "Seed the roster with sample people")]
        sample: bool,
    },

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/vim/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Manage the roster
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },

    /// Create or list events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Create or list attendance sessions of an event
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// List attendance entries of a session or event
    Entries {
        #[command(flatten)]
        context: ContextArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Set the status of one person in a session (manual override)
    Mark {
        #[arg(long = "session", help = "Session id")]
        session: i64,

        /// Person id
        person: String,

        /// present, absent or excused
        status: String,
    },

    /// Scan badges and mark people present
    Scan {
        #[arg(long = "session", help = "Session id")]
        session: i64,

        #[arg(
            long = "feed",
            value_name = "FILE",
            help = "Read frames from a file (one line per frame) instead of stdin"
        )]
        feed: Option<String>,

        #[arg(long = "interval-ms", help = "Polling interval in milliseconds")]
        interval_ms: Option<u64>,

        #[arg(long = "debounce-ms", help = "Quiet window for repeated codes in milliseconds")]
        debounce_ms: Option<u64>,
    },

    /// Export attendance of a session or event
    Export {
        #[command(flatten)]
        context: ContextArgs,

        #[arg(long, value_enum, default_value = "xlsx")]
        format: ExportFormat,

        #[arg(
            long,
            value_name = "FILE",
            help = "Absolute output path (default: attendance_report_<context>_<time> in the current directory)"
        )]
        file: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, short = 'f', help = "Overwrite output file without confirmation")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum PersonAction {
    /// Add a person (an existing id is left unchanged)
    Add {
        id: String,
        name: String,

        #[arg(long, default_value = "", help = "Cohort, e.g. year level")]
        cohort: String,

        #[arg(long, default_value = "", help = "Group, e.g. program or course")]
        group: String,
    },

    /// List the roster
    List {
        #[arg(long, short = 's', default_value = "")]
        search: String,
    },

    /// Show one person
    Show { id: String },

    /// Import people from a CSV file (header: id,name,cohort,group)
    Import {
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Remove a person and their attendance entries
    Del { id: String },

    /// Write one QR badge PNG per person, grouped by cohort
    Qr {
        #[arg(
            long,
            value_name = "DIR",
            default_value = "student_qrcodes",
            help = "Output directory (one subdirectory per cohort)"
        )]
        out: String,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Create an event dated today
    Create { name: String },

    /// List events
    List,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Create a session and snapshot the current roster into it
    Create {
        #[arg(long = "event", help = "Owning event id")]
        event: i64,

        name: String,
    },

    /// List the sessions of an event
    List {
        #[arg(long = "event", help = "Event id")]
        event: i64,
    },
}
