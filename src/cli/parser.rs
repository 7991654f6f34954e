use crate::export::{ExportData, ExportFormat};
use clap::{Parser, Subcommand};

/// Command-line interface definition for toil-ledger
/// CLI application to track TOIL and timesheets with SQLite
#[derive(Parser)]
#[command(
    name = "toil-ledger",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track time off in lieu (TOIL) and weekly timesheets, with an approval workflow, using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this user (defaults to `default_user` in the configuration)
    #[arg(global = true, long = "as", value_name = "USER")]
    pub actor: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage users and administrators
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Record, review and balance TOIL
    Toil {
        #[command(subcommand)]
        action: ToilCmd,
    },

    /// Log hours against projects and tasks
    Hours {
        #[command(subcommand)]
        action: HoursCmd,
    },

    /// Submit and review timesheets
    Timesheet {
        #[command(subcommand)]
        action: TimesheetCmd,
    },

    /// Show notifications of the acting user
    Notifications {
        #[arg(long = "unread", help = "Only unread notifications")]
        unread: bool,

        #[arg(long = "mark-read", help = "Mark all notifications as read")]
        mark_read: bool,
    },

    /// Export hours or TOIL entries
    Export {
        /// Which data to export
        #[arg(long, value_enum, default_value = "hours")]
        data: ExportData,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Output file path
        #[arg(long)]
        file: String,

        /// Period: YYYY, YYYY-MM, YYYY-MM-DD, ranges like YYYY-MM:YYYY-MM, or "all"
        #[arg(long)]
        range: Option<String>,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        task: Option<String>,

        /// Omit the Project column (task-scoped report)
        #[arg(long = "by-task")]
        by_task: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    /// Add or update a user
    Add {
        /// User email (identifier)
        email: String,

        #[arg(long, default_value = "")]
        name: String,

        /// Grant administrator privileges
        #[arg(long)]
        admin: bool,
    },
    /// List known users
    List,
}

#[derive(Subcommand)]
pub enum ToilCmd {
    /// Record earned and/or used TOIL for a day (updates the day's entry if present)
    Add {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Earned hours (HH:MM, rounded to the quarter hour)
        #[arg(long, default_value = "00:00")]
        earned: String,

        /// Used hours (HH:MM, rounded to the quarter hour)
        #[arg(long, default_value = "00:00")]
        used: String,

        #[arg(long)]
        comment: Option<String>,

        /// Owner of the entry (admins only; defaults to the acting user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Delete an entry by id
    Del { id: i64 },

    /// List entries
    List {
        #[arg(long)]
        user: Option<String>,

        /// Period: YYYY, YYYY-MM, YYYY-MM-DD or ranges like YYYY-MM:YYYY-MM
        #[arg(long, short)]
        period: Option<String>,
    },

    /// Show the TOIL balance
    Balance {
        #[arg(long)]
        user: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change TOIL limits (changes require an administrator)
    Settings {
        #[arg(long)]
        user: Option<String>,

        #[arg(long = "max-capacity", value_name = "HH:MM")]
        max_capacity: Option<String>,

        #[arg(long = "max-streak-hours", value_name = "HH:MM")]
        max_streak_hours: Option<String>,

        #[arg(long = "max-streak-days")]
        max_streak_days: Option<i64>,
    },

    /// Submit a week for review
    Submit {
        /// Any date of the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        week: Option<String>,

        #[arg(long)]
        user: Option<String>,
    },

    /// Cancel a pending submission
    Cancel { id: i64 },

    /// Approve a pending submission (administrators)
    Approve {
        id: i64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Reject a pending submission (administrators, comment required)
    Reject {
        id: i64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// List submissions
    Submissions {
        #[arg(long)]
        user: Option<String>,

        /// pending | approved | rejected
        #[arg(long)]
        status: Option<String>,
    },

    /// Recompute every stored balance (administrators)
    Recalc,
}

#[derive(Subcommand)]
pub enum HoursCmd {
    /// Log hours for a day
    Add {
        /// Date (YYYY-MM-DD)
        date: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        task: String,

        #[arg(long)]
        subtask: Option<String>,

        #[arg(long)]
        ticket: Option<String>,

        /// Hours (HH:MM)
        #[arg(long)]
        hours: String,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        user: Option<String>,
    },

    /// Delete a time entry by id
    Del { id: i64 },

    /// List logged hours
    List {
        #[arg(long)]
        user: Option<String>,

        #[arg(long, short)]
        period: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        task: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TimesheetCmd {
    /// Submit the hours of a date range
    Submit {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        #[arg(long)]
        user: Option<String>,
    },

    /// Approve a pending timesheet (administrators)
    Approve {
        id: i64,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Reject and archive a pending timesheet (administrators, reason required)
    Reject {
        id: i64,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List active timesheets
    List {
        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// List archived rejections
    Rejections {
        #[arg(long)]
        user: Option<String>,
    },
}
