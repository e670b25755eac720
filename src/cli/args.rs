//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Lin CMS admin service - user, group and permission management
#[derive(Parser, Debug)]
#[command(name = "lin-cms-admin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage administrator accounts
    Admin(AdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "SERVER_PORT")]
    pub port: u16,

    /// JSON file with extra dispatchable permissions
    #[arg(long, env = "PERMISSIONS_FILE")]
    pub permissions: Option<String>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Drop every table and re-run all migrations
    Fresh {
        /// Confirm that all data may be dropped
        #[arg(long)]
        yes: bool,
    },
}

/// Arguments for the admin command
#[derive(Parser, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

/// Administrator account actions
#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Create a super administrator
    Create {
        /// Login nickname
        #[arg(long)]
        nickname: String,
        /// Password (6 to 22 characters)
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
    },
    /// Issue an access token for a user
    Token {
        /// User id
        #[arg(long)]
        user_id: i32,
    },
}
