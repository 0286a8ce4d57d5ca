//! Command-line surface for `deptportal-cli`.

#![deny(clippy::all, clippy::pedantic)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use deptportal::config::ConfigOverrides;
use deptportal_api_types::applications::{ApplicationStatus, Decision};
use deptportal_api_types::content::PostStatus;
use deptportal_api_types::records::Audience;

#[derive(Parser, Debug)]
#[command(
    name = "deptportal-cli",
    version,
    about = "Department portal API command-line client",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the current account
    Auth(AuthArgs),
    /// Notices and the homepage
    Notices(NoticesArgs),
    /// Department events
    Events(EventsArgs),
    /// Blog posts and moderation
    Blogs(BlogsArgs),
    /// Alumni directory
    Alumni(AlumniArgs),
    /// Society rosters
    Societies(SocietiesArgs),
    /// Applications and stage approvals
    Applications(ApplicationsArgs),
    /// Email logs, important data and broadcasts
    Records(RecordsArgs),
}

#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthCmd,
}

#[derive(Subcommand, Debug)]
pub enum AuthCmd {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// File containing the password (takes precedence over env)
        #[arg(long, env = "DEPTPORTAL_PASSWORD_FILE")]
        password_file: Option<PathBuf>,
        /// Password from env (no CLI flag, to keep it out of shell history)
        #[arg(long = "password-env", hide = true, env = "DEPTPORTAL_PASSWORD")]
        password_env: Option<String>,
    },
    /// Sign out and forget the session token
    Logout,
    /// Show the signed-in account
    Me,
}

#[derive(Parser, Debug)]
pub struct NoticesArgs {
    #[command(subcommand)]
    pub action: NoticesCmd,
}

#[derive(Subcommand, Debug)]
pub enum NoticesCmd {
    /// List notices
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Publish a notice
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_name = "PATH")]
        content_file: Option<PathBuf>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a notice
    Delete { id: String },
    /// Show the homepage content
    Homepage,
}

#[derive(Parser, Debug)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub action: EventsCmd,
}

#[derive(Subcommand, Debug)]
pub enum EventsCmd {
    /// List events
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Register the signed-in user for an event
    Register { id: String },
}

#[derive(Parser, Debug)]
pub struct BlogsArgs {
    #[command(subcommand)]
    pub action: BlogsCmd,
}

#[derive(Subcommand, Debug)]
pub enum BlogsCmd {
    /// List published posts
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// List the signed-in user's posts
    Mine,
    /// Submit a post, optionally with a cover image
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_name = "PATH")]
        content_file: Option<PathBuf>,
        #[arg(long)]
        category: String,
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// List posts awaiting moderation
    Pending,
    /// Approve or reject a pending post
    Moderate {
        id: String,
        #[arg(long, value_enum)]
        status: PostStatusArg,
        #[arg(long)]
        remarks: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct AlumniArgs {
    #[command(subcommand)]
    pub action: AlumniCmd,
}

#[derive(Subcommand, Debug)]
pub enum AlumniCmd {
    /// Search the alumni directory
    List {
        #[arg(long)]
        year: Option<u16>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct SocietiesArgs {
    #[command(subcommand)]
    pub action: SocietiesCmd,
}

#[derive(Subcommand, Debug)]
pub enum SocietiesCmd {
    /// List societies
    List,
    /// List the members of a society
    Members { society_id: String },
    /// Add a member to a society
    AddMember {
        society_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        position: String,
    },
    /// Remove a member from a society
    RemoveMember {
        society_id: String,
        #[arg(long)]
        user_id: String,
    },
}

#[derive(Parser, Debug)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub action: ApplicationsCmd,
}

#[derive(Subcommand, Debug)]
pub enum ApplicationsCmd {
    /// List applications, optionally filtered by stage
    List {
        #[arg(long, value_enum)]
        stage: Option<StageArg>,
    },
    /// List the signed-in user's applications
    Mine,
    /// Submit an application
    Submit {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: Option<String>,
        #[arg(long, value_name = "PATH")]
        body_file: Option<PathBuf>,
    },
    /// Decide the current stage of an application
    Decide {
        id: String,
        #[arg(long, value_enum)]
        decision: DecisionArg,
        #[arg(long)]
        remarks: Option<String>,
    },
}

#[derive(Parser, Debug)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub action: RecordsCmd,
}

#[derive(Subcommand, Debug)]
pub enum RecordsCmd {
    /// List sent emails
    EmailLogs {
        #[arg(long)]
        page: Option<u32>,
    },
    /// Upload an important document
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
    },
    /// Send a broadcast to an audience
    Broadcast {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: Option<String>,
        #[arg(long, value_name = "PATH")]
        message_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "all")]
        audience: AudienceArg,
        /// Also publish the message as a notice
        #[arg(long)]
        post_as_notice: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PostStatusArg {
    Approved,
    Rejected,
}

impl From<PostStatusArg> for PostStatus {
    fn from(value: PostStatusArg) -> Self {
        match value {
            PostStatusArg::Approved => PostStatus::Approved,
            PostStatusArg::Rejected => PostStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StageArg {
    L0,
    L1,
    L2,
    Approved,
    Rejected,
}

impl From<StageArg> for ApplicationStatus {
    fn from(value: StageArg) -> Self {
        match value {
            StageArg::L0 => ApplicationStatus::PendingL0,
            StageArg::L1 => ApplicationStatus::PendingL1,
            StageArg::L2 => ApplicationStatus::PendingL2,
            StageArg::Approved => ApplicationStatus::Approved,
            StageArg::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for Decision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Approve => Decision::Approve,
            DecisionArg::Reject => Decision::Reject,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AudienceArg {
    All,
    Students,
    Faculty,
    Alumni,
}

impl From<AudienceArg> for Audience {
    fn from(value: AudienceArg) -> Self {
        match value {
            AudienceArg::All => Audience::All,
            AudienceArg::Students => Audience::Students,
            AudienceArg::Faculty => Audience::Faculty,
            AudienceArg::Alumni => Audience::Alumni,
        }
    }
}
