//! Command-line arguments.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "jobtracker",
    version,
    about = "Track job applications, interviews and notes"
)]
pub struct Cli {
    /// Backend origin, e.g. https://jobs.example.com
    #[arg(long, global = true, env = "JOBTRACKER_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Where to keep the login token: "file" or "keyring"
    #[arg(long, global = true, env = "JOBTRACKER_TOKEN_STORE")]
    pub token_store: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account and log in
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show session state and configuration
    Status,
    /// Check what the route guard does with a client path
    Open { path: String },
    /// Application statistics
    Dashboard,
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Interviews(InterviewsCommand),
    #[command(subcommand)]
    Notes(NotesCommand),
}

#[derive(Subcommand, Debug)]
pub enum ApplicationsCommand {
    List,
    Show {
        id: i64,
    },
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    Create {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// applied, interview, offer, rejected or withdrawn
        #[arg(long, default_value = "applied")]
        status: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
    SetStatus {
        id: i64,
        status: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum InterviewsCommand {
    List,
    Upcoming,
    Calendar {
        start: NaiveDate,
        end: NaiveDate,
    },
    Schedule {
        #[arg(long)]
        application: i64,
        /// phone, video, onsite, technical, behavioral or final
        #[arg(long, default_value = "phone")]
        kind: String,
        /// RFC 3339 timestamp, e.g. 2024-05-10T15:00:00Z
        #[arg(long)]
        at: DateTime<Utc>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        link: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    List,
    Add {
        #[arg(long)]
        application: i64,
        #[arg(long)]
        title: String,
        content: String,
    },
    Delete {
        id: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_command() {
        let cli = Cli::try_parse_from([
            "jobtracker",
            "applications",
            "create",
            "--company",
            "Acme",
            "--position",
            "Engineer",
            "--date",
            "2024-05-01",
        ])
        .unwrap();
        match cli.command {
            Command::Applications(ApplicationsCommand::Create { company, date, status, .. }) => {
                assert_eq!(company, "Acme");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1));
                assert_eq!(status, "applied");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_backend_flag_is_global() {
        let cli =
            Cli::try_parse_from(["jobtracker", "whoami", "--backend-url", "http://x:1"]).unwrap();
        assert_eq!(cli.backend_url.as_deref(), Some("http://x:1"));
    }
}
