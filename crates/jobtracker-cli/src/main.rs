//! jobtracker - command-line client for the job application tracker.
//!
//! Every invocation restores the saved session first, then runs one command
//! through the same route guard the web client uses.

mod app;
mod cli;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Result};
use chrono::Local;
use clap::Parser;
use jobtracker_core::models::{
    ApplicationStatus, InterviewType, NewInterview, NewJobApplication, NewNote,
};
use jobtracker_core::{Access, Route};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{ApplicationsCommand, Cli, Command, InterviewsCommand, NotesCommand};

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes buffered log lines on drop, so it has to live
/// until the end of `main`.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

fn parse_status(code: &str) -> Result<ApplicationStatus> {
    ApplicationStatus::from_code(code).ok_or_else(|| {
        let known: Vec<&str> = ApplicationStatus::ALL.iter().map(|s| s.code()).collect();
        anyhow!("unknown status '{}', expected one of: {}", code, known.join(", "))
    })
}

fn parse_interview_type(kind: &str) -> Result<InterviewType> {
    serde_json::from_value(serde_json::Value::String(kind.trim().to_ascii_lowercase()))
        .ok()
        .filter(|t| *t != InterviewType::Other)
        .ok_or_else(|| anyhow!("unknown interview type '{}'", kind))
}

async fn run_applications(app: &mut App, command: ApplicationsCommand) -> Result<()> {
    match command {
        ApplicationsCommand::List => {
            app.require(Route::Applications)?;
            let apps = app.api.list_applications().await?;
            println!("{}", output::application_rows(&apps));
        }
        ApplicationsCommand::Show { id } => {
            app.require(Route::ApplicationDetail(id))?;
            let record = app.api.get_application(id).await?;
            println!("{}", output::application_detail(&record));
        }
        ApplicationsCommand::Search { query } => {
            app.require(Route::Applications)?;
            let results = app.api.search_applications(&query.join(" ")).await?;
            println!("{}", output::search_results(&results));
        }
        ApplicationsCommand::Create {
            company,
            position,
            date,
            status,
            location,
            url,
            source,
        } => {
            app.require(Route::NewApplication)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut new_app = NewJobApplication::new(&company, &position, date);
            new_app.status = parse_status(&status)?;
            new_app.location = location.unwrap_or_default();
            new_app.job_url = url.unwrap_or_default();
            new_app.source = source.unwrap_or_default();

            let created = app.api.create_application(&new_app).await?;
            println!("Created #{}: {}", created.id, created.title());
        }
        ApplicationsCommand::SetStatus { id, status } => {
            app.require(Route::EditApplication(id))?;
            let status = parse_status(&status)?;
            let record = app.api.get_application(id).await?;
            let Some(mut update) = record.to_update() else {
                bail!("Application #{} has no application date and cannot be updated", id);
            };
            update.status = status;
            let updated = app.api.update_application(id, &update).await?;
            println!("#{} is now {}", updated.id, updated.status);
        }
        ApplicationsCommand::Delete { id } => {
            app.require(Route::ApplicationDetail(id))?;
            app.api.delete_application(id).await?;
            println!("Deleted application #{}", id);
        }
    }
    Ok(())
}

async fn run_interviews(app: &mut App, command: InterviewsCommand) -> Result<()> {
    app.require(Route::Interviews)?;
    match command {
        InterviewsCommand::List => {
            let interviews = app.api.list_interviews().await?;
            println!("{}", output::interviews(&interviews));
        }
        InterviewsCommand::Upcoming => {
            let interviews = app.api.upcoming_interviews().await?;
            println!("{}", output::interviews(&interviews));
        }
        InterviewsCommand::Calendar { start, end } => {
            let interviews = app.api.interview_calendar(start, end).await?;
            println!("{}", output::interviews(&interviews));
        }
        InterviewsCommand::Schedule {
            application,
            kind,
            at,
            duration,
            link,
        } => {
            let mut interview = NewInterview::new(application, parse_interview_type(&kind)?, at);
            if let Some(minutes) = duration {
                interview.duration_minutes = minutes;
            }
            interview.meeting_link = link.unwrap_or_default();

            let created = app.api.create_interview(&interview).await?;
            println!(
                "Scheduled {} interview for application #{} on {}",
                created.interview_type,
                created.job_application,
                created.scheduled_date.format("%b %d, %Y %H:%M")
            );
        }
        InterviewsCommand::Delete { id } => {
            app.api.delete_interview(id).await?;
            println!("Deleted interview #{}", id);
        }
    }
    Ok(())
}

async fn run_notes(app: &mut App, command: NotesCommand) -> Result<()> {
    match command {
        NotesCommand::List => {
            app.require(Route::Applications)?;
            let notes = app.api.list_notes().await?;
            println!("{}", output::notes(&notes));
        }
        NotesCommand::Add {
            application,
            title,
            content,
        } => {
            app.require(Route::ApplicationDetail(application))?;
            let note = app
                .api
                .create_note(&NewNote::new(application, &title, &content))
                .await?;
            println!("Added note \"{}\" to application #{}", note.title, note.job_application);
        }
        NotesCommand::Delete { id } => {
            app.require(Route::Applications)?;
            app.api.delete_note(id).await?;
            println!("Deleted note #{}", id);
        }
    }
    Ok(())
}

async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => app.login_interactive(username).await?,
        Command::Register { username, email } => {
            app.register_interactive(username, email).await?
        }
        Command::Logout => {
            app.session.logout();
            println!("Logged out");
        }
        Command::Whoami => match app.snapshot().user() {
            Some(user) => println!("{}", output::user(user)),
            None => bail!("Not logged in"),
        },
        Command::Status => {
            let session = app.snapshot();
            println!("Backend:  {}", app.api.base_url());
            println!("Storage:  {:?}", app.store_kind);
            match session.user() {
                Some(user) => println!("Session:  logged in as {}", user.username),
                None => println!("Session:  not logged in"),
            }
        }
        Command::Open { path } => {
            let (access, location) = app.open(&path);
            match access {
                Access::Allow => println!("{}", location),
                Access::Redirect(_) => println!("{} -> {}", path, location),
                Access::Pending => println!("{} (waiting for session)", path),
            }
        }
        Command::Dashboard => {
            app.require(Route::Dashboard)?;
            let (stats, upcoming) =
                futures::try_join!(app.api.dashboard_stats(), app.api.upcoming_interviews())?;
            println!("{}", output::dashboard(&stats, &upcoming));
        }
        Command::Applications(command) => run_applications(app, command).await?,
        Command::Interviews(command) => run_interviews(app, command).await?,
        Command::Notes(command) => run_notes(app, command).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("jobtracker starting");

    let mut app = match App::start(cli.backend_url.as_deref(), cli.token_store.as_deref()).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut app, cli.command).await;

    // A 401 anywhere above already cleared the stored credential.
    if app.session_expired() {
        eprintln!("Session expired. Please log in again: jobtracker login");
        return ExitCode::FAILURE;
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Offer").unwrap(), ApplicationStatus::Offer);
        let err = parse_status("ghosted").unwrap_err().to_string();
        assert!(err.contains("applied, interview, offer, rejected, withdrawn"));
    }

    #[test]
    fn test_parse_interview_type() {
        assert_eq!(parse_interview_type("Onsite").unwrap(), InterviewType::Onsite);
        assert!(parse_interview_type("coffee").is_err());
    }
}
