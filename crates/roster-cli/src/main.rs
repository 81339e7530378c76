//! Roster CLI
//!
//! The `roster` command manages user records held by a usuarios API.
//!
//! ## Commands
//!
//! - `list`: Show every record
//! - `add`: Create a record
//! - `edit`: Change a record's name and/or email
//! - `remove`: Delete a record after confirmation

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn, Level};

use roster_core::{
    Action, ActionResult, ClientError, Driver, Roster, RowView, TracingNotifier, CONFIRM_PROMPT,
};
use roster_state::{ClientConfig, HttpAuthority, RecordId};

#[derive(Parser)]
#[command(name = "roster")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage user records on a usuarios API", long_about = None)]
struct Cli {
    /// Base URL of the usuarios API
    #[arg(long, global = true, env = "ROSTER_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all records
    List,

    /// Create a record
    Add {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,
    },

    /// Edit a record in place
    Edit {
        /// Record ID
        id: i64,

        /// New name (default: keep current)
        #[arg(short, long)]
        name: Option<String>,

        /// New email (default: keep current)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Delete a record
    Remove {
        /// Record ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// A loaded roster plus the driver that runs its requests.
struct Session {
    driver: Driver,
    roster: Roster,
}

impl Session {
    async fn open(api_url: &str) -> Result<Self> {
        let authority = HttpAuthority::new(ClientConfig::new(api_url))
            .context("Failed to build HTTP client")?;
        let driver = Driver::new(Arc::new(authority));
        let mut roster = Roster::new(Arc::new(TracingNotifier));

        driver
            .start(&mut roster)
            .await
            .with_context(|| format!("Could not reach the usuarios API at {api_url}"))?;

        Ok(Session { driver, roster })
    }

    async fn act(&mut self, action: Action) -> Result<()> {
        debug!(?action, "cli action");
        settle(self.driver.act(&mut self.roster, action).await)
    }
}

/// Exit status for one action. Only loads fail with a connection error, so
/// one here means the change went through and the refresh after it did not;
/// the command still succeeds and the printed table may be stale.
fn settle(result: ActionResult<()>) -> Result<()> {
    match result {
        Err(err) if matches!(err.client(), Some(ClientError::ConnectionFailure(_))) => {
            warn!(error = %err, "change applied but the table could not be refreshed");
            Ok(())
        }
        other => Ok(other?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    roster_core::init_tracing(cli.json, level);

    let mut session = Session::open(&cli.api_url).await?;

    let outcome = match cli.command {
        Commands::List => Ok(()),
        Commands::Add { name, email } => cmd_add(&mut session, name, email).await,
        Commands::Edit { id, name, email } => {
            cmd_edit(&mut session, RecordId(id), name, email).await
        }
        Commands::Remove { id, yes } => cmd_remove(&mut session, RecordId(id), yes).await,
    };

    print_table(&session.roster);
    outcome
}

async fn cmd_add(session: &mut Session, name: String, email: String) -> Result<()> {
    session.act(Action::SetName(name)).await?;
    session.act(Action::SetEmail(email)).await?;
    session.act(Action::Submit).await
}

async fn cmd_edit(
    session: &mut Session,
    id: RecordId,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    if name.is_none() && email.is_none() {
        anyhow::bail!("Nothing to change: pass --name and/or --email");
    }

    session
        .act(Action::StartEdit(id))
        .await
        .with_context(|| format!("No record with id {id}"))?;
    if let Some(name) = name {
        session.act(Action::EditName(id, name)).await?;
    }
    if let Some(email) = email {
        session.act(Action::EditEmail(id, email)).await?;
    }
    session.act(Action::CommitEdit(id)).await
}

async fn cmd_remove(session: &mut Session, id: RecordId, yes: bool) -> Result<()> {
    session
        .act(Action::RequestDelete(id))
        .await
        .with_context(|| format!("No record with id {id}"))?;

    if !yes && !confirm()? {
        session.act(Action::CancelDelete).await?;
        println!("Cancelled");
        return Ok(());
    }

    session.act(Action::ConfirmDelete(id)).await
}

/// Ask the irreversible-action question on stdin. Only `y`/`yes` confirms.
fn confirm() -> Result<bool> {
    print!("Are you sure? {CONFIRM_PROMPT} [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_table(roster: &Roster) {
    println!("{}", roster.summary());
    let rows = roster.rows();
    if rows.is_empty() {
        return;
    }

    println!();
    for line in render_rows(&rows) {
        println!("{line}");
    }
}

fn render_rows(rows: &[RowView]) -> Vec<String> {
    let header = ["ID", "Name", "Email", "Registered"];
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.id.to_string(),
                row.name.clone(),
                row.email.clone(),
                row.registered_label(),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cols: [&str; 4]| {
        cols.iter()
            .zip(widths)
            .map(|(col, width)| format!("{col:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(header)];
    lines.extend(cells.iter().map(|row| {
        line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
        ])
    }));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{RowPhase, TransitionError};
    use roster_state::{AuthorityError, RegisteredAt};

    fn row(id: i64, name: &str, email: &str) -> RowView {
        RowView {
            id: RecordId(id),
            name: name.into(),
            email: email.into(),
            registered_at: RegisteredAt::parse("2024-01-01"),
            phase: RowPhase::Viewing,
            controls_enabled: true,
        }
    }

    #[test]
    fn test_cli_parses_edit() {
        let cli = Cli::try_parse_from(["roster", "edit", "3", "--email", "b@x.com"]).unwrap();
        match cli.command {
            Commands::Edit { id, name, email } => {
                assert_eq!(id, 3);
                assert_eq!(name, None);
                assert_eq!(email.as_deref(), Some("b@x.com"));
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_cli_api_url_flag() {
        let cli =
            Cli::try_parse_from(["roster", "--api-url", "http://10.0.0.2:5000", "list"]).unwrap();
        assert_eq!(cli.api_url, "http://10.0.0.2:5000");
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_remove_requires_id() {
        assert!(Cli::try_parse_from(["roster", "remove"]).is_err());
    }

    #[test]
    fn test_refresh_failure_after_change_is_not_fatal() {
        let refresh = ClientError::ConnectionFailure(AuthorityError::Transport("refused".into()));
        assert!(settle(Err(refresh.into())).is_ok());
    }

    #[test]
    fn test_failed_change_is_fatal() {
        let create = ClientError::CreateFailure(AuthorityError::Status {
            status: 500,
            body: "db down".into(),
        });
        assert!(settle(Err(create.into())).is_err());
        assert!(settle(Err(TransitionError::NoPendingDelete.into())).is_err());
        assert!(settle(Ok(())).is_ok());
    }

    #[test]
    fn test_empty_table_renders_header_only() {
        assert_eq!(render_rows(&[]), vec!["ID  Name  Email  Registered"]);
    }

    #[test]
    fn test_rows_are_aligned() {
        let lines = render_rows(&[row(1, "Ana", "a@x.com"), row(12, "Luisa", "luisa@x.com")]);
        assert_eq!(
            lines,
            vec![
                "ID  Name   Email        Registered",
                "1   Ana    a@x.com      January 1, 2024",
                "12  Luisa  luisa@x.com  January 1, 2024",
            ]
        );
    }
}
