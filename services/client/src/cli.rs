//! Command line surface of the `edu-sync` binary

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use common::access::RoleState;
use common::models::{ApprovalTerms, Rejection, Role, Session};

use crate::routes::{RouteOutcome, resolve};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "edu-sync",
    about = "Browse and moderate Edu Sync study sessions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sessions open to the public
    Sessions,
    /// Show one session with recommendations
    Session { id: String },
    /// List tutors
    Tutors,
    /// Print the public statistics
    Stats,
    /// Show what the router does with PATH (signed out unless --role is given)
    Route {
        path: String,
        #[arg(long, value_name = "ROLE")]
        role: Option<Role>,
    },
    /// List the signed-in tutor's sessions
    MySessions,
    /// Approve a pending session; free unless --fee is given
    Approve {
        id: String,
        #[arg(long, value_name = "AMOUNT")]
        fee: Option<f64>,
    },
    /// Reject a pending session
    Reject {
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long, default_value = "")]
        feedback: String,
    },
    /// Send a rejected session back to moderation
    Resubmit { id: String },
    /// Delete a session
    DeleteSession { id: String },
    /// List the signed-in student's notes
    Notes,
    /// List the signed-in tutor's materials (all of them for admins)
    Materials,
    /// Page through registered students (admins only)
    Students {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

impl Command {
    /// Whether the command acts as the signed-in user
    pub fn needs_identity(&self) -> bool {
        !matches!(
            self,
            Command::Sessions
                | Command::Session { .. }
                | Command::Tutors
                | Command::Stats
                | Command::Route { .. }
        )
    }
}

fn print_session(session: &Session) {
    let status = session.registration_status(Utc::now());
    println!(
        "{}  {:<40}  {:<8}  {:<7}  fee {:.2}  by {}",
        session.id,
        session.title,
        session.status.as_str(),
        status.to_string(),
        session.registration_fee,
        session.tutor_email
    );
}

/// Describe a routing outcome in one line
pub fn describe_route(outcome: &RouteOutcome) -> String {
    match outcome {
        RouteOutcome::Loading => "loading".to_string(),
        RouteOutcome::Redirect { to, from } => format!("redirect to {to} (from {from})"),
        RouteOutcome::Render(matched) => {
            let mut params: Vec<_> = matched.params.iter().collect();
            params.sort();
            if params.is_empty() {
                format!("render {:?}", matched.page)
            } else {
                let params: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("render {:?} [{}]", matched.page, params.join(", "))
            }
        }
    }
}

/// Run `command` against the backend
pub async fn run(command: Command, state: &AppState) -> Result<()> {
    match command {
        Command::Sessions => {
            for session in state.sessions.available().await? {
                print_session(&session);
            }
        }
        Command::Session { id } => {
            let session = state.sessions.details(&id).await?;
            print_session(&session);
            if !session.description.is_empty() {
                println!("\n{}\n", session.description);
            }
            if let Some(duration) = session.parsed_duration() {
                println!("Duration: {duration}");
            }
            let recommended = state.sessions.recommended(&id).await?;
            if !recommended.is_empty() {
                println!("\nYou may also like:");
                for session in &recommended {
                    print_session(session);
                }
            }
        }
        Command::Tutors => {
            for tutor in state.users.tutors().await? {
                println!(
                    "{:<30}  {:<30}  {}",
                    tutor.display_name(),
                    tutor.email,
                    tutor.specialty.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Stats => {
            let stats = state.public_statistics().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Route { path, role } => {
            let role_state = role.map(RoleState::Resolved).unwrap_or(RoleState::SignedOut);
            println!("{}", describe_route(&resolve(&path, role_state)));
        }
        Command::MySessions => {
            let actor = state.actor().await?;
            for session in state.sessions.by_tutor(&actor.email).await? {
                print_session(&session);
            }
        }
        Command::Approve { id, fee } => {
            let actor = state.actor().await?;
            let session = state.sessions.details(&id).await?;
            let terms = fee.map(ApprovalTerms::paid).unwrap_or_else(ApprovalTerms::free);
            let transition = state.sessions.approve(&session, &actor, terms).await?;
            println!("{} is now approved ({} before)", id, transition.from);
        }
        Command::Reject {
            id,
            reason,
            feedback,
        } => {
            let actor = state.actor().await?;
            let session = state.sessions.details(&id).await?;
            state
                .sessions
                .reject(&session, &actor, Rejection::new(reason, feedback))
                .await?;
            println!("{id} is now rejected");
        }
        Command::Resubmit { id } => {
            let actor = state.actor().await?;
            let session = state.sessions.details(&id).await?;
            state.sessions.resubmit(&session, &actor).await?;
            println!("{id} is pending again");
        }
        Command::DeleteSession { id } => {
            let actor = state.actor().await?;
            let session = state.sessions.details(&id).await?;
            state.sessions.delete(&session, &actor).await?;
            println!("{id} deleted");
        }
        Command::Notes => {
            let actor = state.actor().await?;
            for note in state.notes.list(&actor.email).await? {
                println!("{}  {}\n    {}", note.id, note.title, note.description);
            }
        }
        Command::Materials => {
            let actor = state.actor().await?;
            let materials = if actor.role == Role::Admin {
                state.materials.all().await
            } else {
                state.materials.by_tutor(&actor.email).await
            }?;
            for material in materials {
                println!(
                    "{}  {:<30}  {}  (session {})",
                    material.id, material.title, material.resource_link, material.session_id
                );
            }
        }
        Command::Students { page } => {
            let listing = state.students_page(page).await?;
            for student in &listing.students {
                println!("{:<30}  {}", student.display_name(), student.email);
            }
            println!(
                "page {} of {} ({} students)",
                page.max(1),
                listing.total_pages,
                listing.total_items
            );
        }
    }
    Ok(())
}
