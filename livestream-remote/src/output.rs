//! Output formatting for the CLI.

use clap::ValueEnum;
use livestream_remote_core::models::{GameEvent, Organization, Recording, Session};
use livestream_remote_core::service::ClassifiedEvents;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Print `value` as pretty JSON, or run `text` for the human format.
    pub fn emit<T: Serialize>(self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        match self {
            Self::Text => text(),
            Self::Json => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }
}

pub fn print_success(message: &str, format: OutputFormat) -> anyhow::Result<()> {
    format.emit(
        &serde_json::json!({"status": "success", "message": message}),
        || println!("{message}"),
    )
}

pub fn print_error(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {message}"),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({"status": "error", "message": message})
        ),
    }
}

fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{label}:"), value);
}

fn print_heading(text: &str) {
    println!("\n{text}");
    println!("{}", "-".repeat(50));
}

pub fn print_session(session: &Session, format: OutputFormat) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "authenticated": session.is_authenticated,
        "user": session.current_user,
    });
    format.emit(&value, || {
        if !session.is_authenticated {
            println!("Not signed in");
            return;
        }
        match &session.current_user {
            Some(user) => {
                println!("Signed in as {}", user.display_name());
                if let Some(email) = &user.email {
                    print_row("Email", email);
                }
                print_row("User ID", &user.id);
            }
            None => println!("Signed in"),
        }
    })
}

pub fn print_organizations(
    organizations: &[Organization],
    format: OutputFormat,
) -> anyhow::Result<()> {
    format.emit(&organizations, || {
        if organizations.is_empty() {
            println!("No organizations with livestream access");
            return;
        }
        for org in organizations {
            println!("{:<28} {}", org.id, org.name.as_deref().unwrap_or("-"));
        }
    })
}

fn event_line(event: &GameEvent) -> String {
    let state = event
        .broadcast_state()
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "{}  {:<10} {:<24} {}",
        event.start_date_time.format("%Y-%m-%d %H:%M"),
        state,
        event.id,
        event.title()
    )
}

pub fn print_classified(events: &ClassifiedEvents, format: OutputFormat) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "live": events.live,
        "upcoming": events.upcoming,
        "past": events.past,
    });
    format.emit(&value, || {
        for (heading, bucket) in [
            ("LIVE", &events.live),
            ("UPCOMING", &events.upcoming),
            ("PAST", &events.past),
        ] {
            print_heading(&format!("{heading} ({})", bucket.len()));
            for event in bucket {
                println!("{}", event_line(event));
            }
        }
    })
}

pub fn print_event(event: &GameEvent, format: OutputFormat) -> anyhow::Result<()> {
    format.emit(event, || {
        print_heading(&event.title());
        print_row("ID", event.id.as_str());
        print_row("Type", &event.kind.code);
        print_row("Start", &event.start_date_time.to_rfc3339());
        print_row("End", &event.end_date_time.to_rfc3339());
        if let Some(competition) = &event.competition_name {
            print_row("Competition", competition);
        }
        if let Some(notes) = &event.notes {
            print_row("Notes", notes);
        }
        match &event.broadcast {
            Some(broadcast) => {
                print_row("Broadcast", broadcast.id.as_str());
                print_row("State", broadcast.state.as_str());
                if let Some(on) = broadcast.is_commentary_on {
                    print_row("Commentary", if on { "on" } else { "off" });
                }
            }
            None => print_row("Broadcast", "-"),
        }
        for media in &event.media {
            print_row(
                "Media",
                &format!("{} {}", media.id, media.file_name.as_deref().unwrap_or("")),
            );
        }
    })
}

pub fn print_recording(recording: Option<&Recording>, format: OutputFormat) -> anyhow::Result<()> {
    format.emit(&recording, || match recording {
        Some(recording) => {
            print_row("Status", recording.status.as_deref().unwrap_or("-"));
            print_row("URL", recording.url.as_deref().unwrap_or("-"));
        }
        None => println!("Recording not available yet"),
    })
}
