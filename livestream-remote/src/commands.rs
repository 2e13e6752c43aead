use chrono::Utc;
use livestream_remote_core::models::{
    BroadcastId, EventChanges, EventId, GameEvent, MediaId, OrganizationId,
};
use livestream_remote_core::service::classify;
use livestream_remote_core::RemoteClient;
use tracing::debug;

use crate::cli::{Commands, EventCommands, EventTarget};
use crate::output::{self, OutputFormat};

pub async fn run(
    client: &RemoteClient,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => {
            let session = client.sign_in(&username, &password).await?;
            output::print_session(&session, format)
        }
        Commands::LoginGoogle { .. } => {
            let session = client.federated_sign_in().await?;
            output::print_session(&session, format)
        }
        Commands::Logout => {
            client.sign_out().await?;
            output::print_success("Signed out", format)
        }
        Commands::Whoami => {
            let session = client.restore().await?;
            output::print_session(&session, format)
        }
        Commands::Orgs => {
            let organizations = client.organizations().list().await?;
            output::print_organizations(&organizations, format)
        }
        Commands::Events { org, from, to } => {
            let org = OrganizationId::new(org);
            let classified = match (from, to) {
                (Some(from), Some(to)) => {
                    let events = client.events().list_events(&org, from, to).await?;
                    classify(&events, Utc::now())
                }
                _ => client.classified_events(&org).await?,
            };
            output::print_classified(&classified, format)
        }
        Commands::Event { command } => run_event(client, command, format).await,
        Commands::Broadcast { action, target } => {
            let org = OrganizationId::new(&target.org);
            let event = load_event(client, &target).await?;
            let event = client
                .game_events()
                .control_and_reload(&org, &event, action)
                .await?;
            output::print_event(&event, format)
        }
        Commands::Commentary {
            state,
            org,
            broadcast,
        } => {
            let broadcast = client
                .game_events()
                .set_commentary(
                    &OrganizationId::new(org),
                    &BroadcastId::new(broadcast),
                    state.is_on(),
                )
                .await?;
            let on = broadcast.is_commentary_on.unwrap_or(state.is_on());
            output::print_success(
                &format!("Commentary {}", if on { "on" } else { "off" }),
                format,
            )
        }
        Commands::SwitchMedia {
            org,
            broadcast,
            media,
        } => {
            client
                .game_events()
                .switch_media(
                    &OrganizationId::new(org),
                    &BroadcastId::new(broadcast),
                    &MediaId::new(media),
                )
                .await?;
            output::print_success("Media switch requested", format)
        }
        Commands::Recording { org, event } => {
            let recording = client
                .game_events()
                .recording(&OrganizationId::new(org), &EventId::new(event))
                .await?;
            output::print_recording(recording.as_ref(), format)
        }
    }
}

async fn run_event(
    client: &RemoteClient,
    command: EventCommands,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        EventCommands::Show { target } => {
            let event = load_event(client, &target).await?;
            output::print_event(&event, format)
        }
        EventCommands::Edit {
            target,
            start,
            end,
            home,
            away,
            competition,
            notes,
            stream_key,
            commentary,
        } => {
            let changes = EventChanges {
                start_date_time: start,
                end_date_time: end,
                youtube_stream_key: stream_key,
                home_team_name: home,
                away_team_name: away,
                competition_name: competition,
                notes,
                is_commentary_on: commentary.map(|c| c.is_on()),
            };
            if changes.is_empty() {
                anyhow::bail!("nothing to change");
            }
            let event = load_event(client, &target).await?;
            let updated = client
                .game_events()
                .update(&OrganizationId::new(&target.org), &event, changes)
                .await?;
            output::print_event(&updated, format)
        }
    }
}

async fn load_event(client: &RemoteClient, target: &EventTarget) -> anyhow::Result<GameEvent> {
    debug!(org = %target.org, event = %target.event, "Loading event");
    Ok(client
        .game_events()
        .get(
            &OrganizationId::new(&target.org),
            &EventId::new(&target.event),
            &target.kind,
        )
        .await?)
}
