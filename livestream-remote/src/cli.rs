use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use livestream_remote_core::service::BroadcastAction;

use crate::output::OutputFormat;

/// Remote control for live-streamed game events.
#[derive(Parser, Debug)]
#[command(name = "livestream-remote")]
#[command(about = "Manage organizations, game events and their broadcasts", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, env = "LSREMOTE_CONFIG", global = true)]
    pub config: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "LSREMOTE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with a Google ID token obtained elsewhere
    LoginGoogle {
        #[arg(long, env = "LSREMOTE_ID_TOKEN", hide_env_values = true)]
        id_token: String,
    },

    /// Sign out and forget the stored tokens
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List organizations with livestream access
    Orgs,

    /// List events grouped into live, upcoming and past
    Events {
        /// Organization ID
        #[arg(short, long)]
        org: String,
        /// Window start (RFC 3339); defaults to the configured window
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,
        /// Window end (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,
    },

    /// Inspect or edit one event
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Start, pause, resume or stop an event's broadcast
    Broadcast {
        /// start, pause, resume or stop
        action: BroadcastAction,
        #[command(flatten)]
        target: EventTarget,
    },

    /// Turn commentary on or off
    Commentary {
        state: Toggle,
        #[arg(short, long)]
        org: String,
        /// Broadcast ID
        #[arg(short, long)]
        broadcast: String,
    },

    /// Switch a running broadcast to a commercial media file
    SwitchMedia {
        #[arg(short, long)]
        org: String,
        #[arg(short, long)]
        broadcast: String,
        /// Media ID
        #[arg(short, long)]
        media: String,
    },

    /// Show the recording of an event, if available
    Recording {
        #[arg(short, long)]
        org: String,
        /// Event ID
        #[arg(short, long)]
        event: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct EventTarget {
    /// Organization ID
    #[arg(short, long)]
    pub org: String,
    /// Event ID
    #[arg(short, long)]
    pub event: String,
    /// Event type code
    #[arg(short, long, default_value = "game")]
    pub kind: String,
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// Show event details
    Show {
        #[command(flatten)]
        target: EventTarget,
    },

    /// Edit event fields; unspecified fields keep their value
    Edit {
        #[command(flatten)]
        target: EventTarget,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        home: Option<String>,
        #[arg(long)]
        away: Option<String>,
        #[arg(long)]
        competition: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        stream_key: Option<String>,
        #[arg(long)]
        commentary: Option<Toggle>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}
