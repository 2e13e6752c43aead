//! Backend services built on the authorized gateway

pub mod events;
pub mod game_event;
pub mod organizations;

pub use events::{classify, merge_running_state, ClassifiedEvents, EventAggregator, EventBucket};
pub use game_event::{BroadcastAction, GameEventService};
pub use organizations::OrganizationService;
