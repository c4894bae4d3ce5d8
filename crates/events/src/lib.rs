//! Depot push fan-out engine.
//!
//! - [`EventBus`]: in-process publish/subscribe hub for [`TransferEvent`]s.
//! - [`EventFeed`]: bridges the database change feed onto the bus.
//! - [`PushFanout`]: turns each event into one dispatch run (audience →
//!   endpoints → batches → delivery → dead-token cleanup).
//! - [`directory`]: the recipient directory port and its PostgreSQL adapter.
//! - [`delivery`]: the push transport port and the FCM HTTP v1 adapter.

pub mod bus;
pub mod delivery;
pub mod directory;
pub mod fanout;
pub mod feed;

pub use bus::{EventBus, TransferEvent};
pub use delivery::fcm::{FcmConfig, FcmConfigError, FcmTransport};
pub use delivery::{PushTransport, TransportError};
pub use directory::{DirectoryError, PgRecipientDirectory, RecipientDirectory};
pub use fanout::{DispatchReport, FanoutError, PushFanout};
pub use feed::EventFeed;
