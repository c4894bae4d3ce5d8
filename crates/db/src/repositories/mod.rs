pub mod recipient_repo;
pub mod transfer_event_repo;

pub use recipient_repo::RecipientRepo;
pub use transfer_event_repo::TransferEventRepo;
