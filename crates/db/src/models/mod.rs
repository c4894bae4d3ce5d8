pub mod recipient;
pub mod transfer_event;
