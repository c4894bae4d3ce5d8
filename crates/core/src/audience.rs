//! Audience policy: which roles hear about an event, and what they are told.

use crate::event_kind::EventKind;
use crate::roles::Role;

/// Title used when the event kind is not recognised.
pub const DEFAULT_TITLE: &str = "Update";

/// Body used when the event kind is not recognised.
pub const DEFAULT_BODY: &str = "New event";

/// Roles and message text for one event. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    /// Recipient roles, without duplicates, in policy order.
    pub roles: Vec<Role>,
    pub title: String,
    pub body: String,
}

/// Roles eligible to receive a notification for `kind`.
///
/// Unrecognised kinds go to every role.
pub fn audience_roles(kind: &EventKind) -> Vec<Role> {
    match kind {
        EventKind::TransferCreated => vec![Role::Loader],
        EventKind::TransferPicked | EventKind::TransferChecking => vec![Role::Storekeeper],
        EventKind::TransferDone => vec![Role::Admin, Role::Storekeeper, Role::Loader],
        EventKind::BarcodeBound => vec![Role::Storekeeper, Role::Admin],
        EventKind::Other(_) => Role::ALL.to_vec(),
    }
}

/// Fixed title and body for `kind`, interpolating the transfer id where the
/// message refers to one.
pub fn notification_text(kind: &EventKind, subject_id: &str) -> (String, String) {
    let (title, body) = match kind {
        EventKind::TransferCreated => (
            "New transfer",
            format!("Transfer {subject_id} ready to pick"),
        ),
        EventKind::TransferPicked => ("Transfer picked", format!("Transfer {subject_id} picked")),
        EventKind::TransferChecking => {
            ("Checking started", format!("Transfer {subject_id} checking"))
        }
        EventKind::TransferDone => ("Transfer done", format!("Transfer {subject_id} finished")),
        EventKind::BarcodeBound => ("Barcode bound", "Barcode bound to product".to_string()),
        EventKind::Other(_) => (DEFAULT_TITLE, DEFAULT_BODY.to_string()),
    };
    (title.to_string(), body)
}

/// Resolve the full audience for an event. Total and side-effect free.
pub fn resolve_audience(kind: &EventKind, subject_id: &str) -> Audience {
    let (title, body) = notification_text(kind, subject_id);
    Audience {
        roles: audience_roles(kind),
        title,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_created_goes_to_loaders() {
        let audience = resolve_audience(&EventKind::TransferCreated, "T1");
        assert_eq!(audience.roles, vec![Role::Loader]);
        assert_eq!(audience.title, "New transfer");
        assert_eq!(audience.body, "Transfer T1 ready to pick");
    }

    #[test]
    fn picked_and_checking_go_to_storekeepers() {
        let picked = resolve_audience(&EventKind::TransferPicked, "T7");
        assert_eq!(picked.roles, vec![Role::Storekeeper]);
        assert_eq!(picked.body, "Transfer T7 picked");

        let checking = resolve_audience(&EventKind::TransferChecking, "T7");
        assert_eq!(checking.roles, vec![Role::Storekeeper]);
        assert_eq!(checking.title, "Checking started");
        assert_eq!(checking.body, "Transfer T7 checking");
    }

    #[test]
    fn transfer_done_goes_to_all_staff() {
        let audience = resolve_audience(&EventKind::TransferDone, "T2");
        assert_eq!(audience.roles, Role::ALL.to_vec());
        assert_eq!(audience.body, "Transfer T2 finished");
    }

    #[test]
    fn barcode_bound_ignores_subject() {
        let audience = resolve_audience(&EventKind::BarcodeBound, "T3");
        assert_eq!(audience.roles, vec![Role::Storekeeper, Role::Admin]);
        assert_eq!(audience.title, "Barcode bound");
        assert_eq!(audience.body, "Barcode bound to product");
    }

    #[test]
    fn unknown_kinds_get_the_default_broad_audience() {
        let kinds = [
            EventKind::parse(None),
            EventKind::parse(Some("")),
            EventKind::parse(Some("pallet_moved")),
            EventKind::parse(Some("TRANSFER_DONE")),
        ];
        for kind in kinds {
            let audience = resolve_audience(&kind, "T9");
            assert_eq!(audience.roles, Role::ALL.to_vec(), "{kind:?}");
            assert_eq!(audience.title, DEFAULT_TITLE);
            assert_eq!(audience.body, DEFAULT_BODY);
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve_audience(&EventKind::TransferPicked, "T5");
        let b = resolve_audience(&EventKind::TransferPicked, "T5");
        assert_eq!(a, b);
    }
}
