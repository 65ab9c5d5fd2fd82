//! Listing status taxonomy.

use common::Status;

/// Presentation details of a [`Status`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusInfo {
    /// Described [`Status`].
    pub status: Status,

    /// Display label.
    pub label: &'static str,

    /// Human-readable description.
    pub description: &'static str,

    /// Badge color, as a hex RGB code.
    pub color: &'static str,
}

/// Returns the [`StatusInfo`] of the provided [`Status`].
#[must_use]
pub const fn info(status: Status) -> StatusInfo {
    let (label, description, color) = match status {
        Status::Draft => (
            "Draft",
            "Listing is being prepared and is not visible publicly",
            "#9e9e9e",
        ),
        Status::Available => {
            ("Available", "Listing is open for offers", "#2e7d32")
        }
        Status::Pending => {
            ("Pending", "Listing awaits an administrator review", "#f9a825")
        }
        Status::Approved => {
            ("Approved", "Listing has passed the review", "#1565c0")
        }
        Status::Rejected => {
            ("Rejected", "Listing has been sent back for changes", "#c62828")
        }
        Status::Sold => ("Sold", "Property has been sold", "#6a1b9a"),
        Status::Rented => ("Rented", "Property has been rented", "#00838f"),
    };
    StatusInfo {
        status,
        label,
        description,
        color,
    }
}

/// Returns the [`StatusInfo`] of every [`Status`].
pub fn all() -> impl Iterator<Item = StatusInfo> {
    Status::ALL.iter().copied().map(info)
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use common::Status;

    use super::{all, info};

    #[test]
    fn describes_every_status() {
        let infos = all().collect::<Vec<_>>();

        assert_eq!(infos.len(), 7);
        for i in &infos {
            assert_eq!(i.label.to_lowercase(), i.status.to_string());
        }
        let colors = infos.iter().map(|i| i.color).collect::<HashSet<_>>();
        assert_eq!(colors.len(), 7);
    }

    #[test]
    fn labels_status() {
        assert_eq!(info(Status::Pending).label, "Pending");
        assert_eq!(info(Status::Rented).status, Status::Rented);
    }
}
