//! Listing [`Status`] and its transitions.

use derive_more::{Display, Error};

use crate::define_kind;

define_kind! {
    #[doc = "Status of a property listing."]
    #[case = "lowercase"]
    enum Status {
        #[doc = "Listing is being prepared and is not visible publicly."]
        Draft = 1,

        #[doc = "Listing is published and open for offers."]
        Available = 2,

        #[doc = "Listing awaits an approval."]
        Pending = 3,

        #[doc = "Listing has been approved."]
        Approved = 4,

        #[doc = "Listing has been rejected."]
        Rejected = 5,

        #[doc = "Property has been sold."]
        Sold = 6,

        #[doc = "Property has been rented."]
        Rented = 7,
    }
}

impl Status {
    /// Returns the [`Status`]es this one may be changed to.
    #[must_use]
    pub const fn next(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Available, Self::Pending],
            Self::Available => &[Self::Pending, Self::Sold, Self::Rented],
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[Self::Sold, Self::Rented, Self::Available],
            Self::Rejected => &[Self::Draft, Self::Pending],
            Self::Sold | Self::Rented => &[],
        }
    }

    /// Indicates whether no other [`Status`] is reachable from this one.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next().is_empty()
    }

    /// Indicates whether a new listing may be created with this [`Status`].
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::Draft | Self::Available)
    }

    /// Changes this [`Status`] to the `requested` one.
    ///
    /// Requesting the current [`Status`] is a no-op.
    ///
    /// # Errors
    ///
    /// If the `requested` [`Status`] is not reachable from this one.
    pub fn transition(
        self,
        requested: Self,
    ) -> Result<Self, InvalidTransition> {
        if self == requested || self.next().contains(&requested) {
            Ok(requested)
        } else {
            Err(InvalidTransition {
                from: self,
                to: requested,
            })
        }
    }
}

/// Error of an impossible [`Status`] transition.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("cannot change listing status from `{from}` to `{to}`")]
pub struct InvalidTransition {
    /// [`Status`] the transition was requested from.
    pub from: Status,

    /// Requested [`Status`].
    pub to: Status,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{InvalidTransition, Status};

    #[test]
    fn follows_transition_table() {
        assert_eq!(
            Status::Draft.transition(Status::Pending),
            Ok(Status::Pending),
        );
        assert_eq!(
            Status::Pending.transition(Status::Approved),
            Ok(Status::Approved),
        );
        assert_eq!(
            Status::Pending.transition(Status::Rejected),
            Ok(Status::Rejected),
        );
        assert_eq!(
            Status::Approved.transition(Status::Sold),
            Ok(Status::Sold),
        );
        assert_eq!(
            Status::Rejected.transition(Status::Pending),
            Ok(Status::Pending),
        );
    }

    #[test]
    fn rejects_unreachable_status() {
        assert_eq!(
            Status::Draft.transition(Status::Approved),
            Err(InvalidTransition {
                from: Status::Draft,
                to: Status::Approved,
            }),
        );
        assert!(Status::Available.transition(Status::Approved).is_err());
        assert!(Status::Pending.transition(Status::Sold).is_err());
    }

    #[test]
    fn terminal_statuses_are_final() {
        for &terminal in &[Status::Sold, Status::Rented] {
            assert!(terminal.is_terminal());
            for &other in Status::ALL {
                if other != terminal {
                    assert!(terminal.transition(other).is_err());
                }
            }
        }
    }

    #[test]
    fn same_status_is_noop() {
        for &status in Status::ALL {
            assert_eq!(status.transition(status), Ok(status));
        }
    }

    #[test]
    fn only_draft_and_available_are_initial() {
        let initial = Status::ALL
            .iter()
            .copied()
            .filter(|s| s.is_initial())
            .collect::<Vec<_>>();

        assert_eq!(initial, [Status::Draft, Status::Available]);
    }

    #[test]
    fn uses_lowercase_names() {
        assert_eq!(Status::Approved.to_string(), "approved");
        assert_eq!(Status::Rented.as_str(), "rented");
        assert_eq!(Status::from_str("pending"), Ok(Status::Pending));
        assert!(Status::from_str("PENDING").is_err());
    }
}
