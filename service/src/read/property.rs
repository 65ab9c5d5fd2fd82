//! [`Property`] read model definitions.
//!
//! [`Property`]: crate::domain::Property

pub mod list {
    //! [`Property`] list definitions.

    use std::str::FromStr;

    use derive_more::{AsRef, Display};

    use crate::domain::{agent, property};
    #[cfg(doc)]
    use crate::domain::Property;

    /// Selector of a [`Property`] list.
    ///
    /// Lists are always ordered from the most recently created [`Property`].
    #[derive(Clone, Debug, Default)]
    pub enum Selector {
        /// All the [`Property`] listings.
        #[default]
        All,

        /// [`Property`] listings in the provided [`property::Status`].
        Status(property::Status),

        /// [`Property`] listings of the provided owner.
        Owner(property::OwnerId),

        /// [`Property`] listings handled by the provided [`Agent`].
        ///
        /// [`Agent`]: crate::domain::Agent
        Agent(agent::Id),

        /// [`Property`] listings fuzzy matching the provided [`SearchTerm`].
        Search(SearchTerm),

        /// [`Property`] listings matching all the provided [`Criteria`].
        Criteria(Criteria),
    }

    impl Selector {
        /// Converts this [`Selector`] into the equivalent [`Criteria`].
        #[must_use]
        pub fn into_criteria(self) -> Criteria {
            match self {
                Self::All => Criteria::default(),
                Self::Status(status) => Criteria {
                    status: Some(status),
                    ..Criteria::default()
                },
                Self::Owner(id) => Criteria {
                    owner_id: Some(id),
                    ..Criteria::default()
                },
                Self::Agent(id) => Criteria {
                    agent_id: Some(id),
                    ..Criteria::default()
                },
                Self::Search(term) => Criteria {
                    term: Some(term),
                    ..Criteria::default()
                },
                Self::Criteria(criteria) => criteria,
            }
        }
    }

    /// Criteria of an advanced [`Property`] search.
    ///
    /// Absent criteria are not applied.
    #[derive(Clone, Debug, Default)]
    pub struct Criteria {
        /// [`SearchTerm`] to fuzzy match title, description and location.
        pub term: Option<SearchTerm>,

        /// Exact [`property::Status`].
        pub status: Option<property::Status>,

        /// Exact [`property::Kind`], compared case-insensitively.
        pub kind: Option<property::Kind>,

        /// Exact [`property::City`], compared case-insensitively.
        pub city: Option<property::City>,

        /// Lowest acceptable [`property::Price`].
        pub min_price: Option<property::Price>,

        /// Highest acceptable [`property::Price`].
        pub max_price: Option<property::Price>,

        /// Lowest acceptable number of bedrooms.
        pub min_bedrooms: Option<u16>,

        /// Lowest acceptable number of [`property::Bathrooms`].
        pub min_bathrooms: Option<property::Bathrooms>,

        /// ID of the handling [`Agent`].
        ///
        /// [`Agent`]: crate::domain::Agent
        pub agent_id: Option<agent::Id>,

        /// ID of the owner.
        pub owner_id: Option<property::OwnerId>,
    }

    /// Free-text term to search [`Property`] listings with.
    #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
    #[as_ref(forward)]
    pub struct SearchTerm(String);

    impl SearchTerm {
        /// Creates a new [`SearchTerm`] out of the provided `term`.
        ///
        /// [`None`] is returned if the `term` is blank.
        #[must_use]
        pub fn new(term: impl AsRef<str>) -> Option<Self> {
            let term = term.as_ref().trim();
            (!term.is_empty() && term.len() <= 256)
                .then(|| Self(term.to_owned()))
        }
    }

    impl FromStr for SearchTerm {
        type Err = &'static str;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::new(s).ok_or("invalid `SearchTerm`")
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Status;

    use super::list::{SearchTerm, Selector};

    #[test]
    fn trims_search_term() {
        assert_eq!(
            SearchTerm::new("  sea view ").map(|t| t.to_string()),
            Some("sea view".to_owned()),
        );
        assert!(SearchTerm::new("   ").is_none());
    }

    #[test]
    fn converts_selector_into_criteria() {
        let c = Selector::Status(Status::Pending).into_criteria();
        assert_eq!(c.status, Some(Status::Pending));
        assert!(c.term.is_none());
        assert!(c.owner_id.is_none());

        let c = Selector::All.into_criteria();
        assert!(c.status.is_none());
    }
}
