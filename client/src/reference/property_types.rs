//! Property type taxonomy.

use derive_more::Display;

/// Group of property types.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Group {
    /// Homes and dwellings.
    Residential,

    /// Business premises.
    Commercial,

    /// Production and storage premises.
    Industrial,

    /// Undeveloped lots.
    Land,
}

impl Group {
    /// All the [`Group`]s, in display order.
    pub const ALL: [Self; 4] =
        [Self::Residential, Self::Commercial, Self::Industrial, Self::Land];

    /// Returns the property types of this [`Group`].
    #[must_use]
    pub const fn types(self) -> &'static [&'static str] {
        match self {
            Self::Residential => &[
                "House",
                "Townhouse",
                "Condominium",
                "Apartment",
                "Villa",
                "Duplex",
                "Bungalow",
            ],
            Self::Commercial => &[
                "Office Space",
                "Retail Space",
                "Restaurant",
                "Hotel",
                "Commercial Building",
            ],
            Self::Industrial => &["Warehouse", "Factory", "Industrial Lot"],
            Self::Land => &[
                "Residential Lot",
                "Commercial Lot",
                "Agricultural Land",
                "Beach Lot",
            ],
        }
    }
}

/// Returns the [`Group`] of the provided property `kind`, matching it
/// case-insensitively.
#[must_use]
pub fn group_of(kind: &str) -> Option<Group> {
    let kind = kind.trim();
    Group::ALL
        .into_iter()
        .find(|g| g.types().iter().any(|t| t.eq_ignore_ascii_case(kind)))
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use super::{group_of, Group};

    #[test]
    fn types_are_unique() {
        let all = Group::ALL
            .iter()
            .flat_map(|g| g.types())
            .map(|t| t.to_lowercase())
            .collect::<Vec<_>>();
        let unique = all.iter().collect::<HashSet<_>>();

        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn finds_group() {
        assert_eq!(group_of("villa"), Some(Group::Residential));
        assert_eq!(group_of(" Warehouse "), Some(Group::Industrial));
        assert_eq!(group_of("Beach Lot"), Some(Group::Land));
        assert_eq!(group_of("Spaceport"), None);
        assert_eq!(Group::Commercial.to_string(), "Commercial");
    }
}
