//! Amenities taxonomy.

/// Category of amenities.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Category {
    /// Display name of this [`Category`].
    pub name: &'static str,

    /// Amenities of this [`Category`].
    pub amenities: &'static [&'static str],
}

/// Name of the pseudo-category of amenities outside the taxonomy.
pub const OTHER: &str = "Other";

/// All the amenity [`Category`]s, in display order.
pub const CATEGORIES: [Category; 9] = [
    Category {
        name: "Interior",
        amenities: &[
            "Air Conditioning",
            "Balcony",
            "Built-in Wardrobes",
            "Fireplace",
            "Furnished",
            "Hardwood Floors",
            "Walk-in Closet",
        ],
    },
    Category {
        name: "Kitchen",
        amenities: &[
            "Dishwasher",
            "Kitchen Island",
            "Microwave",
            "Pantry",
            "Refrigerator",
            "Stove",
        ],
    },
    Category {
        name: "Bathroom",
        amenities: &["Bathtub", "Jacuzzi", "Rain Shower", "Water Heater"],
    },
    Category {
        name: "Outdoor",
        amenities: &["Deck", "Garden", "Lanai", "Patio", "Roof Deck", "Yard"],
    },
    Category {
        name: "Recreation",
        amenities: &[
            "Basketball Court",
            "Clubhouse",
            "Gym",
            "Playground",
            "Pool",
            "Tennis Court",
        ],
    },
    Category {
        name: "Security",
        amenities: &[
            "24/7 Security",
            "CCTV",
            "Gated Community",
            "Intercom",
            "Security Guard",
        ],
    },
    Category {
        name: "Parking",
        amenities: &["Carport", "Covered Parking", "Garage", "Guest Parking"],
    },
    Category {
        name: "Utilities",
        amenities: &[
            "Backup Generator",
            "Cable TV",
            "Internet",
            "Laundry Area",
            "Water Tank",
        ],
    },
    Category {
        name: "Accessibility",
        amenities: &["Elevator", "Ramp", "Wheelchair Access"],
    },
];

/// Returns the [`Category`] of the provided `amenity`, matching it
/// case-insensitively.
#[must_use]
pub fn category_of(amenity: &str) -> Option<&'static Category> {
    let amenity = amenity.trim();
    CATEGORIES.iter().find(|c| {
        c.amenities.iter().any(|a| a.eq_ignore_ascii_case(amenity))
    })
}

/// Groups the provided `amenities` by their [`Category`]s.
///
/// Groups follow the display order of [`CATEGORIES`], and amenities keep
/// their order inside a group. Amenities outside the taxonomy are grouped
/// under [`OTHER`], which goes last. Empty groups are omitted.
#[must_use]
pub fn categorize(amenities: &[String]) -> Vec<(&'static str, Vec<String>)> {
    let names = CATEGORIES.iter().map(|c| c.name).chain([OTHER]);
    names
        .map(|name| {
            let members = amenities
                .iter()
                .filter(|a| category_of(a).map_or(OTHER, |c| c.name) == name)
                .cloned()
                .collect::<Vec<_>>();
            (name, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}
