//! Gazetteer of the municipalities of the province of Cebu.

/// Name of the province.
pub const PROVINCE: &str = "Cebu";

/// Mean radius of the Earth in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Municipality or component city of the province.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Municipality {
    /// Name of this [`Municipality`].
    pub name: &'static str,

    /// Zip code of this [`Municipality`].
    pub zip: &'static str,

    /// Latitude of the town center in decimal degrees.
    pub latitude: f64,

    /// Longitude of the town center in decimal degrees.
    pub longitude: f64,
}

impl Municipality {
    /// Returns the great-circle distance in kilometers between the center of
    /// this [`Municipality`] and the provided point.
    #[must_use]
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Shortcut for declaring a [`Municipality`].
const fn m(
    name: &'static str,
    zip: &'static str,
    latitude: f64,
    longitude: f64,
) -> Municipality {
    Municipality {
        name,
        zip,
        latitude,
        longitude,
    }
}

/// All the known [`Municipality`]s.
pub const MUNICIPALITIES: &[Municipality] = &[
    m("Cebu City", "6000", 10.3157, 123.8854),
    m("Consolacion", "6001", 10.3766, 123.9573),
    m("Liloan", "6002", 10.3991, 123.9994),
    m("Compostela", "6003", 10.4542, 124.0106),
    m("Danao City", "6004", 10.5205, 124.0272),
    m("Carmen", "6005", 10.5850, 124.0228),
    m("Catmon", "6006", 10.7167, 124.0167),
    m("Sogod", "6007", 10.7500, 124.0000),
    m("Borbon", "6008", 10.8333, 124.0333),
    m("Tabogon", "6009", 10.9333, 124.0333),
    m("Bogo City", "6010", 11.0517, 124.0053),
    m("San Remigio", "6011", 11.0833, 123.9333),
    m("Medellin", "6012", 11.1289, 123.9619),
    m("Daanbantayan", "6013", 11.2500, 124.0000),
    m("Mandaue City", "6014", 10.3236, 123.9223),
    m("Lapu-Lapu City", "6015", 10.3103, 123.9494),
    m("Cordova", "6017", 10.2525, 123.9494),
    m("San Fernando", "6018", 10.1614, 123.7083),
    m("Carcar City", "6019", 10.1064, 123.6403),
    m("Sibonga", "6020", 10.0333, 123.6167),
    m("Argao", "6021", 9.8803, 123.6075),
    m("Dalaguete", "6022", 9.7611, 123.5353),
    m("Alcoy", "6023", 9.7081, 123.5064),
    m("Boljoon", "6024", 9.6333, 123.4833),
    m("Oslob", "6025", 9.4628, 123.3800),
    m("Santander", "6026", 9.4167, 123.3333),
    m("Samboan", "6027", 9.5292, 123.3067),
    m("Ginatilan", "6028", 9.5708, 123.3114),
    m("Malabuyoc", "6029", 9.6500, 123.3333),
    m("Alegria", "6030", 9.7667, 123.3500),
    m("Badian", "6031", 9.8667, 123.4000),
    m("Moalboal", "6032", 9.9500, 123.4000),
    m("Alcantara", "6033", 10.0667, 123.4000),
    m("Ronda", "6034", 10.0000, 123.4167),
    m("Dumanjug", "6035", 10.0500, 123.4333),
    m("Barili", "6036", 10.1167, 123.5333),
    m("Naga City", "6037", 10.2092, 123.7583),
    m("Toledo City", "6038", 10.3778, 123.6386),
    m("Pinamungajan", "6039", 10.2700, 123.5833),
    m("Aloguinsan", "6040", 10.2167, 123.5500),
    m("Balamban", "6041", 10.5000, 123.7167),
    m("Asturias", "6042", 10.5667, 123.7167),
    m("Tuburan", "6043", 10.7333, 123.8333),
    m("Tabuelan", "6044", 10.8167, 123.8667),
    m("Talisay City", "6045", 10.2447, 123.8494),
    m("Minglanilla", "6046", 10.2450, 123.7961),
    m("Santa Fe", "6047", 11.1500, 123.8000),
    m("Pilar", "6048", 10.8167, 124.4167),
    m("Poro", "6049", 10.6333, 124.4000),
    m("San Francisco", "6050", 10.6500, 124.3500),
    m("Tudela", "6051", 10.6333, 124.4667),
    m("Bantayan", "6052", 11.1667, 123.7167),
    m("Madridejos", "6053", 11.2667, 123.7333),
];

/// Looks up the [`Municipality`] by its name, case-insensitively.
///
/// The `City` suffix of component cities may be omitted.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Municipality> {
    let name = name.trim();
    MUNICIPALITIES.iter().find(|m| {
        m.name.eq_ignore_ascii_case(name)
            || m.name
                .strip_suffix(" City")
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
    })
}

/// Looks up the [`Municipality`] by its zip code.
#[must_use]
pub fn by_zip(zip: &str) -> Option<&'static Municipality> {
    let zip = zip.trim();
    MUNICIPALITIES.iter().find(|m| m.zip == zip)
}

/// Returns the [`Municipality`] whose center is the nearest to the provided
/// point.
#[must_use]
pub fn nearest(latitude: f64, longitude: f64) -> &'static Municipality {
    MUNICIPALITIES
        .iter()
        .min_by(|a, b| {
            a.distance_km(latitude, longitude)
                .total_cmp(&b.distance_km(latitude, longitude))
        })
        .expect("gazetteer is not empty")
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use super::{by_name, by_zip, nearest, MUNICIPALITIES};

    #[test]
    fn zips_and_names_are_unique() {
        let zips =
            MUNICIPALITIES.iter().map(|m| m.zip).collect::<HashSet<_>>();
        let names =
            MUNICIPALITIES.iter().map(|m| m.name).collect::<HashSet<_>>();

        assert_eq!(zips.len(), MUNICIPALITIES.len());
        assert_eq!(names.len(), MUNICIPALITIES.len());
    }

    #[test]
    fn looks_up_by_name_and_zip() {
        assert_eq!(by_name("cebu city").unwrap().zip, "6000");
        assert_eq!(by_name("Mandaue").unwrap().zip, "6014");
        assert_eq!(by_name(" MOALBOAL ").unwrap().zip, "6032");
        assert_eq!(by_name("Manila"), None);

        assert_eq!(by_zip("6015").unwrap().name, "Lapu-Lapu City");
        assert_eq!(by_zip("1000"), None);
    }

    #[test]
    fn finds_nearest() {
        assert_eq!(nearest(10.3157, 123.8854).name, "Cebu City");
        assert_eq!(nearest(10.31, 123.95).name, "Lapu-Lapu City");
        assert_eq!(nearest(11.20, 123.72).name, "Bantayan");
    }

    #[test]
    fn measures_distance() {
        let cebu = by_name("Cebu City").unwrap();
        let mandaue = by_name("Mandaue City").unwrap();

        let d = cebu.distance_km(mandaue.latitude, mandaue.longitude);

        assert!((3.0..6.0).contains(&d), "{d}");
        assert!(cebu.distance_km(cebu.latitude, cebu.longitude) < 1e-9);
    }
}
