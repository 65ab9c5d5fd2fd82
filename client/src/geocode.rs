//! Reverse geocoding of coordinates into addresses.

use std::time::Duration;

use common::Handler;
use derive_more::{Display, Error};
use reqwest::Url;
use serde::Deserialize;
use smart_default::SmartDefault;

use crate::{mapper::DEFAULT_COUNTRY, reference::cebu};

/// Point on the Earth surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Address resolved out of [`Coordinates`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Address {
    /// Street address, if resolved.
    pub street: Option<String>,

    /// City or municipality.
    pub city: String,

    /// State or province.
    pub state: String,

    /// Zip or postal code.
    pub zip_code: String,

    /// Country.
    pub country: String,

    /// Indicator whether this [`Address`] is approximated by the nearest
    /// municipality rather than resolved by a provider.
    pub approximate: bool,
}

impl Address {
    /// Approximates the [`Address`] of the provided [`Coordinates`] by the
    /// nearest [`cebu::Municipality`].
    #[must_use]
    pub fn nearest(at: Coordinates) -> Self {
        let m = cebu::nearest(at.latitude, at.longitude);
        Self {
            street: None,
            city: m.name.to_owned(),
            state: cebu::PROVINCE.to_owned(),
            zip_code: m.zip.to_owned(),
            country: DEFAULT_COUNTRY.to_owned(),
            approximate: true,
        }
    }
}

/// Error of a reverse geocoding provider.
#[derive(Clone, Debug, Display, Error)]
#[display("geocoding failed: {message}")]
pub struct GeocodeError {
    /// Description of the failure.
    pub message: String,
}

impl GeocodeError {
    /// Creates a new [`GeocodeError`] with the provided description.
    #[must_use]
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// [`Geocoder`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Timeout of a single provider attempt.
    #[default(Duration::from_secs(10))]
    pub timeout: Duration,
}

/// Reverse geocoder trying its providers sequentially.
///
/// Falls back to the nearest known municipality once every provider fails.
#[derive(Clone, Debug)]
pub struct Geocoder<P> {
    /// Providers in the order of preference.
    providers: Vec<P>,

    /// Timeout of a single provider attempt.
    timeout: Duration,
}

impl<P> Geocoder<P>
where
    P: Handler<Coordinates, Ok = Address, Err = GeocodeError>,
{
    /// Creates a new [`Geocoder`] out of the provided providers.
    #[must_use]
    pub fn new(providers: Vec<P>, config: Config) -> Self {
        Self {
            providers,
            timeout: config.timeout,
        }
    }

    /// Resolves the [`Address`] of the provided [`Coordinates`].
    pub async fn reverse(&self, at: Coordinates) -> Address {
        for (n, provider) in self.providers.iter().enumerate() {
            let attempt = provider.execute(at);
            match tokio::time::timeout(self.timeout, attempt).await {
                Ok(Ok(address)) => return address,
                Ok(Err(e)) => {
                    tracing::warn!("geocoding provider #{n} failed: {e}");
                }
                Err(_) => {
                    tracing::warn!(
                        "geocoding provider #{n} timed out after {:?}",
                        self.timeout,
                    );
                }
            }
        }
        Address::nearest(at)
    }
}

/// Reverse geocoding provider speaking the [Nominatim] API.
///
/// [Nominatim]: https://nominatim.org/release-docs/latest/api/Reverse
#[derive(Clone, Debug)]
pub struct Nominatim {
    /// Underlying [`reqwest::Client`].
    client: reqwest::Client,

    /// Root URL of the API.
    base_url: Url,
}

impl Nominatim {
    /// Creates a new [`Nominatim`] provider of the API at the provided
    /// `base_url`, identifying itself with the provided `user_agent`.
    ///
    /// # Errors
    ///
    /// If the underlying [`reqwest::Client`] cannot be built.
    pub fn new(
        base_url: Url,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let client =
            reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client, base_url })
    }
}

/// Response of the [Nominatim] reverse geocoding API.
///
/// [Nominatim]: https://nominatim.org/release-docs/latest/api/Reverse
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReverseResponse {
    /// Error message, if the point cannot be resolved.
    error: Option<String>,

    /// Resolved address components.
    address: AddressComponents,
}

/// Address components of a [`ReverseResponse`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddressComponents {
    /// House number on the road.
    house_number: Option<String>,

    /// Road name.
    road: Option<String>,

    /// City name, for cities.
    city: Option<String>,

    /// Town name, for towns.
    town: Option<String>,

    /// Municipality name, if neither city nor town.
    municipality: Option<String>,

    /// Village name, for rural areas.
    village: Option<String>,

    /// State name.
    state: Option<String>,

    /// Province name, if no state.
    province: Option<String>,

    /// Postal code.
    postcode: Option<String>,

    /// Country name.
    country: Option<String>,
}

impl From<AddressComponents> for Address {
    fn from(c: AddressComponents) -> Self {
        let street = match (c.house_number, c.road) {
            (Some(n), Some(r)) => Some(format!("{n} {r}")),
            (None, Some(r)) => Some(r),
            (Some(_) | None, None) => None,
        };
        Self {
            street,
            city: c
                .city
                .or(c.town)
                .or(c.municipality)
                .or(c.village)
                .unwrap_or_default(),
            state: c.state.or(c.province).unwrap_or_default(),
            zip_code: c.postcode.unwrap_or_default(),
            country: c.country.unwrap_or_default(),
            approximate: false,
        }
    }
}

impl Handler<Coordinates> for Nominatim {
    type Ok = Address;
    type Err = GeocodeError;

    async fn execute(&self, at: Coordinates) -> Result<Self::Ok, Self::Err> {
        let mut url = self.base_url.clone();
        _ = url
            .path_segments_mut()
            .map_err(|()| GeocodeError::new("base URL cannot have a path"))?
            .pop_if_empty()
            .push("reverse");
        _ = url
            .query_pairs_mut()
            .append_pair("format", "jsonv2")
            .append_pair("lat", &at.latitude.to_string())
            .append_pair("lon", &at.longitude.to_string());

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(GeocodeError::new)?
            .json::<ReverseResponse>()
            .await
            .map_err(GeocodeError::new)?;
        if let Some(e) = resp.error {
            return Err(GeocodeError::new(e));
        }

        let address = Address::from(resp.address);
        if address.city.is_empty() {
            return Err(GeocodeError::new("no city in the response"));
        }
        Ok(address)
    }
}

#[cfg(test)]
mod spec {
    use std::{cell::Cell, time::Duration};

    use common::Handler;

    use super::{
        Address, AddressComponents, Config, Coordinates, GeocodeError,
        Geocoder,
    };

    const MACTAN: Coordinates = Coordinates {
        latitude: 10.31,
        longitude: 123.95,
    };

    enum Fake {
        Fails(Cell<usize>),
        Hangs,
        Resolves(&'static str),
    }

    impl Handler<Coordinates> for Fake {
        type Ok = Address;
        type Err = GeocodeError;

        async fn execute(&self, _: Coordinates) -> Result<Address, Self::Err> {
            match self {
                Self::Fails(calls) => {
                    calls.set(calls.get() + 1);
                    Err(GeocodeError::new("rate limited"))
                }
                Self::Hangs => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(GeocodeError::new("unreachable"))
                }
                Self::Resolves(city) => Ok(Address {
                    city: (*city).to_owned(),
                    ..Address::default()
                }),
            }
        }
    }

    fn config() -> Config {
        Config {
            timeout: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn tries_providers_in_order() {
        let geocoder = Geocoder::new(
            vec![
                Fake::Fails(Cell::new(0)),
                Fake::Hangs,
                Fake::Resolves("Lapu-Lapu City"),
                Fake::Resolves("Cordova"),
            ],
            config(),
        );

        let address = geocoder.reverse(MACTAN).await;

        assert_eq!(address.city, "Lapu-Lapu City");
        assert!(!address.approximate);
        let Fake::Fails(calls) = &geocoder.providers[0] else {
            unreachable!();
        };
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn falls_back_to_nearest_municipality() {
        let geocoder = Geocoder::new(
            vec![Fake::Fails(Cell::new(0)), Fake::Hangs],
            config(),
        );

        let address = geocoder.reverse(MACTAN).await;

        assert_eq!(
            address,
            Address {
                street: None,
                city: "Lapu-Lapu City".into(),
                state: "Cebu".into(),
                zip_code: "6015".into(),
                country: "Philippines".into(),
                approximate: true,
            },
        );
    }

    #[test]
    fn picks_address_components() {
        let address = Address::from(AddressComponents {
            house_number: Some("12".into()),
            road: Some("Osmeña Boulevard".into()),
            town: Some("Cebu City".into()),
            province: Some("Cebu".into()),
            postcode: Some("6000".into()),
            country: Some("Philippines".into()),
            ..AddressComponents::default()
        });

        assert_eq!(address.street.as_deref(), Some("12 Osmeña Boulevard"));
        assert_eq!(address.city, "Cebu City");
        assert_eq!(address.state, "Cebu");
        assert_eq!(address.zip_code, "6000");
        assert!(!address.approximate);
    }
}
