//! [`Property`] definitions.

pub mod media;

#[cfg(doc)]
use common::DateTime;
use common::{unit, Area, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::agent;

pub use common::{status::InvalidTransition, Status};

pub use self::media::{Image, Video};

/// Property listed on the platform.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Property`].
    pub number: Number,

    /// [`Title`] of this [`Property`] listing.
    pub title: Title,

    /// [`Description`] of this [`Property`] listing.
    pub description: Description,

    /// [`Kind`] of this [`Property`].
    pub kind: Kind,

    /// Current [`Status`] of this [`Property`] listing.
    pub status: Status,

    /// [`RejectionReason`] of this [`Property`] listing, if it's rejected.
    pub rejection_reason: Option<RejectionReason>,

    /// Asking [`Price`] of this [`Property`].
    pub price: Price,

    /// [`DateTime`] when this [`Property`] was listed.
    pub listed_at: ListingDateTime,

    /// [`Location`] of this [`Property`].
    pub location: Location,

    /// Physical [`Layout`] of this [`Property`].
    pub layout: Layout,

    /// [`Amenities`] of this [`Property`].
    pub amenities: Amenities,

    /// ID of the [`Agent`] handling this [`Property`], if any.
    ///
    /// [`Agent`]: crate::domain::Agent
    pub agent_id: Option<agent::Id>,

    /// ID of the owner of this [`Property`], if known.
    pub owner_id: Option<OwnerId>,

    /// [`Image`]s of this [`Property`].
    pub images: Vec<Image>,

    /// [`Video`]s of this [`Property`].
    pub videos: Vec<Video>,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Property`] was modified the last time.
    pub updated_at: ModificationDateTime,
}

impl Property {
    /// Changes the [`Status`] of this [`Property`] to the `requested` one.
    ///
    /// The previous [`RejectionReason`] is dropped on any actual change.
    /// [`Status::Rejected`] is reachable via [`Property::reject()`] only.
    ///
    /// # Errors
    ///
    /// If the `requested` [`Status`] is not reachable from the current one,
    /// or requires a [`RejectionReason`].
    pub fn transition(
        &mut self,
        requested: Status,
    ) -> Result<(), TransitionError> {
        if requested == Status::Rejected && self.status != Status::Rejected {
            return Err(TransitionError::ReasonRequired);
        }
        self.change_status(requested)?;
        Ok(())
    }

    /// Rejects this [`Property`] listing for the provided [`RejectionReason`].
    ///
    /// # Errors
    ///
    /// If [`Status::Rejected`] is not reachable from the current [`Status`].
    pub fn reject(
        &mut self,
        reason: RejectionReason,
    ) -> Result<(), TransitionError> {
        self.change_status(Status::Rejected)?;
        self.rejection_reason = Some(reason);
        Ok(())
    }

    /// Moves this [`Property`] to the `requested` [`Status`] along the
    /// transition table.
    fn change_status(
        &mut self,
        requested: Status,
    ) -> Result<(), InvalidTransition> {
        let next = self.status.transition(requested)?;
        if next != self.status {
            self.status = next;
            self.rejection_reason = None;
        }
        Ok(())
    }
}

/// Error of changing a [`Status`] of a [`Property`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, From, PartialEq)]
pub enum TransitionError {
    /// Requested [`Status`] is not reachable from the current one.
    #[display("{_0}")]
    Invalid(InvalidTransition),

    /// [`Status::Rejected`] is requested without a [`RejectionReason`].
    #[display("rejecting a listing requires a reason")]
    #[from(ignore)]
    ReasonRequired,
}

/// Values of a [`Property`] editable by its managers.
#[derive(Clone, Debug)]
pub struct Details {
    /// [`Title`] of the listing.
    pub title: Title,

    /// [`Description`] of the listing.
    pub description: Description,

    /// [`Kind`] of the property.
    pub kind: Kind,

    /// Asking [`Price`].
    pub price: Price,

    /// [`DateTime`] when the property is listed.
    pub listed_at: ListingDateTime,

    /// [`Location`] of the property.
    pub location: Location,

    /// Physical [`Layout`] of the property.
    pub layout: Layout,

    /// [`Amenities`] of the property.
    pub amenities: Amenities,

    /// ID of the handling [`Agent`], if any.
    ///
    /// [`Agent`]: crate::domain::Agent
    pub agent_id: Option<agent::Id>,

    /// ID of the owner, if known.
    pub owner_id: Option<OwnerId>,
}

impl Property {
    /// Applies the provided [`Details`] to this [`Property`].
    pub fn apply(&mut self, details: Details) {
        let Details {
            title,
            description,
            kind,
            price,
            listed_at,
            location,
            layout,
            amenities,
            agent_id,
            owner_id,
        } = details;

        self.title = title;
        self.description = description;
        self.kind = kind;
        self.price = price;
        self.listed_at = listed_at;
        self.location = location;
        self.layout = layout;
        self.amenities = amenities;
        self.agent_id = agent_id;
        self.owner_id = owner_id;
    }
}

/// [`Property`] to be inserted into a storage, which assigns its [`Id`] and
/// [`Number`].
#[derive(Clone, Debug)]
pub struct New {
    /// [`Details`] of the new [`Property`].
    pub details: Details,

    /// Initial [`Status`] of the new [`Property`].
    pub status: Status,

    /// [`DateTime`] when the new [`Property`] is created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

/// ID of a [`Property`] owner.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct OwnerId(i64);

define_text! {
    #[doc = "Human-readable number of a [`Property`]."]
    Number(max = 32)
}

impl Number {
    /// Returns the [`Number`] a storage assigns to the [`Property`] with the
    /// provided [`Id`].
    #[must_use]
    pub fn for_id(id: Id) -> Self {
        Self(format!("PROP-{:06}", i64::from(id)))
    }
}

define_text! {
    #[doc = "Title of a [`Property`] listing."]
    Title(max = 256)
}

define_text! {
    #[doc = "Description of a [`Property`] listing."]
    Description(max = 8192)
}

define_text! {
    #[doc = "Kind of a [`Property`], like `House` or `Condominium`."]
    Kind(max = 64)
}

define_text! {
    #[doc = "Reason of a [`Property`] listing rejection."]
    RejectionReason(max = 1024)
}

define_text! {
    #[doc = "Street address of a [`Property`]."]
    Address(max = 512)
}

define_text! {
    #[doc = "City or municipality a [`Property`] is located in."]
    City(max = 128)
}

define_text! {
    #[doc = "State or province a [`Property`] is located in."]
    State(max = 128)
}

define_text! {
    #[doc = "Zip or postal code of a [`Property`]."]
    ZipCode(max = 16)
}

define_text! {
    #[doc = "Country a [`Property`] is located in."]
    Country(max = 128)
}

define_text! {
    #[doc = "Amenity of a [`Property`], like `Swimming Pool`."]
    Amenity(max = 128)
}

/// Asking price of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Creates a new [`Price`] if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (!amount.is_sign_negative() || amount.is_zero()).then_some(Self(amount))
    }
}

/// Location of a [`Property`].
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    /// Street [`Address`].
    pub address: Address,

    /// [`City`] or municipality.
    pub city: City,

    /// [`State`] or province.
    pub state: State,

    /// [`ZipCode`].
    pub zip_code: ZipCode,

    /// [`Country`].
    pub country: Country,

    /// [`Latitude`], if known.
    pub latitude: Option<Latitude>,

    /// [`Longitude`], if known.
    pub longitude: Option<Longitude>,
}

/// Latitude in decimal degrees.
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Latitude(f64);

impl Latitude {
    /// Creates a new [`Latitude`] if the given `degrees` are in range.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (-90.0..=90.0).contains(&degrees).then_some(Self(degrees))
    }
}

/// Longitude in decimal degrees.
#[derive(Clone, Copy, Debug, Display, Into, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Longitude(f64);

impl Longitude {
    /// Creates a new [`Longitude`] if the given `degrees` are in range.
    #[must_use]
    pub fn new(degrees: f64) -> Option<Self> {
        (-180.0..=180.0).contains(&degrees).then_some(Self(degrees))
    }
}

/// Physical layout of a [`Property`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Layout {
    /// Number of bedrooms.
    pub bedrooms: u16,

    /// Number of [`Bathrooms`].
    pub bathrooms: Bathrooms,

    /// Number of kitchens.
    pub kitchens: u16,

    /// Number of garages.
    pub garages: u16,

    /// Floor [`Area`], always in square meters.
    pub area: Area,

    /// Age of the property in years.
    pub age: u16,

    /// Floor number.
    pub floor: u16,
}

/// Number of bathrooms, where a half bathroom counts as `0.5`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Bathrooms(Decimal);

impl Bathrooms {
    /// Creates a new [`Bathrooms`] count if the given `count` is a
    /// non-negative multiple of `0.5`.
    #[must_use]
    pub fn new(count: Decimal) -> Option<Self> {
        let halves = count * Decimal::TWO;
        (!count.is_sign_negative() && halves.is_integer())
            .then_some(Self(count.normalize()))
    }
}

/// Set of [`Amenity`] labels in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Amenities(Vec<Amenity>);

impl Amenities {
    /// Creates new [`Amenities`] out of the provided labels, dropping
    /// duplicates.
    #[must_use]
    pub fn new(amenities: impl IntoIterator<Item = Amenity>) -> Self {
        let mut set = Vec::new();
        for a in amenities {
            if !set.contains(&a) {
                set.push(a);
            }
        }
        Self(set)
    }

    /// Parses [`Amenities`] from a JSON-encoded array of labels.
    ///
    /// Invalid labels are silently dropped.
    ///
    /// # Errors
    ///
    /// If the `json` is not an array of strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let labels = serde_json::from_str::<Vec<String>>(json)?;
        Ok(Self::new(
            labels
                .into_iter()
                .filter_map(|l| Amenity::new(l.trim().to_owned())),
        ))
    }

    /// Encodes these [`Amenities`] as a JSON array of labels.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(
            &self.0.iter().map(AsRef::as_ref).collect::<Vec<&str>>(),
        )
        .unwrap_or_else(|e| unreachable!("strings are serializable: {e}"))
    }

    /// Returns an iterator over these [`Amenities`].
    pub fn iter(&self) -> impl Iterator<Item = &Amenity> {
        self.0.iter()
    }
}

/// [`DateTime`] when a [`Property`] was listed.
pub type ListingDateTime = DateTimeOf<(Property, unit::Listing)>;

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was modified.
pub type ModificationDateTime = DateTimeOf<(Property, unit::Modification)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{
        Address, Amenities, Amenity, Bathrooms, City, Country, Description,
        Id, InvalidTransition, Kind, Layout, Location, Number, Price,
        Property, RejectionReason, State, Status, Title, TransitionError,
        ZipCode,
    };

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn property(status: Status) -> Property {
        Property {
            id: Id::from(1),
            number: Number::for_id(Id::from(1)),
            title: Title::new("Seaside villa").unwrap(),
            description: Description::new("Four bedrooms").unwrap(),
            kind: Kind::new("Villa").unwrap(),
            status,
            rejection_reason: None,
            price: Price::new(decimal("100")).unwrap(),
            listed_at: super::ListingDateTime::UNIX_EPOCH,
            location: Location {
                address: Address::new("1 Coast Rd").unwrap(),
                city: City::new("Cebu City").unwrap(),
                state: State::new("Cebu").unwrap(),
                zip_code: ZipCode::new("6000").unwrap(),
                country: Country::new("Philippines").unwrap(),
                latitude: None,
                longitude: None,
            },
            layout: Layout::default(),
            amenities: Amenities::default(),
            agent_id: None,
            owner_id: None,
            images: vec![],
            videos: vec![],
            created_at: super::CreationDateTime::UNIX_EPOCH,
            updated_at: super::ModificationDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn rejection_requires_reason() {
        let mut p = property(Status::Pending);

        assert_eq!(
            p.transition(Status::Rejected),
            Err(TransitionError::ReasonRequired),
        );
        assert_eq!(p.status, Status::Pending);

        p.reject(RejectionReason::new("Blurry photos").unwrap())
            .unwrap();
        assert_eq!(p.status, Status::Rejected);
        assert_eq!(
            p.rejection_reason,
            RejectionReason::new("Blurry photos"),
        );

        assert_eq!(p.transition(Status::Rejected), Ok(()));
        assert!(p.rejection_reason.is_some());

        p.transition(Status::Pending).unwrap();
        assert_eq!(p.rejection_reason, None);
    }

    #[test]
    fn reject_follows_transition_table() {
        let mut p = property(Status::Draft);

        assert_eq!(
            p.reject(RejectionReason::new("Too early").unwrap()),
            Err(TransitionError::Invalid(InvalidTransition {
                from: Status::Draft,
                to: Status::Rejected,
            })),
        );
        assert_eq!(p.rejection_reason, None);
    }

    #[test]
    fn validates_text() {
        assert!(Title::new("Seaside villa").is_some());
        assert!(Title::new("").is_none());
        assert!(Title::new(" padded ").is_none());
        assert!(Title::new("x".repeat(Title::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn formats_number() {
        assert_eq!(Number::for_id(Id::from(42)).to_string(), "PROP-000042");
    }

    #[test]
    fn price_is_non_negative() {
        assert!(Price::new(decimal("0")).is_some());
        assert!(Price::new(decimal("1500000.50")).is_some());
        assert!(Price::new(decimal("-1")).is_none());
    }

    #[test]
    fn bathrooms_allow_halves() {
        assert!(Bathrooms::new(decimal("1.5")).is_some());
        assert!(Bathrooms::new(decimal("2")).is_some());
        assert!(Bathrooms::new(decimal("1.25")).is_none());
        assert!(Bathrooms::new(decimal("-0.5")).is_none());
    }

    #[test]
    fn amenities_round_trip_json() {
        let amenities = Amenities::new(
            ["Pool", "Gym", "Pool"].into_iter().filter_map(Amenity::new),
        );

        assert_eq!(amenities.to_json(), r#"["Pool","Gym"]"#);
        assert_eq!(
            Amenities::from_json(&amenities.to_json()).unwrap(),
            amenities,
        );
        assert_eq!(Amenities::from_json("").unwrap(), Amenities::default());
        assert!(Amenities::from_json("Pool, Gym").is_err());
    }
}
