//! Geographic definitions.

use serde::Serialize;

use crate::domain::{define_text, property};

/// Point on the Earth surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinates {
    /// [`property::Latitude`] of this point.
    pub latitude: property::Latitude,

    /// [`property::Longitude`] of this point.
    pub longitude: property::Longitude,
}

define_text! {
    #[doc = "Free-form postal address to be geocoded."]
    Address(max = 1024)
}

define_text! {
    #[doc = "Human-readable address as normalized by a geocoder."]
    FormattedAddress(max = 2048)
}

define_text! {
    #[doc = "Identifier of a place assigned by a geocoder."]
    PlaceId(max = 1024)
}

/// [`Place`] along with its [`Coordinates`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// [`Coordinates`] of this [`Location`].
    #[serde(flatten)]
    pub coordinates: Coordinates,

    /// Geocoded [`Place`].
    #[serde(flatten)]
    pub place: Place,
}

/// Place resolved by a geocoder.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// [`FormattedAddress`] of this [`Place`].
    pub formatted_address: FormattedAddress,

    /// [`PlaceId`] of this [`Place`].
    pub place_id: PlaceId,
}
