//! [Google Maps Geocoding API][1] [`Geocoder`] implementation.
//!
//! [1]: https://developers.google.com/maps/documentation/geocoding

use std::{sync::Arc, time::Duration};

use common::operations::{By, Select};
use derive_more::Debug;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use tracerr::Traced;
use tracing as log;

use crate::domain::{geo, property};

use super::{Error, Geocoder};

/// [`GoogleMaps`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key to authenticate with.
    #[debug(skip)]
    pub api_key: Option<SecretString>,

    /// URL of the geocoding endpoint.
    pub endpoint: String,

    /// Timeout of a single API request.
    pub timeout: Duration,
}

/// [Google Maps] geocoding client.
///
/// [Google Maps]: https://developers.google.com/maps
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    /// HTTP client to perform requests with.
    client: reqwest::Client,

    /// API key to authenticate with, if configured.
    #[debug(skip)]
    api_key: Option<Arc<SecretString>>,

    /// URL of the geocoding endpoint.
    endpoint: String,
}

/// Response of the geocoding endpoint.
#[derive(Debug, Deserialize)]
struct Response {
    /// Status of the request.
    status: String,

    /// Found results, the most relevant first.
    #[serde(default)]
    results: Vec<Candidate>,

    /// Explanation of a failed [`Response::status`].
    error_message: Option<String>,
}

/// Single result of a [`Response`].
#[derive(Debug, Deserialize)]
struct Candidate {
    /// Normalized address of this [`Candidate`].
    formatted_address: String,

    /// Place ID of this [`Candidate`].
    place_id: String,

    /// Geometry of this [`Candidate`].
    geometry: Geometry,
}

/// Geometry of a [`Candidate`].
#[derive(Debug, Deserialize)]
struct Geometry {
    /// Coordinates of a [`Candidate`].
    location: LatLng,
}

/// Coordinates of a [`Geometry`].
#[derive(Clone, Copy, Debug, Deserialize)]
struct LatLng {
    /// Latitude in degrees.
    lat: f64,

    /// Longitude in degrees.
    lng: f64,
}

impl GoogleMaps {
    /// Creates a new [`GoogleMaps`] client out of the provided [`Config`].
    ///
    /// Missing API key doesn't fail the creation, but every operation fails
    /// with [`Error::NotConfigured`] instead.
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let Config {
            api_key,
            endpoint,
            timeout,
        } = config;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let api_key = api_key.filter(|k| !k.expose_secret().is_empty());
        if api_key.is_none() {
            log::warn!("`GoogleMaps` API key is not configured");
        }

        Ok(Self {
            client,
            api_key: api_key.map(Arc::new),
            endpoint,
        })
    }

    /// Requests the geocoding endpoint with the provided `query` parameter,
    /// returning the most relevant [`Candidate`], if any.
    async fn request(
        &self,
        query: (&str, &str),
    ) -> Result<Option<Candidate>, Traced<Error>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| tracerr::new!(Error::NotConfigured))?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[query, ("key", key.expose_secret())])
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .error_for_status()
            .map_err(tracerr::from_and_wrap!(=> Error))?
            .json::<Response>()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Self::first(response)
    }

    /// Extracts the first [`Candidate`] out of the provided [`Response`]
    /// according to its status.
    fn first(
        response: Response,
    ) -> Result<Option<Candidate>, Traced<Error>> {
        match response.status.as_str() {
            "OK" => Ok(response.results.into_iter().next()),
            "ZERO_RESULTS" => Ok(None),
            status => Err(tracerr::new!(Error::Rejected(
                response.error_message.map_or_else(
                    || status.to_owned(),
                    |msg| format!("{status}: {msg}"),
                ),
            ))),
        }
    }

    /// Converts the provided [`Candidate`] into a [`geo::Place`].
    fn place(result: &Candidate) -> Result<geo::Place, Traced<Error>> {
        let malformed = |field| {
            tracerr::new!(Error::Rejected(format!(
                "malformed `{field}` in response",
            )))
        };
        Ok(geo::Place {
            formatted_address: geo::FormattedAddress::new(
                result.formatted_address.trim(),
            )
            .ok_or_else(|| malformed("formatted_address"))?,
            place_id: geo::PlaceId::new(result.place_id.trim())
                .ok_or_else(|| malformed("place_id"))?,
        })
    }
}

impl Geocoder<Select<By<Option<geo::Location>, geo::Address>>> for GoogleMaps {
    type Ok = Option<geo::Location>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<geo::Location>, geo::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        let address = by.into_inner();

        let Some(result) = self
            .request(("address", address.as_ref()))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let LatLng { lat, lng } = result.geometry.location;
        let coordinates = property::Latitude::new(lat)
            .zip(property::Longitude::new(lng))
            .map(|(latitude, longitude)| geo::Coordinates {
                latitude,
                longitude,
            })
            .ok_or_else(|| {
                tracerr::new!(Error::Rejected(format!(
                    "invalid coordinates `{lat},{lng}` in response",
                )))
            })?;

        Ok(Some(geo::Location {
            coordinates,
            place: Self::place(&result)?,
        }))
    }
}

impl Geocoder<Select<By<Option<geo::Place>, geo::Coordinates>>>
    for GoogleMaps
{
    type Ok = Option<geo::Place>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<geo::Place>, geo::Coordinates>>,
    ) -> Result<Self::Ok, Self::Err> {
        let geo::Coordinates {
            latitude,
            longitude,
        } = by.into_inner();

        self.request(("latlng", &format!("{latitude},{longitude}")))
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(Self::place)
            .transpose()
    }
}

#[cfg(test)]
mod spec {
    use super::{Error, GoogleMaps, Response};

    fn response(json: &str) -> Response {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn takes_first_ok_result() {
        let resp = response(
            r#"{
                "status": "OK",
                "results": [{
                    "formatted_address": "Admiralty Way, Lekki, Nigeria",
                    "place_id": "ChIJ1",
                    "geometry": {"location": {"lat": 6.44, "lng": 3.47}}
                }, {
                    "formatted_address": "Lekki, Nigeria",
                    "place_id": "ChIJ2",
                    "geometry": {"location": {"lat": 6.45, "lng": 3.48}}
                }]
            }"#,
        );

        let first = GoogleMaps::first(resp).unwrap().unwrap();
        let place = GoogleMaps::place(&first).unwrap();
        assert_eq!(place.place_id.as_ref(), "ChIJ1");
        assert_eq!(
            place.formatted_address.as_ref(),
            "Admiralty Way, Lekki, Nigeria",
        );
    }

    #[test]
    fn zero_results_is_none() {
        let resp = response(r#"{"status": "ZERO_RESULTS", "results": []}"#);

        assert!(GoogleMaps::first(resp).unwrap().is_none());
    }

    #[test]
    fn other_statuses_are_rejections() {
        let resp = response(
            r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#,
        );

        let err = GoogleMaps::first(resp).unwrap_err().into_inner();
        assert!(
            matches!(&err, Error::Rejected(m) if m == "REQUEST_DENIED: bad key"),
            "{err}",
        );
    }
}
