//! Geocoding endpoints.

use axum::{extract::Query, Extension, Json};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use service::{
    domain::{geo, property},
    infra::geocoder,
    query::{self, Query as _},
};

use crate::{api, define_error, AsError, Error, Service, Session};

/// Request body of `POST /geocode`.
#[derive(Clone, Debug, Deserialize)]
pub struct AddressInput {
    /// [`geo::Address`] to resolve.
    pub address: Option<geo::Address>,
}

/// Query parameters of `GET /geocode`.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CoordinatesParams {
    /// Latitude of the point to resolve.
    pub lat: Option<property::Latitude>,

    /// Longitude of the point to resolve.
    pub lng: Option<property::Longitude>,
}

/// `POST /geocode`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `MISSING_FIELDS` - no address provided;
/// - `ADDRESS_NOT_FOUND` - the address cannot be resolved;
/// - `GEOCODING_NOT_CONFIGURED` - geocoder API key is missing;
/// - `GEOCODING_FAILED` - geocoder is unavailable.
#[tracing::instrument(skip_all, fields(otel.name = "POST /geocode"))]
pub async fn forward(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Json(input), _): WithRejection<Json<AddressInput>, Error>,
) -> api::Result<geo::Location> {
    let address = input
        .address
        .ok_or_else(|| Error::from(GeocodeError::AddressRequired))?;

    let location = service
        .execute(query::geo::GeocodeAddress(address))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(location))
}

/// `GET /geocode?lat=&lng=`
///
/// # Errors
///
/// Possible error codes:
/// - `AUTHORIZATION_REQUIRED` - no valid session provided;
/// - `MISSING_FIELDS` - no coordinates provided;
/// - `ADDRESS_NOT_FOUND` - nothing is located at the coordinates;
/// - `GEOCODING_NOT_CONFIGURED` - geocoder API key is missing;
/// - `GEOCODING_FAILED` - geocoder is unavailable.
#[tracing::instrument(skip_all, fields(otel.name = "GET /geocode"))]
pub async fn reverse(
    Extension(service): Extension<Service>,
    _: Session,
    WithRejection(Query(params), _): WithRejection<
        Query<CoordinatesParams>,
        Error,
    >,
) -> api::Result<geo::Place> {
    let CoordinatesParams {
        lat: Some(latitude),
        lng: Some(longitude),
    } = params
    else {
        return Err(GeocodeError::CoordinatesRequired.into());
    };

    let place = service
        .execute(query::geo::ReverseGeocode(geo::Coordinates {
            latitude,
            longitude,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(api::Success::new(place))
}

define_error! {
    enum GeocodeError {
        #[code = "MISSING_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "Address is required"]
        AddressRequired,

        #[code = "MISSING_FIELDS"]
        #[status = BAD_REQUEST]
        #[message = "Latitude and longitude are required"]
        CoordinatesRequired,

        #[code = "ADDRESS_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Address not found"]
        AddressNotFound,

        #[code = "ADDRESS_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Location not found"]
        LocationNotFound,

        #[code = "GEOCODING_NOT_CONFIGURED"]
        #[status = INTERNAL_SERVER_ERROR]
        #[message = "Geocoding service not configured"]
        NotConfigured,

        #[code = "GEOCODING_FAILED"]
        #[status = BAD_GATEWAY]
        #[message = "Failed to geocode address"]
        Failed,
    }
}

impl AsError for geocoder::Error {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::NotConfigured => GeocodeError::NotConfigured.into(),
            Self::Http(_) | Self::Rejected(_) => GeocodeError::Failed.into(),
        })
    }
}

impl AsError for query::geo::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AddressNotFound => Some(GeocodeError::AddressNotFound.into()),
            Self::Geocoder(e) => e.try_as_error(),
            Self::LocationNotFound => {
                Some(GeocodeError::LocationNotFound.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use axum::extract::Query;
    use service::query::geo::ExecutionError;

    use super::{AddressInput, CoordinatesParams};
    use crate::AsError as _;

    fn parse(query: &str) -> Result<CoordinatesParams, String> {
        let uri: http::Uri = format!("/geocode?{query}").parse().unwrap();
        Query::<CoordinatesParams>::try_from_uri(&uri)
            .map(|q| q.0)
            .map_err(|e| e.body_text())
    }

    #[test]
    fn parses_coordinates() {
        let params = parse("lat=6.4281&lng=3.4219").unwrap();
        assert!(params.lat.is_some());
        assert!(params.lng.is_some());

        let params = parse("lat=6.4281").unwrap();
        assert!(params.lng.is_none());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(parse("lat=91&lng=0").is_err());
        assert!(parse("lat=0&lng=east").is_err());
    }

    #[test]
    fn treats_absent_address_as_missing() {
        let input: AddressInput = serde_json::from_str("{}").unwrap();
        assert!(input.address.is_none());

        assert!(serde_json::from_str::<AddressInput>(r#"{"address":""}"#)
            .is_err());
    }

    #[test]
    fn maps_not_found_results() {
        let err = ExecutionError::AddressNotFound.into_error();
        assert_eq!(err.code, "ADDRESS_NOT_FOUND");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);

        let err = ExecutionError::LocationNotFound.into_error();
        assert_eq!(err.message, "Location not found");
    }

    #[test]
    fn maps_missing_configuration() {
        let err = ExecutionError::Geocoder(
            service::infra::geocoder::Error::NotConfigured,
        )
        .into_error();

        assert_eq!(err.code, "GEOCODING_NOT_CONFIGURED");
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
