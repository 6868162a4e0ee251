//! [`Query`] collection resolving addresses and [`geo::Coordinates`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::geo,
    infra::{geocoder, Geocoder},
    Service,
};

use super::Query;

/// Resolves [`geo::Location`] of a [`geo::Address`].
#[derive(Clone, Debug)]
pub struct GeocodeAddress(pub geo::Address);

/// Resolves [`geo::Place`] at [`geo::Coordinates`].
#[derive(Clone, Copy, Debug)]
pub struct ReverseGeocode(pub geo::Coordinates);

impl<Db, Ms, Gc> Query<GeocodeAddress> for Service<Db, Ms, Gc>
where
    Gc: Geocoder<
        Select<By<Option<geo::Location>, geo::Address>>,
        Ok = Option<geo::Location>,
        Err = Traced<geocoder::Error>,
    >,
{
    type Ok = geo::Location;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        GeocodeAddress(address): GeocodeAddress,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.geocoder()
            .execute(Select(By::new(address)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AddressNotFound)
            .map_err(tracerr::wrap!())
    }
}

impl<Db, Ms, Gc> Query<ReverseGeocode> for Service<Db, Ms, Gc>
where
    Gc: Geocoder<
        Select<By<Option<geo::Place>, geo::Coordinates>>,
        Ok = Option<geo::Place>,
        Err = Traced<geocoder::Error>,
    >,
{
    type Ok = geo::Place;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        ReverseGeocode(coordinates): ReverseGeocode,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.geocoder()
            .execute(Select(By::new(coordinates)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::LocationNotFound)
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`GeocodeAddress`] and [`ReverseGeocode`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Nothing is found at the [`geo::Address`].
    #[display("Address not found")]
    AddressNotFound,

    /// [`Geocoder`] error.
    #[display("`Geocoder` operation failed: {_0}")]
    #[from]
    Geocoder(geocoder::Error),

    /// Nothing is found at the [`geo::Coordinates`].
    #[display("Location not found")]
    LocationNotFound,
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{geo, property},
        test_utils::{service, KNOWN_ADDRESS},
        Query as _,
    };

    use super::{ExecutionError, GeocodeAddress, ReverseGeocode};

    #[tokio::test]
    async fn geocodes_known_address_only() {
        let (svc, _) = service();

        let location = svc
            .execute(GeocodeAddress(geo::Address::new(KNOWN_ADDRESS).unwrap()))
            .await
            .unwrap();
        assert_eq!(location.place.formatted_address.as_ref(), KNOWN_ADDRESS);

        let err = svc
            .execute(GeocodeAddress(geo::Address::new("Atlantis").unwrap()))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::AddressNotFound),
            "{err}",
        );
    }

    #[tokio::test]
    async fn reverse_geocodes_round_trip() {
        let (svc, _) = service();
        let location = svc
            .execute(GeocodeAddress(geo::Address::new(KNOWN_ADDRESS).unwrap()))
            .await
            .unwrap();

        let place = svc
            .execute(ReverseGeocode(location.coordinates))
            .await
            .unwrap();
        assert_eq!(place, location.place);

        let err = svc
            .execute(ReverseGeocode(geo::Coordinates {
                latitude: property::Latitude::new(0.0).unwrap(),
                longitude: property::Longitude::new(0.0).unwrap(),
            }))
            .await
            .unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::LocationNotFound),
            "{err}",
        );
    }
}
