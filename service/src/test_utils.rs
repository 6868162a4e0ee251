//! Fixtures shared by the tests of this crate.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{
    operations::{By, Delete, Insert, Select},
    DateTime,
};
use tracerr::Traced;

use crate::{
    command::{CreateInquiry, CreateLegalDocument},
    domain::{
        geo, inquiry, legal_document, media,
        property::{self, feature, image},
        user, Property, User,
    },
    infra::{
        database::Memory,
        geocoder,
        media::{self as media_storage, Resource, Upload},
        Geocoder, MediaStorage,
    },
    Config, Service,
};

/// Password of every [`user()`].
pub(crate) const PASSWORD: &str = "correct horse";

/// The only address [`FakeGeocoder`] knows about.
pub(crate) const KNOWN_ADDRESS: &str = "1 Admiralty Way, Lekki Phase 1, Lagos";

/// [`media::PublicId`] [`FakeMedia`] refuses to destroy.
pub(crate) const MEDIA_MISSING: &str = "missing";

/// [`Service`] wired with test doubles.
pub(crate) type TestService = Service<Memory, FakeMedia, FakeGeocoder>;

/// Creates a new [`TestService`] purging media of deleted properties.
pub(crate) fn service() -> (TestService, Memory) {
    let (svc, db, _) = service_with(true);
    (svc, db)
}

/// Creates a new [`TestService`] with the provided
/// [`Config::purge_media_on_delete`] value.
pub(crate) fn service_with(purge: bool) -> (TestService, Memory, FakeMedia) {
    let db = Memory::new();
    let media = FakeMedia::default();
    let config = Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"test"),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"test"),
        session_ttl: Duration::from_secs(12 * 60 * 60),
        purge_media_on_delete: purge,
    };
    let svc = Service::new(config, db.clone(), media.clone(), FakeGeocoder);
    (svc, db, media)
}

/// Creates a new [`User`] with the [`PASSWORD`].
pub(crate) fn user(email: &str) -> User {
    User {
        id: user::Id::new(),
        name: user::Name::new("Agent").unwrap(),
        email: user::Email::new(email).unwrap(),
        password_hash: user::PasswordHash::new(
            &user::Password::new(PASSWORD).unwrap(),
        ),
        role: user::Role::Admin,
        created_at: DateTime::now().coerce(),
    }
}

/// Creates a new [`property::Draft`] located in Lekki.
pub(crate) fn property_draft(title: &str) -> property::Draft {
    property::Draft {
        title: property::Title::new(title).unwrap(),
        description: property::Description::new("Sea-facing family home")
            .unwrap(),
        price: property::Price::new(250_000_000).unwrap(),
        location: property::Location::new("Lekki Phase 1").unwrap(),
        address: None,
        latitude: None,
        longitude: None,
        kind: property::Kind::Duplex,
        status: None,
        bedrooms: property::Quantity::new(4).unwrap(),
        bathrooms: property::Quantity::new(5).unwrap(),
        area: property::Area::new(450).unwrap(),
        parking: property::Quantity::new(2).unwrap(),
        featured: true,
        year_built: property::YearBuilt::new(2020),
        amenities: property::Amenities::default(),
        features: vec![],
        images: vec![],
    }
}

/// Creates a new [`Property`] of the [`property_draft()`].
pub(crate) fn property(title: &str) -> Property {
    let slug = property::Slug::from_title(title).unwrap();
    let (p, _, _) = Property::create(
        property_draft(title),
        slug,
        user::Id::new(),
        DateTime::now(),
    );
    p
}

/// Creates a new [`image::Draft`] with the provided `name` as its
/// [`media::PublicId`].
pub(crate) fn image_draft(name: &str) -> image::Draft {
    image::Draft {
        url: media::Url::new(format!("https://cdn.example.com/{name}.jpg"))
            .unwrap(),
        public_id: media::PublicId::new(name).unwrap(),
        caption: None,
    }
}

/// Creates a new [`feature::Name`].
pub(crate) fn feature_name(name: &str) -> feature::Name {
    feature::Name::new(name).unwrap()
}

/// Creates a new general [`CreateInquiry`] without a budget.
pub(crate) fn inquiry_draft() -> CreateInquiry {
    CreateInquiry {
        name: inquiry::Name::new("Ada Obi").unwrap(),
        email: user::Email::new("ada@example.com").unwrap(),
        phone: inquiry::Phone::new("+234 801 234 5678"),
        message: inquiry::Message::new("Is it still available?").unwrap(),
        kind: None,
        property_id: None,
        budget_min: None,
        budget_max: None,
    }
}

/// Creates a new [`CreateLegalDocument`] relying on the defaults.
pub(crate) fn legal_document_draft(
    title: &str,
    created_by: user::Id,
) -> CreateLegalDocument {
    CreateLegalDocument {
        title: legal_document::Title::new(title).unwrap(),
        description: legal_document::Description::new("Read carefully"),
        category: legal_document::Category::new("TERMS").unwrap(),
        file_path: legal_document::FilePath::new(
            "https://cdn.example.com/terms.pdf",
        )
        .unwrap(),
        file_name: media::FileName::new("terms.pdf").unwrap(),
        file_size: None,
        mime_type: media::MimeType::new("application/pdf"),
        is_active: None,
        order: None,
        created_by,
    }
}

/// Creates a new four bytes long [`media::File`].
pub(crate) fn file(name: &str, mime_type: &str) -> media::File {
    media::File {
        name: media::FileName::new(name).unwrap(),
        mime_type: media::MimeType::new(mime_type).unwrap(),
        content: b"test".to_vec(),
    }
}

/// [`MediaStorage`] remembering what passed through it.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeMedia(Arc<Mutex<FakeMediaState>>);

/// Recorded state of a [`FakeMedia`].
#[derive(Debug, Default)]
struct FakeMediaState {
    /// Full [`media::PublicId`]s of the uploaded assets.
    uploaded: Vec<String>,

    /// [`media::PublicId`]s of the destroyed assets.
    destroyed: Vec<String>,

    /// [`media::FileName`]s whose upload fails.
    failing: HashSet<String>,
}

impl FakeMedia {
    /// Returns public IDs of the uploaded assets.
    pub(crate) fn uploaded(&self) -> Vec<String> {
        self.0.lock().unwrap().uploaded.clone()
    }

    /// Returns public IDs of the destroyed assets.
    pub(crate) fn destroyed(&self) -> Vec<String> {
        self.0.lock().unwrap().destroyed.clone()
    }

    /// Makes every upload of the file with the provided `name` fail.
    pub(crate) fn fail_upload_of(&self, name: &str) {
        _ = self.0.lock().unwrap().failing.insert(name.to_owned());
    }
}

impl MediaStorage<Insert<Upload>> for FakeMedia {
    type Ok = media::Asset;
    type Err = Traced<media_storage::Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        let Upload {
            file,
            folder,
            public_id,
            resource,
        } = upload;

        let mut state = self.0.lock().unwrap();
        if state.failing.contains(file.name.as_ref()) {
            return Err(tracerr::new!(media_storage::Error::Rejected(
                "Invalid image file".into(),
            )));
        }

        let id = public_id
            .map_or_else(|| file.name.to_string(), |id| id.to_string());
        let full = format!("{folder}/{id}");
        state.uploaded.push(full.clone());

        let (width, height, resource_type) = match resource {
            Resource::Image => (Some(1200), Some(800), "image"),
            Resource::Auto => (None, None, "raw"),
        };
        Ok(media::Asset {
            url: media::Url::new(format!("https://cdn.example.com/{full}"))
                .unwrap(),
            public_id: media::PublicId::new(full).unwrap(),
            width,
            height,
            format: file
                .name
                .as_ref()
                .rsplit_once('.')
                .map(|(_, ext)| ext.into()),
            size: file.size(),
            resource_type: resource_type.into(),
        })
    }
}

impl MediaStorage<Delete<media::PublicId>> for FakeMedia {
    type Ok = bool;
    type Err = Traced<media_storage::Error>;

    async fn execute(
        &self,
        Delete(id): Delete<media::PublicId>,
    ) -> Result<Self::Ok, Self::Err> {
        if id.as_ref() == MEDIA_MISSING {
            return Ok(false);
        }
        self.0.lock().unwrap().destroyed.push(id.to_string());
        Ok(true)
    }
}

/// [`Geocoder`] knowing the [`KNOWN_ADDRESS`] only.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FakeGeocoder;

impl FakeGeocoder {
    /// Returns the [`geo::Location`] of the [`KNOWN_ADDRESS`].
    fn known() -> geo::Location {
        geo::Location {
            coordinates: geo::Coordinates {
                latitude: property::Latitude::new(6.4474).unwrap(),
                longitude: property::Longitude::new(3.4723).unwrap(),
            },
            place: geo::Place {
                formatted_address: geo::FormattedAddress::new(KNOWN_ADDRESS)
                    .unwrap(),
                place_id: geo::PlaceId::new("known-place").unwrap(),
            },
        }
    }
}

impl Geocoder<Select<By<Option<geo::Location>, geo::Address>>>
    for FakeGeocoder
{
    type Ok = Option<geo::Location>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<geo::Location>, geo::Address>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok((by.into_inner().as_ref() == KNOWN_ADDRESS).then(Self::known))
    }
}

impl Geocoder<Select<By<Option<geo::Place>, geo::Coordinates>>>
    for FakeGeocoder
{
    type Ok = Option<geo::Place>;
    type Err = Traced<geocoder::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<geo::Place>, geo::Coordinates>>,
    ) -> Result<Self::Ok, Self::Err> {
        let known = Self::known();
        Ok((by.into_inner() == known.coordinates).then_some(known.place))
    }
}
