//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::SecretString;
use serde::Deserialize;
use service::infra::{geocoder, media};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Media storage configuration.
    pub media: Media,

    /// Geocoder configuration.
    pub geocoder: Geocoder,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Maximum duration of handling a single HTTP request.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub request_timeout: time::Duration,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// [JWT] secret.
    ///
    /// [JWT]: https://wikipedia.org/wiki/JSON_Web_Token
    #[default("secret".to_owned())]
    pub jwt_secret: String,

    /// Duration an issued session token stays valid for.
    #[default(time::Duration::from_secs(12 * 60 * 60))]
    #[serde(with = "humantime_serde")]
    pub session_ttl: time::Duration,

    /// Indicator whether remote images of a deleted property should be
    /// destroyed.
    #[default(true)]
    pub purge_media_on_delete: bool,

    /// Administrator account ensured on startup.
    pub admin: Option<Admin>,
}

impl From<Service> for service::Config {
    fn from(value: Service) -> Self {
        let Service {
            jwt_secret,
            session_ttl,
            purge_media_on_delete,
            admin: _,
        } = value;
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                jwt_secret.as_bytes(),
            ),
            session_ttl,
            purge_media_on_delete,
        }
    }
}

/// Administrator account seeded on startup.
#[derive(Clone, Debug, Deserialize)]
pub struct Admin {
    /// Display name of the administrator.
    #[serde(default = "Admin::default_name")]
    pub name: String,

    /// Email the administrator signs in with.
    pub email: String,

    /// Password the administrator signs in with.
    pub password: SecretString,
}

impl Admin {
    /// Returns the default [`Admin::name`].
    fn default_name() -> String {
        "Administrator".to_owned()
    }
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// [Cloudinary] media storage configuration.
///
/// Storage operations fail until all the credentials are provided.
///
/// [Cloudinary]: https://cloudinary.com
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Media {
    /// Name of the cloud to store assets in.
    pub cloud_name: Option<String>,

    /// API key to authenticate with.
    pub api_key: Option<String>,

    /// API secret to sign requests with.
    pub api_secret: Option<SecretString>,

    /// Folder all the uploaded assets are nested into.
    #[default("sog-global-consult".to_owned())]
    pub root_folder: String,

    /// Base URL of the API.
    #[default("https://api.cloudinary.com/v1_1".to_owned())]
    pub endpoint: String,

    /// Timeout of a single API request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Media> for media::cloudinary::Config {
    fn from(value: Media) -> Self {
        let Media {
            cloud_name,
            api_key,
            api_secret,
            root_folder,
            endpoint,
            timeout,
        } = value;

        Self {
            cloud_name,
            api_key,
            api_secret,
            root_folder,
            endpoint,
            timeout,
        }
    }
}

/// Geocoder configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Geocoder {
    /// [Google Maps] API key.
    ///
    /// [Google Maps]: https://developers.google.com/maps
    pub api_key: Option<SecretString>,

    /// URL of the geocoding endpoint.
    #[default(
        "https://maps.googleapis.com/maps/api/geocode/json".to_owned()
    )]
    pub endpoint: String,

    /// Timeout of a single API request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Geocoder> for geocoder::google::Config {
    fn from(value: Geocoder) -> Self {
        let Geocoder {
            api_key,
            endpoint,
            timeout,
        } = value;

        Self {
            api_key,
            endpoint,
            timeout,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn defaults_without_file() {
        let config = Config::new("does-not-exist").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout, Duration::from_secs(60));
        assert_eq!(
            config.service.session_ttl,
            Duration::from_secs(12 * 60 * 60),
        );
        assert!(config.service.purge_media_on_delete);
        assert!(config.service.admin.is_none());
        assert_eq!(config.media.timeout, Duration::from_secs(30));
        assert!(config.geocoder.api_key.is_none());
    }
}
