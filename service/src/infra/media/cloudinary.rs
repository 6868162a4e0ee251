//! [Cloudinary] [`MediaStorage`] implementation.
//!
//! [Cloudinary]: https://cloudinary.com/documentation/image_upload_api_reference

use std::{sync::Arc, time::Duration};

use common::{
    operations::{Delete, Insert},
    DateTime,
};
use derive_more::Debug;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{de::DeserializeOwned, Deserialize};
use sha2::{Digest as _, Sha256};
use tracerr::Traced;
use tracing as log;

use crate::domain::media;

use super::{Error, MediaStorage, Resource, Upload};

/// [`Cloudinary`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Name of the cloud to store assets in.
    pub cloud_name: Option<String>,

    /// API key to authenticate with.
    pub api_key: Option<String>,

    /// API secret to sign requests with.
    #[debug(skip)]
    pub api_secret: Option<SecretString>,

    /// Root folder all the assets are stored under.
    pub root_folder: String,

    /// Base URL of the API.
    pub endpoint: String,

    /// Timeout of a single API request.
    pub timeout: Duration,
}

/// [Cloudinary] client.
///
/// [Cloudinary]: https://cloudinary.com
#[derive(Clone, Debug)]
pub struct Cloudinary {
    /// HTTP client to perform requests with.
    client: reqwest::Client,

    /// [`Credentials`] to authenticate with, if configured.
    credentials: Option<Arc<Credentials>>,

    /// Root folder all the assets are stored under.
    root_folder: String,

    /// Base URL of the API.
    endpoint: String,
}

/// [`Cloudinary`] credentials.
#[derive(Debug)]
struct Credentials {
    /// Name of the cloud to store assets in.
    cloud_name: String,

    /// API key to authenticate with.
    api_key: String,

    /// API secret to sign requests with.
    #[debug(skip)]
    api_secret: SecretString,
}

impl Cloudinary {
    /// Transformation applied to every uploaded [`Resource::Image`]:
    /// 1200x800 fill with automatic quality, encoded progressively.
    pub const IMAGE_TRANSFORMATION: &'static str =
        "c_fill,h_800,q_auto,w_1200/fl_progressive";

    /// Creates a new [`Cloudinary`] client out of the provided [`Config`].
    ///
    /// Missing credentials don't fail the creation, but every operation
    /// fails with [`Error::NotConfigured`] instead.
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Traced<Error>> {
        let Config {
            cloud_name,
            api_key,
            api_secret,
            root_folder,
            endpoint,
            timeout,
        } = config;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let credentials = match (cloud_name, api_key, api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret))
                if !cloud_name.is_empty() && !api_key.is_empty() =>
            {
                Some(Arc::new(Credentials {
                    cloud_name,
                    api_key,
                    api_secret,
                }))
            }
            _ => {
                log::warn!("`Cloudinary` credentials are not configured");
                None
            }
        };

        Ok(Self {
            client,
            credentials,
            root_folder,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
        })
    }

    /// Returns the configured [`Credentials`].
    fn credentials(&self) -> Result<&Credentials, Traced<Error>> {
        self.credentials
            .as_deref()
            .ok_or_else(|| tracerr::new!(Error::NotConfigured))
    }

    /// Returns the URL of the provided API `action` on the `resource`.
    fn url(&self, creds: &Credentials, resource: &str, action: &str) -> String {
        format!(
            "{}/{}/{resource}/{action}",
            self.endpoint, creds.cloud_name,
        )
    }

    /// Parses the provided API `response`.
    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, Traced<Error>> {
        /// Error body of an API response.
        #[derive(Deserialize)]
        struct ErrorBody {
            /// Error details.
            error: ErrorDetails,
        }

        /// Details of an [`ErrorBody`].
        #[derive(Deserialize)]
        struct ErrorDetails {
            /// Error message.
            message: String,
        }

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(tracerr::from_and_wrap!(=> Error));
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map_or_else(|_| status.to_string(), |b| b.error.message);
        Err(tracerr::new!(Error::Rejected(message)))
    }
}

/// Signs the provided request `params` with the provided API `secret`.
///
/// Parameters are sorted by their names and joined as a query string before
/// hashing.
fn sign(params: &[(&'static str, String)], secret: &str) -> String {
    let mut params = params.to_vec();
    params.sort_unstable_by_key(|(k, _)| *k);

    let payload = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{payload}{secret}")))
}

impl MediaStorage<Insert<Upload>> for Cloudinary {
    type Ok = media::Asset;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Insert(upload): Insert<Upload>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Successful upload response.
        #[derive(Deserialize)]
        struct Uploaded {
            secure_url: String,
            public_id: String,
            width: Option<u32>,
            height: Option<u32>,
            format: Option<String>,
            bytes: u64,
            resource_type: String,
        }

        let creds = self.credentials()?;
        let Upload {
            file,
            folder,
            public_id,
            resource,
        } = upload;

        let mut params = vec![
            ("folder", format!("{}/{folder}", self.root_folder)),
            ("timestamp", DateTime::now().unix_timestamp().to_string()),
        ];
        if let Some(id) = public_id {
            params.push(("public_id", id.to_string()));
        }
        if resource == Resource::Image {
            params.push((
                "transformation",
                Self::IMAGE_TRANSFORMATION.to_owned(),
            ));
        }
        let signature = sign(&params, creds.api_secret.expose_secret());

        let part = Part::bytes(file.content)
            .file_name(file.name.to_string())
            .mime_str(file.mime_type.as_ref())
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let form = params
            .into_iter()
            .fold(Form::new(), |form, (k, v)| form.text(k, v))
            .text("api_key", creds.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let response = self
            .client
            .post(self.url(creds, resource.as_str(), "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let uploaded: Uploaded =
            Self::parse(response).await.map_err(tracerr::wrap!())?;
        log::debug!("`Cloudinary` uploaded `{}`", uploaded.public_id);

        let malformed = |field| {
            tracerr::new!(Error::Rejected(format!(
                "malformed `{field}` in response",
            )))
        };
        Ok(media::Asset {
            url: media::Url::new(uploaded.secure_url)
                .ok_or_else(|| malformed("secure_url"))?,
            public_id: media::PublicId::new(uploaded.public_id)
                .ok_or_else(|| malformed("public_id"))?,
            width: uploaded.width,
            height: uploaded.height,
            format: uploaded.format,
            size: uploaded.bytes,
            resource_type: uploaded.resource_type,
        })
    }
}

impl MediaStorage<Delete<media::PublicId>> for Cloudinary {
    /// Indicator whether the asset has been destroyed.
    type Ok = bool;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Delete(public_id): Delete<media::PublicId>,
    ) -> Result<Self::Ok, Self::Err> {
        /// Destroy response.
        #[derive(Deserialize)]
        struct Destroyed {
            result: String,
        }

        let creds = self.credentials()?;

        let mut params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", DateTime::now().unix_timestamp().to_string()),
        ];
        let signature = sign(&params, creds.api_secret.expose_secret());
        params.extend([
            ("api_key", creds.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_owned()),
        ]);

        let response = self
            .client
            .post(self.url(creds, Resource::Image.as_str(), "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let destroyed: Destroyed =
            Self::parse(response).await.map_err(tracerr::wrap!())?;
        log::debug!(
            "`Cloudinary` destroyed `{public_id}`: {}",
            destroyed.result,
        );

        Ok(destroyed.result == "ok")
    }
}
