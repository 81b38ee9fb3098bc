//! Azure Blob Storage uploads over the REST API.
//!
//! Authentication comes from a standard storage connection string. When it
//! carries a `SharedAccessSignature` the token is appended to the request URL;
//! otherwise the request is signed with the account key (Shared Key scheme).
//! `Put Blob` replaces any existing blob under the same name, so uploading a
//! city twice leaves exactly one blob holding the latest payload.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url, header};
use sha2::Sha256;

use crate::{
    config::{Config, Service},
    error::{PipelineError, Result},
};

use super::{BlobStore, send};

const PROVIDER: &str = "blob-storage";
pub const CONTAINER_NAME: &str = "polaroid4";
const API_VERSION: &str = "2021-08-06";
const CONTENT_TYPE: &str = "application/json";

type HmacSha256 = Hmac<Sha256>;

/// Blob key under which a city's current conditions are stored.
pub fn blob_name(city: &str) -> String {
    format!("{city}.json")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionString {
    pub account_name: Option<String>,
    pub account_key: Option<String>,
    pub blob_endpoint: String,
    pub sas_token: Option<String>,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut sas_token = None;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Values may contain '=' (base64 keys, SAS tokens): split on the first one only.
            let (name, value) = part.split_once('=').ok_or_else(|| {
                PipelineError::InvalidConnectionString(format!("segment without '=': {part}"))
            })?;

            match name.to_ascii_lowercase().as_str() {
                "defaultendpointsprotocol" => protocol = value.to_string(),
                "endpointsuffix" => suffix = value.to_string(),
                "accountname" => account_name = Some(value.to_string()),
                "accountkey" => account_key = Some(value.to_string()),
                "blobendpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "sharedaccesssignature" => {
                    sas_token = Some(value.trim_start_matches('?').to_string())
                }
                other => tracing::debug!(segment = other, "ignoring connection string segment"),
            }
        }

        let blob_endpoint = match (blob_endpoint, &account_name) {
            (Some(endpoint), _) => endpoint,
            (None, Some(account)) => format!("{protocol}://{account}.blob.{suffix}"),
            (None, None) => {
                return Err(PipelineError::InvalidConnectionString(
                    "neither BlobEndpoint nor AccountName is present".into(),
                ));
            }
        };

        if sas_token.is_none() && (account_name.is_none() || account_key.is_none()) {
            return Err(PipelineError::InvalidConnectionString(
                "need SharedAccessSignature, or both AccountName and AccountKey".into(),
            ));
        }

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
            sas_token,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AzureBlobStore {
    connection_string: Option<String>,
    container: String,
    http: Client,
}

impl AzureBlobStore {
    pub fn new(http: Client, connection_string: Option<String>) -> Self {
        Self {
            connection_string,
            container: CONTAINER_NAME.to_string(),
            http,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(http, config.credential(Service::BlobStorage).map(str::to_owned))
    }

    fn blob_url(&self, conn: &ConnectionString, blob_name: &str) -> Result<Url> {
        let mut url = Url::parse(&conn.blob_endpoint).map_err(|e| {
            PipelineError::InvalidConnectionString(format!("bad blob endpoint: {e}"))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                PipelineError::InvalidConnectionString("blob endpoint cannot be a base URL".into())
            })?
            .pop_if_empty()
            .push(&self.container)
            .push(blob_name);

        if let Some(sas) = &conn.sas_token {
            url.set_query(Some(sas));
        }

        Ok(url)
    }
}

/// String-to-sign for a `Put Blob` request under the Shared Key scheme.
fn string_to_sign(account: &str, url: &Url, content_length: usize, date: &str) -> String {
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    let standard = [
        "PUT",
        "", // Content-Encoding
        "", // Content-Language
        length.as_str(),
        "", // Content-MD5
        CONTENT_TYPE,
        "", // Date (x-ms-date is used instead)
        "", // If-Modified-Since
        "", // If-Match
        "", // If-None-Match
        "", // If-Unmodified-Since
        "", // Range
    ]
    .join("\n");

    format!(
        "{standard}\nx-ms-blob-type:BlockBlob\nx-ms-date:{date}\nx-ms-version:{API_VERSION}\n/{account}{}",
        url.path()
    )
}

fn sign(base64_key: &str, string_to_sign: &str) -> Result<String> {
    let key = STANDARD
        .decode(base64_key)
        .map_err(|e| PipelineError::InvalidConnectionString(format!("AccountKey is not base64: {e}")))?;

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| PipelineError::InvalidConnectionString(format!("unusable AccountKey: {e}")))?;
    mac.update(string_to_sign.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn upload(&self, blob_name: &str, body: Vec<u8>) -> Result<()> {
        let raw = self
            .connection_string
            .as_deref()
            .ok_or(PipelineError::MissingCredential(Service::BlobStorage))?;
        let conn = ConnectionString::parse(raw)?;
        let url = self.blob_url(&conn, blob_name)?;

        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let content_length = body.len();

        let mut request = self
            .http
            .put(url.clone())
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header(header::CONTENT_TYPE, CONTENT_TYPE);

        if conn.sas_token.is_none() {
            // parse() guarantees both are present without a SAS token.
            if let (Some(account), Some(key)) = (&conn.account_name, &conn.account_key) {
                let signature = sign(key, &string_to_sign(account, &url, content_length, &date))?;
                request = request.header(header::AUTHORIZATION, format!("SharedKey {account}:{signature}"));
            }
        }

        tracing::debug!(container = %self.container, blob_name, bytes = content_length, "uploading blob");
        send(PROVIDER, request.body(body)).await?;
        tracing::info!(container = %self.container, blob_name, "blob uploaded");

        Ok(())
    }
}
