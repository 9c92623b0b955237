//! S3 backend for the sync engine.
//!
//! Redirects are stored the way S3 static website hosting expects them: an
//! empty object carrying `x-amz-website-redirect-location`, readable by
//! everyone so the website endpoint can serve the 301.

use crate::{
    config::{Credentials as KeyCredentials, S3Settings},
    models::object::{RemoteObject, RemoteSnapshot},
    services::store::{RedirectStore, StorageError, StorageResult},
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, http::HttpResponse},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use tracing::debug;

const PROVIDER_NAME: &str = "s3redirect-key-file";

#[derive(Clone, Debug)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

/// Build a client from explicit credentials; nothing is read from the
/// environment's default AWS provider chain.
pub fn connect(credentials: &KeyCredentials, settings: &S3Settings) -> Client {
    let creds = Credentials::new(
        credentials.access_key.clone(),
        credentials.secret_key.clone(),
        None,
        None,
        PROVIDER_NAME,
    );
    let mut builder = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(creds)
        .force_path_style(settings.path_style);
    if let Some(url) = &settings.endpoint_url {
        builder = builder.endpoint_url(url);
    }
    Client::from_conf(builder.build())
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Confirm the bucket exists and is reachable before any per-key work.
    pub async fn resolve(client: Client, bucket: &str) -> StorageResult<Self> {
        client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(storage_error)?;
        Ok(Self::new(client, bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl RedirectStore for S3Store {
    async fn list_objects(&self) -> StorageResult<RemoteSnapshot> {
        let mut snapshot = RemoteSnapshot::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(storage_error)?;
            for object in page.contents() {
                let Some(name) = object.key() else {
                    continue;
                };
                let size = u64::try_from(object.size().unwrap_or_default()).unwrap_or(0);
                snapshot.insert(name.to_string(), RemoteObject::new(name, size));
            }
        }

        debug!(bucket = %self.bucket, objects = snapshot.len(), "listed objects");
        Ok(snapshot)
    }

    async fn get_redirect(&self, object: &RemoteObject) -> StorageResult<Option<String>> {
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object.name)
            .send()
            .await
            .map_err(storage_error)?;
        Ok(head.website_redirect_location().map(str::to_string))
    }

    async fn set_public_redirect(
        &self,
        object: &RemoteObject,
        location: &str,
    ) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.name)
            .body(ByteStream::from_static(b""))
            .website_redirect_location(location)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(storage_error)?;
        debug!(key = %object.name, location, "redirect written");
        Ok(())
    }

    async fn delete_object(&self, object: &RemoteObject) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object.name)
            .send()
            .await
            .map_err(storage_error)?;
        debug!(key = %object.name, "object deleted");
        Ok(())
    }
}

/// Map an SDK failure to a [`StorageError`].
///
/// Anything that produced an HTTP response keeps its status, the provider's
/// error code as the reason and its message (or raw body) as the body.
/// Body-less responses (HEAD) carry no provider code, so the HTTP reason
/// phrase is used instead.
fn storage_error<E>(err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let Some(raw) = err.raw_response() else {
        return StorageError::Transport(DisplayErrorContext(&err).to_string());
    };

    let status = raw.status().as_u16();
    let raw_body = raw.body().bytes().unwrap_or_default();
    let service = err.as_service_error();
    let reason = match service.and_then(|e| e.code()) {
        Some(code) if !raw_body.is_empty() => code,
        _ => reason_phrase(status),
    }
    .to_string();
    let body = match service.and_then(|e| e.message()) {
        Some(message) if !raw_body.is_empty() => message.to_string(),
        _ => String::from_utf8_lossy(raw_body).into_owned(),
    };

    StorageError::Response {
        status,
        reason,
        body,
    }
}

fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}
