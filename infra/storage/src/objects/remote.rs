use super::{ObjectStore, validate_key};
use crate::error::StorageError;
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::bucket_ops::BucketConfiguration;
use s3::creds::Credentials;
use s3::region::Region;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{info, instrument};

/// Connection parameters for an S3-compatible endpoint.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// `host:port` or full URL. A bare host gets `https://` when `secure`, else `http://`.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub secure: bool,
}

impl S3Settings {
    fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.clone()
        } else if self.secure {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// S3/MinIO bucket addressed path-style.
#[derive(Debug)]
pub struct S3Store {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

fn remote(context: &'static str) -> impl FnOnce(s3::error::S3Error) -> StorageError {
    move |e| StorageError::Remote { message: e.to_string().into(), context: Some(context.into()) }
}

impl S3Store {
    /// Builds the client. No request is made until [`ObjectStore::ensure_bucket`].
    ///
    /// # Errors
    /// [`StorageError::Remote`] for unusable credentials or bucket names.
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        let region =
            Region::Custom { region: settings.region.clone(), endpoint: settings.endpoint_url() };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Remote {
            message: e.to_string().into(),
            context: Some("Building S3 credentials".into()),
        })?;

        let bucket = Bucket::new(&settings.bucket, region.clone(), credentials.clone())
            .map_err(remote("Building S3 bucket handle"))?
            .with_path_style();

        Ok(Self { bucket, region, credentials })
    }

    fn check_status(code: u16, what: &'static str) -> Result<(), StorageError> {
        if (200..300).contains(&code) {
            Ok(())
        } else {
            Err(StorageError::Remote {
                message: Cow::Owned(format!("unexpected status {code}")),
                context: Some(what.into()),
            })
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn backend(&self) -> &'static str {
        "s3"
    }

    #[instrument(skip(self), fields(bucket = %self.bucket.name()))]
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if self.bucket.exists().await.map_err(remote("Checking bucket"))? {
            return Ok(());
        }

        let created = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(remote("Creating bucket"))?;
        Self::check_status(created.response_code, "Creating bucket")?;

        info!("Bucket created");
        Ok(())
    }

    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .await
            .map_err(remote("Uploading object"))?;
        Self::check_status(response.status_code(), "Uploading object")
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let response = self.bucket.delete_object(key).await.map_err(remote("Deleting object"))?;
        match response.status_code() {
            404 => Ok(()),
            code => Self::check_status(code, "Deleting object"),
        }
    }

    async fn presigned_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        validate_key(key)?;
        let secs = u32::try_from(ttl.as_secs()).unwrap_or(u32::MAX);
        self.bucket.presign_get(key, secs, None).await.map_err(remote("Presigning URL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: &str) -> S3Settings {
        S3Settings {
            endpoint: endpoint.to_owned(),
            access_key: "minioadmin".to_owned(),
            secret_key: "minioadmin".to_owned(),
            bucket: "trai-attachments".to_owned(),
            region: "us-east-1".to_owned(),
            secure: false,
        }
    }

    #[test]
    fn bare_endpoint_gets_scheme() {
        assert_eq!(settings("localhost:9000").endpoint_url(), "http://localhost:9000");
        let secure = S3Settings { secure: true, ..settings("minio:9000") };
        assert_eq!(secure.endpoint_url(), "https://minio:9000");
        assert_eq!(settings("http://x:1").endpoint_url(), "http://x:1");
    }

    #[tokio::test]
    async fn presigned_url_is_computed_offline() -> Result<(), StorageError> {
        let store = S3Store::new(&settings("localhost:9000"))?;
        let url = store.presigned_get("abc.png", Duration::from_secs(3600)).await?;
        assert!(url.starts_with("http://localhost:9000/"));
        assert!(url.contains("trai-attachments"));
        assert!(url.contains("abc.png"));
        assert!(url.contains("X-Amz-Expires=3600"));
        Ok(())
    }
}
