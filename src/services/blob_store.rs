use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("request to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Upstream {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Object storage for profile pictures, addressed by opaque key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), BlobStoreError>;

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    /// URL a client can fetch the object from.
    fn object_url(&self, key: &str) -> String;
}

/// Talks to an S3-style HTTP gateway: `PUT`/`DELETE {base}/{bucket}/{key}`.
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
    public_url: String,
    bucket: String,
    api_key: Option<String>,
}

impl HttpBlobStore {
    pub fn new(
        base_url: impl Into<String>,
        public_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key,
        }
    }

    fn object_path(&self, base: &str, key: &str) -> String {
        format!("{}/{}/{}", base, self.bucket, key)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), BlobStoreError> {
        let url = self.object_path(&self.base_url, key);
        let resp = self
            .authorized(self.client.put(&url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|source| BlobStoreError::Connect {
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(BlobStoreError::Upstream {
                url,
                status: resp.status(),
            });
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let url = self.object_path(&self.base_url, key);
        let resp = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(|source| BlobStoreError::Connect {
                url: url.clone(),
                source,
            })?;

        // Deleting something already gone is fine.
        let status = resp.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(BlobStoreError::Upstream { url, status });
        }
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        self.object_path(&self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_uses_public_base_and_bucket() {
        let store = HttpBlobStore::new(
            "http://internal:8004/",
            "https://cdn.example.com/",
            "profile-images",
            None,
        );
        assert_eq!(
            store.object_url("cat.jpg-123"),
            "https://cdn.example.com/profile-images/cat.jpg-123"
        );
    }
}
