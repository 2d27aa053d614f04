use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;

use super::SlotStore;
use crate::config::S3Config;

const SLOT_PREFIX: &str = "slots/";
const CONTENT_TYPE: &str = "application/jwt";

/// Slots stored as objects in an S3-compatible bucket (MinIO in dev).
#[derive(Clone)]
pub struct S3Slots {
    client: Client,
    bucket: String,
}

impl S3Slots {
    pub async fn new(cfg: &S3Config) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }

    fn object_key(key: &str) -> String {
        format!("{SLOT_PREFIX}{key}")
    }
}

#[async_trait]
impl SlotStore for S3Slots {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .send()
            .await;

        let out = match res {
            Ok(out) => out,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(err).context("s3 get_object");
            }
        };

        let body = out
            .body
            .collect()
            .await
            .context("s3 read object body")?
            .into_bytes();
        let value = String::from_utf8(body.to_vec()).context("slot object is not utf-8")?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .body(ByteStream::from(Bytes::from(value.to_owned())))
            .content_type(CONTENT_TYPE)
            .send()
            .await
            .context("s3 put_object")?;
        debug!(key, bucket = %self.bucket, "slot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .send()
            .await
            .context("s3 delete_object")?;
        Ok(())
    }
}
