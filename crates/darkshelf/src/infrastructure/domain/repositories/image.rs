use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, REFERER};

use crate::domain::{
    entities::image::Image,
    repositories::image::{ImageRepository, ImageRepositoryError},
};

#[derive(Clone)]
pub struct ImageRepositoryImpl {
    client: reqwest::Client,
    host: String,
    referer: String,
}

impl ImageRepositoryImpl {
    pub fn new(client: reqwest::Client, host: &str, referer: &str) -> Self {
        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            referer: referer.to_string(),
        }
    }
}

#[async_trait]
impl ImageRepository for ImageRepositoryImpl {
    async fn fetch_image(&self, path: &str) -> Result<Image, ImageRepositoryError> {
        let res = self
            .client
            .get(format!("{}{path}", self.host))
            .header(REFERER, &self.referer)
            .send()
            .await?;

        let status = res.status().as_u16();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let data = res.bytes().await?;

        Ok(Image {
            status,
            content_type,
            data,
        })
    }
}
