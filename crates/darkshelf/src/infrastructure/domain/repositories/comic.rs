use async_trait::async_trait;
use rand::seq::IndexedRandom;

use crate::{
    domain::repositories::comic::{ComicRepository, ComicRepositoryError, RawResponse},
    infrastructure::config::Config,
};

#[derive(Clone)]
pub struct ComicRepositoryImpl {
    client: reqwest::Client,
    mirrors: Vec<String>,
    verification: String,
}

impl ComicRepositoryImpl {
    /// `mirrors` and `verification` are base urls, e.g. `http://v3api.dmzj.com`
    pub fn new(client: reqwest::Client, mirrors: Vec<String>, verification: String) -> Self {
        Self {
            client,
            mirrors,
            verification,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config
                .mirror_hosts
                .iter()
                .map(|host| format!("http://{host}"))
                .collect(),
            format!("https://{}", config.verify_host),
        )
    }

    async fn get(&self, url: String) -> Result<RawResponse, ComicRepositoryError> {
        let res = self.client.get(url).send().await?;
        let status = res.status().as_u16();
        // always read to the end, an unread body keeps the connection out of the pool
        let body = res.bytes().await?;

        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl ComicRepository for ComicRepositoryImpl {
    async fn fetch_detail(&self, id: u64) -> Result<RawResponse, ComicRepositoryError> {
        let mirror = self
            .mirrors
            .choose(&mut rand::rng())
            .ok_or_else(|| ComicRepositoryError::Other("no mirror configured".to_string()))?;

        self.get(format!("{mirror}/comic/{id}.json")).await
    }

    async fn fetch_verification(&self, id: u64) -> Result<RawResponse, ComicRepositoryError> {
        self.get(format!("{}/info/{id}.html", self.verification))
            .await
    }
}
