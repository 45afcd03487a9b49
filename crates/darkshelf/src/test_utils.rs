use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use darkshelf_lib::models::CatalogEntry;

use crate::domain::repositories::{
    comic::{ComicRepository, ComicRepositoryError, RawResponse},
    snapshot::{SnapshotRepository, SnapshotRepositoryError},
};

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, Bytes),
    Fail,
    Panic,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Status(200, Bytes::copy_from_slice(body.as_bytes()))
    }

    pub fn sized(len: usize) -> Self {
        Reply::Status(200, Bytes::from(vec![b'x'; len]))
    }

    pub fn not_found() -> Self {
        Reply::Status(404, Bytes::new())
    }

    fn into_result(self, id: u64) -> Result<RawResponse, ComicRepositoryError> {
        match self {
            Reply::Status(status, body) => Ok(RawResponse { status, body }),
            Reply::Fail => Err(ComicRepositoryError::Other("connection reset".to_string())),
            Reply::Panic => panic!("upstream blew up on comic {id}"),
        }
    }
}

/// Scripted upstream. Detail replies are consumed one per attempt and the last
/// one repeats, unknown ids answer 404.
#[derive(Clone, Default)]
pub struct FakeComicRepository {
    details: HashMap<u64, Vec<Reply>>,
    verifications: HashMap<u64, Reply>,
    detail_calls: Arc<Mutex<HashMap<u64, usize>>>,
    verification_calls: Arc<Mutex<HashMap<u64, usize>>>,
    delay: Duration,
}

impl FakeComicRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comic(self, id: u64, detail: &str) -> Self {
        self.with_detail(id, vec![Reply::ok(detail)])
    }

    pub fn with_detail(mut self, id: u64, replies: Vec<Reply>) -> Self {
        self.details.insert(id, replies);
        self
    }

    pub fn with_verification(mut self, id: u64, reply: Reply) -> Self {
        self.verifications.insert(id, reply);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn detail_calls(&self, id: u64) -> usize {
        self.detail_calls
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or_default()
    }

    pub fn verification_calls(&self, id: u64) -> usize {
        self.verification_calls
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ComicRepository for FakeComicRepository {
    async fn fetch_detail(&self, id: u64) -> Result<RawResponse, ComicRepositoryError> {
        let attempt = {
            let mut calls = self.detail_calls.lock().unwrap();
            let count = calls.entry(id).or_default();
            *count += 1;
            *count - 1
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = match self.details.get(&id) {
            Some(replies) if !replies.is_empty() => {
                replies[attempt.min(replies.len() - 1)].clone()
            }
            _ => Reply::not_found(),
        };

        reply.into_result(id)
    }

    async fn fetch_verification(&self, id: u64) -> Result<RawResponse, ComicRepositoryError> {
        *self
            .verification_calls
            .lock()
            .unwrap()
            .entry(id)
            .or_default() += 1;

        self.verifications
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Reply::ok("<p>ok</p>"))
            .into_result(id)
    }
}

#[derive(Clone, Default)]
pub struct FakeSnapshotRepository {
    saved: Arc<Mutex<Vec<Vec<CatalogEntry>>>>,
    fail: bool,
}

impl FakeSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Vec<CatalogEntry>> {
        self.saved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SnapshotRepository for FakeSnapshotRepository {
    async fn save(&self, entries: &[CatalogEntry]) -> Result<(), SnapshotRepositoryError> {
        if self.fail {
            return Err(SnapshotRepositoryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )));
        }

        self.saved.lock().unwrap().push(entries.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<CatalogEntry>, SnapshotRepositoryError> {
        Ok(self.last().unwrap_or_default())
    }
}
