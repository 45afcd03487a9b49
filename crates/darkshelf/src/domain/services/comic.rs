use bytes::Bytes;

use crate::domain::repositories::comic::{ComicRepository, ComicRepositoryError, RawResponse};

/// Verification pages at least this large are anti-scraping interstitials,
/// not the short info page of a listed comic. Observed upstream behaviour,
/// not part of any protocol, so it may need revisiting if upstream changes.
pub const VERIFICATION_BODY_LIMIT: usize = 1024;

#[derive(Clone)]
pub struct ComicService<R>
where
    R: ComicRepository,
{
    repo: R,
}

impl<R> ComicService<R>
where
    R: ComicRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches the detail payload of comic `id`, cross-checked against the
    /// verification source.
    ///
    /// An attempt counts only when both requests answer 200. A large
    /// verification page means the comic is blocked, that ends the fetch
    /// without retrying. Returns `None` when no attempt succeeded.
    pub async fn fetch(&self, id: u64, max_attempts: usize) -> Option<Bytes> {
        for attempt in 1..=max_attempts {
            let (detail, verification) = tokio::join!(
                self.repo.fetch_detail(id),
                self.repo.fetch_verification(id)
            );

            match (detail, verification) {
                (Ok(detail), Ok(verification))
                    if detail.status == 200 && verification.status == 200 =>
                {
                    if verification.body.len() >= VERIFICATION_BODY_LIMIT {
                        debug!(
                            "comic {id} blocked, verification page is {} bytes",
                            verification.body.len()
                        );
                        return None;
                    }

                    return Some(detail.body);
                }
                (detail, verification) => {
                    trace!(
                        "comic {id} attempt {attempt}/{max_attempts} failed, detail: {}, verification: {}",
                        describe(&detail),
                        describe(&verification)
                    );
                }
            }
        }

        None
    }
}

fn describe(res: &Result<RawResponse, ComicRepositoryError>) -> String {
    match res {
        Ok(res) => format!("status {}", res.status),
        Err(e) => format!("{e}"),
    }
}
