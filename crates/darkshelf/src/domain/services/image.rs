use crate::domain::{
    entities::image::Image,
    repositories::image::{ImageRepository, ImageRepositoryError},
};

#[derive(Clone)]
pub struct ImageService<R>
where
    R: ImageRepository,
{
    repo: R,
}

impl<R> ImageService<R>
where
    R: ImageRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Fetches `path` from the image host. The path is forwarded as requested,
    /// prefix included.
    pub async fn fetch_image(&self, path: &str) -> Result<Image, ImageRepositoryError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let image = self.repo.fetch_image(&path).await?;
        debug!(
            "proxied image {path}, status={}, size={} bytes",
            image.status,
            image.data.len()
        );

        Ok(image)
    }
}
