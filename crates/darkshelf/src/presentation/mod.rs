pub mod rest;

use anyhow::anyhow;
use axum::{Router, extract::Extension, routing::get};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tower_http::{CompressionLevel, compression::CompressionLayer, services::ServeDir};

use self::rest::{health::health_check, image::proxy_image};
use crate::{
    domain::services::image::ImageService,
    infrastructure::domain::repositories::image::ImageRepositoryImpl,
};

#[derive(Default)]
pub struct ServerBuilder {
    public_dir: Option<PathBuf>,
    image_svc: Option<ImageService<ImageRepositoryImpl>>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_public_dir<P: AsRef<Path>>(self, public_dir: P) -> Self {
        Self {
            public_dir: Some(public_dir.as_ref().to_path_buf()),
            ..self
        }
    }

    pub fn with_image_svc(self, image_svc: ImageService<ImageRepositoryImpl>) -> Self {
        Self {
            image_svc: Some(image_svc),
            ..self
        }
    }

    pub fn build(self) -> Result<Server, anyhow::Error> {
        let public_dir = self.public_dir.ok_or_else(|| anyhow!("no public dir"))?;
        let image_svc = self.image_svc.ok_or_else(|| anyhow!("no image service"))?;

        Ok(Server::new(&public_dir, image_svc))
    }
}

pub struct Server {
    router: Router,
}

impl Server {
    pub fn new(public_dir: &Path, image_svc: ImageService<ImageRepositoryImpl>) -> Self {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/webpic/{*path}", get(proxy_image))
            .layer(Extension(image_svc))
            .fallback_service(ServeDir::new(public_dir))
            .layer(CompressionLayer::new().quality(CompressionLevel::Precise(5)));

        Self { router }
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    pub async fn serve<A: Into<SocketAddr>>(self, addr: A) -> Result<(), anyhow::Error> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("listening on {addr}");

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{self, method},
    };

    use super::*;
    use crate::infrastructure::http::build_client;

    fn router(public_dir: &Path, image_host: &str) -> Router {
        let client = build_client(Duration::from_secs(5), Duration::from_secs(5)).unwrap();
        let repo = ImageRepositoryImpl::new(client, image_host, "https://m.dmzj.com/");

        ServerBuilder::new()
            .with_public_dir(public_dir)
            .with_image_svc(ImageService::new(repo))
            .build()
            .unwrap()
            .into_router()
    }

    async fn get(router: Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_proxy_relays_upstream_image() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(matchers::path("/webpic/1/cover.jpg"))
            .and(matchers::header("referer", "https://m.dmzj.com/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0xff, 0xd8, 0xff])
                    .insert_header("content-type", "image/jpeg"),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let res = get(router(dir.path(), &upstream.uri()), "/webpic/1/cover.jpg?w=100").await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "image/jpeg");
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &[0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_proxy_relays_upstream_status() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&upstream)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let res = get(router(dir.path(), &upstream.uri()), "/webpic/missing.png").await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_proxy_unreachable_upstream_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let res = get(router(dir.path(), "http://127.0.0.1:9"), "/webpic/1.jpg").await;

        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_serves_snapshot_from_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.json"), r#"[{"id":1}]"#).unwrap();

        let res = get(router(dir.path(), "http://127.0.0.1:9"), "/data.json").await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"[{"id":1}]"#);
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let res = get(router(dir.path(), "http://127.0.0.1:9"), "/health").await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[test]
    fn test_builder_requires_image_service() {
        assert!(ServerBuilder::new().with_public_dir("public").build().is_err());
    }
}
