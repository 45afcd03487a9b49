use axum::{
    body::Body,
    extract::Extension,
    http::{Response, StatusCode, Uri, header},
    response::IntoResponse,
};

use crate::{
    domain::services::image::ImageService,
    infrastructure::domain::repositories::image::ImageRepositoryImpl,
};

/// Relays `/webpic/...` to the image host. Upstream status, content type and
/// body are passed through untouched.
pub async fn proxy_image(
    uri: Uri,
    Extension(svc): Extension<ImageService<ImageRepositoryImpl>>,
) -> Result<impl IntoResponse, StatusCode> {
    let image = svc.fetch_image(uri.path()).await.map_err(|e| {
        error!("failed to proxy {}: {e}", uri.path());
        StatusCode::BAD_GATEWAY
    })?;

    let mut res = Response::builder().status(image.status);
    if let Some(content_type) = image.content_type {
        res = res.header(header::CONTENT_TYPE, content_type);
    }

    res.body(Body::from(image.data))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
