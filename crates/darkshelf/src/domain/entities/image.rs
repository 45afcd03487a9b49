use bytes::Bytes;

/// Upstream image response, relayed to the client as is
pub struct Image {
    pub status: u16,
    pub content_type: Option<String>,
    pub data: Bytes,
}
