use std::time::Duration;

/// Shared client for every upstream request. One pool serves all sync workers
/// and the image proxy, so keep plenty of idle connections per host.
pub fn build_client(
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(256)
        .http1_only()
        .build()
}
