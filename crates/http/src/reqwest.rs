// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{str::FromStr, sync::Arc};

use futures_util::FutureExt as _;
use headers::{ContentLength, HeaderMapExt as _};
use hyper_util::client::legacy::connect::dns::{GaiResolver, Name};
use rustls_platform_verifier::ConfigVerifierExt;
use tokio::time::Instant;
use tower::{BoxError, Service as _};
use tracing::Instrument;

/// The user agent sent with every request to the identity provider
pub static USER_AGENT: &str = concat!("pkce-demo/", env!("CARGO_PKG_VERSION"));

struct TracingResolver {
    inner: GaiResolver,
}

impl TracingResolver {
    fn new() -> Self {
        let inner = GaiResolver::new();
        Self { inner }
    }
}

impl reqwest::dns::Resolve for TracingResolver {
    fn resolve(&self, name: reqwest::dns::Name) -> reqwest::dns::Resolving {
        let span = tracing::info_span!("dns.resolve", name = name.as_str());
        let inner = &mut self.inner.clone();
        let name = match Name::from_str(name.as_str()) {
            Ok(name) => name,
            Err(err) => {
                let err: BoxError = Box::new(err);
                return Box::pin(futures_util::future::ready(Err(err)));
            }
        };

        Box::pin(
            inner
                .call(name)
                .map(|result| {
                    result
                        .map(|addrs| -> reqwest::dns::Addrs { Box::new(addrs) })
                        .map_err(|err| -> BoxError { Box::new(err) })
                })
                .instrument(span),
        )
    }
}

/// Create a new [`reqwest::Client`] to talk to the identity provider
///
/// Requests made with this client have no timeout: a stalled provider stalls
/// the flow waiting on it.
///
/// # Panics
///
/// Panics if the client fails to build, which should never happen
#[must_use]
pub fn client() -> reqwest::Client {
    // The explicit typing here is because `use_preconfigured_tls` accepts
    // `Any`, but wants a `ClientConfig` under the hood. This helps us detect
    // breaking changes in the rustls-platform-verifier API.
    let tls_config: rustls::ClientConfig =
        rustls::ClientConfig::with_platform_verifier().expect("failed to create TLS config");

    reqwest::Client::builder()
        .dns_resolver(Arc::new(TracingResolver::new()))
        .use_preconfigured_tls(tls_config)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to create HTTP client")
}

async fn send_traced(
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let start = Instant::now();
    let (client, request) = request.build_split();
    let request = request?;

    let server_address = request.url().host_str().map(ToOwned::to_owned);
    let server_port = request.url().port_or_known_default();
    let content_length = request.headers().typed_get().map(|ContentLength(len)| len);
    let method = request.method().to_string();

    // The query string may carry an authorization code, so only the path is
    // recorded
    let span = tracing::info_span!(
        "http.client.request",
        "http.request.method" = method,
        "url.path" = request.url().path(),
        "server.address" = server_address,
        "server.port" = server_port,
        "http.request.body.size" = content_length,
        "http.response.status_code" = tracing::field::Empty,
        "http.response.body.size" = tracing::field::Empty,
        "http.client.duration_ms" = tracing::field::Empty,
        "rust.error" = tracing::field::Empty,
    );

    async move {
        let span = tracing::Span::current();
        let result = client.execute(request).await;

        let duration: u64 = start.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        span.record("http.client.duration_ms", duration);

        match &result {
            Ok(response) => {
                span.record("http.response.status_code", response.status().as_u16());

                if let Some(ContentLength(content_length)) = response.headers().typed_get() {
                    span.record("http.response.body.size", content_length);
                }

                tracing::debug!(status = %response.status(), "Received response");
            }
            Err(err) => {
                span.record("rust.error", err as &dyn std::error::Error);
                tracing::debug!(
                    error = err as &dyn std::error::Error,
                    "Request failed without a response"
                );
            }
        }

        result
    }
    .instrument(span)
    .await
}

/// An extension trait implemented for [`reqwest::RequestBuilder`] to send a
/// request within a tracing span.
pub trait RequestBuilderExt {
    /// Send the request within a tracing span.
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send;
}

impl RequestBuilderExt for reqwest::RequestBuilder {
    fn send_traced(self) -> impl Future<Output = Result<reqwest::Response, reqwest::Error>> + Send {
        send_traced(self)
    }
}
