//! Availability of routes
//!
//! The OpenShift router answers with a placeholder page until the route has backends.

use std::time::Duration;

use async_trait::async_trait;
use snafu::{ResultExt, Snafu};
use strum::{EnumDiscriminants, IntoStaticStr};

use super::wait::{self, wait_for};

/// Status code of the router placeholder page
const ROUTER_NOT_READY_STATUS: u16 = 503;

const ROUTER_NOT_READY_MESSAGE: &str = "The application is currently not serving requests at this endpoint. It may not have been started or is still starting.";

pub const ROUTER_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Snafu, Debug, EnumDiscriminants)]
#[strum_discriminants(derive(IntoStaticStr))]
pub enum Error {
    #[snafu(display("failed to build the HTTP client"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("failed to request {url}"))]
    Request { source: reqwest::Error, url: String },

    #[snafu(display("route {url} does not serve requests"))]
    WaitForRouter { source: wait::Error, url: String },
}

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// The response is the placeholder page of the router
    pub fn is_router_placeholder(&self) -> bool {
        self.status == ROUTER_NOT_READY_STATUS && self.body.contains(ROUTER_NOT_READY_MESSAGE)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by reqwest
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            // Routes of test clusters are secured with self-signed certificates.
            .danger_accept_invalid_certs(true)
            .build()
            .context(BuildHttpClientSnafu)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context(RequestSnafu { url })?;
        let status = response.status().as_u16();
        let body = response.text().await.context(RequestSnafu { url })?;

        Ok(HttpResponse { status, body })
    }
}

/// Waits until the router forwards requests for the given URL to the application
pub async fn wait_for_router(client: &dyn HttpClient, url: &str, timeout: Duration) -> Result<()> {
    tracing::info!(url, "Waiting for router to expose url");

    wait_for(
        &format!("router to expose {url}"),
        timeout,
        ROUTER_POLL_INTERVAL,
        move || async move {
            let response = client.get(url).await?;
            Ok::<_, Error>((!response.is_router_placeholder()).then_some(()))
        },
    )
    .await
    .context(WaitForRouterSnafu { url })
}
