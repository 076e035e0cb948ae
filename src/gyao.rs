//! Builder and access to the [`Gyao`] struct which is required to make any request.

use crate::enum_values;
use crate::error::{GyaoError, GyaoErrorContext};
use crate::Result;
use reqwest::Client;
use std::sync::Arc;

pub(crate) const DEFAULT_SITE: &str = "https://gyao.yahoo.co.jp";
pub(crate) const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://gyao.yahoo.co.jp/apis/playback/graphql";
pub(crate) const DEFAULT_APP_ID: &str = "dj00aiZpPUNJeDh2cU1RazU3UCZzPWNvbnN1bWVyc2VjcmV0Jng9NTk-";
pub(crate) const DEFAULT_CLIENT_SPACE_ID: &str = "1183050133";
pub(crate) const DEFAULT_PLAYBACK_ENDPOINT: &str =
    "https://edge.api.brightcove.com/playback/v1/accounts";
pub(crate) const DEFAULT_ACCOUNT_ID: &str = "4235717419001";
pub(crate) const DEFAULT_POLICY_KEY: &str = concat!(
    "BCpkADawqM1O4pwi3SZ75b8DE1c2l78PZ418NByBa33h737r",
    "Wv6uhPJHYkaZ6xHINTj5oOqa0-zarOEvQ6e1EqKhBcCppkAU",
    "Wuo5QSKWVC4HZjY2z-Lo_ptwEK3hxfKuvZXkdNuyOM5nNSWy"
);

enum_values! {
    /// Client the GraphQL playback query claims to be.
    pub enum LogicaAgent {
        PcWeb = "PC_WEB"
    }
}

enum_values! {
    /// Operating system the GraphQL playback query claims to run on.
    pub enum Os {
        Unknown = "UNKNOWN"
    }
}

enum_values! {
    /// Device type the GraphQL playback query claims to run on.
    pub enum Device {
        Pc = "PC"
    }
}

/// Starting point of this whole library.
#[derive(Clone, Debug)]
pub struct Gyao {
    pub(crate) executor: Arc<Executor>,
}

impl Gyao {
    pub fn builder() -> GyaoBuilder {
        GyaoBuilder::default()
    }

    /// Return the (cloned) [`Client`] which is internally used to make requests.
    pub fn client(&self) -> Client {
        self.executor.client.clone()
    }

    /// The site base every page url must start with, e.g. `https://gyao.yahoo.co.jp`.
    pub fn site(&self) -> &str {
        &self.executor.config.site
    }
}

mod executor {
    use crate::error::{check_html, check_json};
    use crate::gyao::{Device, LogicaAgent, Os};
    use crate::Result;
    use reqwest::{Client, IntoUrl, RequestBuilder};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::sync::Arc;

    /// Endpoints and fixed identifiers of the apis the resolution pipeline talks to.
    #[derive(Clone, Debug, smart_default::SmartDefault)]
    pub(crate) struct ExecutorConfig {
        #[default(super::DEFAULT_SITE.to_string())]
        pub(crate) site: String,

        #[default(super::DEFAULT_GRAPHQL_ENDPOINT.to_string())]
        pub(crate) graphql_endpoint: String,
        #[default(super::DEFAULT_APP_ID.to_string())]
        pub(crate) app_id: String,
        #[default(super::DEFAULT_CLIENT_SPACE_ID.to_string())]
        pub(crate) client_space_id: String,
        pub(crate) logica_agent: LogicaAgent,
        pub(crate) os: Os,
        pub(crate) device: Device,

        #[default(super::DEFAULT_PLAYBACK_ENDPOINT.to_string())]
        pub(crate) playback_endpoint: String,
        #[default(super::DEFAULT_ACCOUNT_ID.to_string())]
        pub(crate) account_id: String,
        #[default(super::DEFAULT_POLICY_KEY.to_string())]
        pub(crate) policy_key: String,
    }

    /// Internal struct to execute all request with. Read-only once built, so it is shared between
    /// all requests via [`Arc`].
    #[derive(Debug)]
    pub struct Executor {
        pub(crate) client: Client,
        pub(crate) config: ExecutorConfig,
    }

    impl Executor {
        pub(crate) fn get<U: IntoUrl>(self: &Arc<Self>, url: U) -> ExecutorRequestBuilder {
            ExecutorRequestBuilder::new(self.client.get(url))
        }
    }

    pub(crate) struct ExecutorRequestBuilder {
        builder: RequestBuilder,
    }

    impl ExecutorRequestBuilder {
        pub(crate) fn new(builder: RequestBuilder) -> Self {
            Self { builder }
        }

        pub(crate) fn query<T: Serialize + ?Sized>(mut self, query: &T) -> ExecutorRequestBuilder {
            self.builder = self.builder.query(query);

            self
        }

        pub(crate) fn header<V: AsRef<str>>(
            mut self,
            name: http::header::HeaderName,
            value: V,
        ) -> ExecutorRequestBuilder {
            self.builder = self.builder.header(name, value.as_ref());

            self
        }

        /// Send the request and decode the json response into `T`.
        pub(crate) async fn request<T: DeserializeOwned>(self) -> Result<T> {
            let (client, req) = self.builder.build_split();
            let req = req?;
            let url = req.url().to_string();
            tracing::debug!(%url, "requesting json");

            let resp = client.execute(req).await?;
            check_json(url, resp).await
        }

        /// Send the request and return the response body as html / text.
        pub(crate) async fn request_html(self) -> Result<String> {
            let (client, req) = self.builder.build_split();
            let req = req?;
            let url = req.url().to_string();
            tracing::debug!(%url, "requesting html");

            let resp = client.execute(req).await?;
            check_html(url, resp).await
        }
    }
}

pub(crate) use executor::{Executor, ExecutorConfig};

/// A builder to construct a new [`Gyao`] instance. To create it, call [`Gyao::builder`].
///
/// All endpoints and identifiers default to the ones the GYAO! web player uses. They are only
/// configurable because GYAO! and Brightcove change them without notice (and for tests).
#[derive(Default)]
pub struct GyaoBuilder {
    client: Option<Client>,
    config: ExecutorConfig,
}

impl GyaoBuilder {
    /// Return a [`reqwest::ClientBuilder`] with the configuration used if no custom client is
    /// set via [`GyaoBuilder::client`].
    pub fn predefined_client_builder() -> reqwest::ClientBuilder {
        Client::builder()
            .https_only(true)
            .cookie_store(true)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36")
    }

    /// Set a custom client that will be used in all requests.
    pub fn client(mut self, client: Client) -> GyaoBuilder {
        self.client = Some(client);
        self
    }

    /// Set the site base (scheme and host, without trailing slash) page urls must start with.
    pub fn site<S: AsRef<str>>(mut self, site: S) -> GyaoBuilder {
        self.config.site = site.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Set the GraphQL endpoint which converts GYAO! video ids into delivery ids.
    pub fn graphql_endpoint<S: AsRef<str>>(mut self, endpoint: S) -> GyaoBuilder {
        self.config.graphql_endpoint = endpoint.as_ref().to_string();
        self
    }

    /// Set the `appId` query parameter sent to the GraphQL endpoint.
    pub fn app_id<S: AsRef<str>>(mut self, app_id: S) -> GyaoBuilder {
        self.config.app_id = app_id.as_ref().to_string();
        self
    }

    /// Set the `clientSpaceId` GraphQL variable.
    pub fn client_space_id<S: AsRef<str>>(mut self, client_space_id: S) -> GyaoBuilder {
        self.config.client_space_id = client_space_id.as_ref().to_string();
        self
    }

    pub fn logica_agent(mut self, logica_agent: LogicaAgent) -> GyaoBuilder {
        self.config.logica_agent = logica_agent;
        self
    }

    pub fn os(mut self, os: Os) -> GyaoBuilder {
        self.config.os = os;
        self
    }

    pub fn device(mut self, device: Device) -> GyaoBuilder {
        self.config.device = device;
        self
    }

    /// Set the Brightcove playback endpoint. The account id and delivery id are appended as
    /// `<endpoint>/<account id>/videos/<delivery id>`.
    pub fn playback_endpoint<S: AsRef<str>>(mut self, endpoint: S) -> GyaoBuilder {
        self.config.playback_endpoint = endpoint.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Set the Brightcove account id GYAO! videos are stored under.
    pub fn account_id<S: AsRef<str>>(mut self, account_id: S) -> GyaoBuilder {
        self.config.account_id = account_id.as_ref().to_string();
        self
    }

    /// Set the Brightcove policy key which is sent in the `Accept` header.
    pub fn policy_key<S: AsRef<str>>(mut self, policy_key: S) -> GyaoBuilder {
        self.config.policy_key = policy_key.as_ref().to_string();
        self
    }

    pub fn build(self) -> Result<Gyao> {
        let client = match self.client {
            Some(client) => client,
            None => GyaoBuilder::predefined_client_builder()
                .build()
                .map_err(|e| {
                    GyaoError::Internal(GyaoErrorContext::new(format!(
                        "failed to build http client: {}",
                        e
                    )))
                })?,
        };

        Ok(Gyao {
            executor: Arc::new(Executor {
                client,
                config: self.config,
            }),
        })
    }
}
