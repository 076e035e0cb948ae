use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub(crate) type Result<T, E = GyaoError> = core::result::Result<T, E>;

/// Crate specific error types.
///
/// A well-formed "nothing there" answer (unreleased episode, no matching stream variant) is never
/// an error, functions return [`None`] for these.
#[derive(Clone, Debug)]
pub enum GyaoError {
    /// The given url does not point to a GYAO! episode or title page.
    MalformedUrl(GyaoErrorContext),
    /// The page does not contain the `data-endpoint-url` of its series.
    EndpointNotFound(GyaoErrorContext),
    /// The internal video id of the requested page could not be determined.
    IdentifierNotFound(GyaoErrorContext),
    /// The series listing does not contain the requested episode.
    EpisodeNotFound(GyaoErrorContext),
    /// The series listing contains no episodes at all.
    EmptyCatalog(GyaoErrorContext),

    /// The api answered with an unexpected content type or json structure. This usually means
    /// that GYAO! or Brightcove changed parts of their (undocumented) api.
    Schema(GyaoErrorContext),

    /// An upstream server answered with `404 Not Found`.
    UpstreamNotFound(GyaoErrorContext),
    /// An upstream server answered with any other non-success status.
    Upstream(GyaoErrorContext),
    /// Some sort of error occurred while sending a request or reading its response.
    Request(GyaoErrorContext),

    /// The external download tool is missing or failed.
    ExternalTool(GyaoErrorContext),

    /// Error was caused by something library internal, e.g. the http client could not be built.
    Internal(GyaoErrorContext),
}

impl GyaoError {
    /// Stable name of the error kind. Used to classify errors in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GyaoError::MalformedUrl(_) => "malformed_url",
            GyaoError::EndpointNotFound(_) => "endpoint_not_found",
            GyaoError::IdentifierNotFound(_) => "identifier_not_found",
            GyaoError::EpisodeNotFound(_) => "episode_not_found",
            GyaoError::EmptyCatalog(_) => "empty_catalog",
            GyaoError::Schema(_) => "schema",
            GyaoError::UpstreamNotFound(_) => "upstream_not_found",
            GyaoError::Upstream(_) => "upstream",
            GyaoError::Request(_) => "request",
            GyaoError::ExternalTool(_) => "external_tool",
            GyaoError::Internal(_) => "internal",
        }
    }

    pub fn context(&self) -> &GyaoErrorContext {
        match self {
            GyaoError::MalformedUrl(context)
            | GyaoError::EndpointNotFound(context)
            | GyaoError::IdentifierNotFound(context)
            | GyaoError::EpisodeNotFound(context)
            | GyaoError::EmptyCatalog(context)
            | GyaoError::Schema(context)
            | GyaoError::UpstreamNotFound(context)
            | GyaoError::Upstream(context)
            | GyaoError::Request(context)
            | GyaoError::ExternalTool(context)
            | GyaoError::Internal(context) => context,
        }
    }
}

impl Display for GyaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.context())
    }
}

impl Error for GyaoError {}

impl From<serde_json::Error> for GyaoError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema(GyaoErrorContext::new(err.to_string()))
    }
}

impl From<reqwest::Error> for GyaoError {
    fn from(err: reqwest::Error) -> Self {
        let mut context = GyaoErrorContext::new(err.to_string());
        if let Some(url) = err.url() {
            context = context.with_url(url.clone());
        }

        if err.is_status() {
            if err.status() == Some(http::StatusCode::NOT_FOUND) {
                GyaoError::UpstreamNotFound(context)
            } else {
                GyaoError::Upstream(context)
            }
        } else if err.is_request()
            || err.is_redirect()
            || err.is_timeout()
            || err.is_connect()
            || err.is_body()
        {
            GyaoError::Request(context)
        } else if err.is_decode() {
            GyaoError::Schema(context)
        } else if err.is_builder() {
            GyaoError::Internal(context)
        } else {
            GyaoError::Request(GyaoErrorContext::new(format!(
                "Could not determine request error type - {}",
                err
            )))
        }
    }
}

impl From<std::io::Error> for GyaoError {
    fn from(err: std::io::Error) -> Self {
        GyaoError::ExternalTool(GyaoErrorContext::new(err.to_string()))
    }
}

/// Information about a [`GyaoError`].
#[derive(Clone, Debug)]
pub struct GyaoErrorContext {
    pub message: String,
    pub url: Option<String>,
    pub value: Option<String>,
}

impl Display for GyaoErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut res = self.message.clone();

        if let Some(url) = &self.url {
            res.push_str(&format!(" ({})", url));
        }
        if let Some(value) = &self.value {
            res.push_str(&format!(": {}", value));
        }

        write!(f, "{}", res)
    }
}

impl From<String> for GyaoErrorContext {
    fn from(string: String) -> Self {
        GyaoErrorContext::new(string)
    }
}

impl From<&str> for GyaoErrorContext {
    fn from(str: &str) -> Self {
        GyaoErrorContext::new(str)
    }
}

impl GyaoErrorContext {
    pub(crate) fn new<S: ToString>(message: S) -> Self {
        Self {
            message: message.to_string(),
            url: None,
            value: None,
        }
    }

    pub(crate) fn with_url<S: AsRef<str>>(mut self, url: S) -> Self {
        self.url = Some(url.as_ref().to_string());

        self
    }

    pub(crate) fn with_value(mut self, value: &[u8]) -> Self {
        // huge html error pages or json listings are not helpful in a single log line
        let displayable = std::str::from_utf8(value).unwrap_or("-- not displayable --");
        self.value = Some(match displayable.char_indices().nth(256) {
            Some((end, _)) => format!("{}...", &displayable[..end]),
            None => displayable.to_string(),
        });

        self
    }
}

/// GraphQL answers errors with status 200 and an `errors` array instead of (or next to) `data`.
pub(crate) fn is_graphql_error(value: &Value) -> Result<()> {
    #[derive(Debug, Deserialize)]
    struct GraphQLErrorMessage {
        message: String,
    }
    #[derive(Debug, Deserialize)]
    struct GraphQLErrors {
        errors: Vec<GraphQLErrorMessage>,
        #[serde(default)]
        data: Option<Value>,
    }

    if let Ok(err) = serde_json::from_value::<GraphQLErrors>(value.clone()) {
        if err.data.map_or(true, |data| data.is_null()) && !err.errors.is_empty() {
            let details = err
                .errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<String>>();
            return Err(GyaoError::Schema(
                format!("GraphQL request failed - {}", details.join(", ")).into(),
            ));
        }
    }
    Ok(())
}

/// Check the status of `resp` and read its body into a string, decoded with the charset the
/// server declared (utf-8 if none).
pub(crate) async fn check_html(url: String, resp: Response) -> Result<String> {
    check_status(&url, &resp)?;

    Ok(resp.text_with_charset("utf-8").await?)
}

/// Check status and content type of `resp` and decode its body as json.
pub(crate) async fn check_json<T: DeserializeOwned>(url: String, resp: Response) -> Result<T> {
    check_status(&url, &resp)?;

    let content_type = resp
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.contains("json") {
        return Err(GyaoError::Schema(
            GyaoErrorContext::new(format!("Unexpected Content-Type ({})", content_type))
                .with_url(&url),
        ));
    }

    let raw = resp.bytes().await?;

    let value: Value = serde_json::from_slice(raw.as_ref()).map_err(|e| {
        GyaoError::Schema(
            GyaoErrorContext::new(format!("{} at {}:{}", e, e.line(), e.column()))
                .with_url(&url)
                .with_value(raw.as_ref()),
        )
    })?;
    is_graphql_error(&value).map_err(|e| {
        if let GyaoError::Schema(context) = e {
            GyaoError::Schema(context.with_url(&url))
        } else {
            e
        }
    })?;
    serde_json::from_value::<T>(value).map_err(|e| {
        GyaoError::Schema(
            GyaoErrorContext::new(format!("{} at {}:{}", e, e.line(), e.column()))
                .with_url(&url)
                .with_value(raw.as_ref()),
        )
    })
}

fn check_status(url: &str, resp: &Response) -> Result<()> {
    let status = resp.status();

    if status == http::StatusCode::TOO_MANY_REQUESTS {
        let retry_secs = resp
            .headers()
            .get(http::header::RETRY_AFTER)
            .and_then(|retry_after| retry_after.to_str().ok())
            .and_then(|retry_after_secs| retry_after_secs.parse::<u32>().ok());

        return Err(GyaoError::Upstream(
            GyaoErrorContext::new(format!(
                "Rate limit detected. {}",
                retry_secs.map_or("Try again later".to_string(), |secs| format!(
                    "Try again in {} seconds",
                    secs
                ))
            ))
            .with_url(url),
        ));
    } else if status == http::StatusCode::NOT_FOUND {
        return Err(GyaoError::UpstreamNotFound(
            GyaoErrorContext::new("Resource not found").with_url(url),
        ));
    } else if status.is_client_error() {
        return Err(GyaoError::Upstream(
            GyaoErrorContext::new(format!("Unexpected client error ({})", status)).with_url(url),
        ));
    } else if status.is_server_error() {
        return Err(GyaoError::Upstream(
            GyaoErrorContext::new(format!("Server error detected ({})", status)).with_url(url),
        ));
    } else if !status.is_success() {
        return Err(GyaoError::Upstream(
            GyaoErrorContext::new(format!("Unexpected status ({})", status)).with_url(url),
        ));
    }

    Ok(())
}
