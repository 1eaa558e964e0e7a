//! Http plumbing. Everything here ends in an [crate::envelope::Response], conversion happens in
//! [crate::end_point].
use std::time::Duration;

use gw2_core::config::ClientConfig;
use time::format_description::well_known::Rfc2822;

use crate::end_point::{EndPoint, Repository};
use crate::envelope::Response;
use crate::prelude::*;

pub type HttpClient = ureq::Agent;

#[derive(Debug, Diagnostic, Error)]
pub enum ApiError {
    #[error("invalid request url for path {path}")]
    #[diagnostic(code(api_error::url))]
    Url {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("http transport failed for {url}")]
    #[diagnostic(code(api_error::transport))]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("server answered {status} for {url}: {text}")]
    #[diagnostic(code(api_error::status))]
    Status {
        url: String,
        status: u16,
        text: String,
    },
    #[error("failed to read response body of {url}")]
    #[diagnostic(code(api_error::body))]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("response body of {url} is not json")]
    #[diagnostic(code(api_error::json))]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),
}

/// path relative to the base url + query pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: vec![],
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sends one request and decodes the reply into a [Response].
/// Implemented by [UreqTransport], and by canned transports in tests.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, ApiError>;
}

pub struct UreqTransport {
    agent: HttpClient,
    base_url: Url,
    api_key: Option<String>,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build();
        Self {
            agent,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, request: &Request) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|source| ApiError::Url {
                path: request.path.clone(),
                source,
            })?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &Request) -> Result<Response, ApiError> {
        let url = self.url(request)?;
        let mut http_request = self.agent.get(url.as_str());
        if let Some(api_key) = &self.api_key {
            http_request = http_request.set("Authorization", &format!("Bearer {api_key}"));
        }
        debug!(%url, "sending request");
        let http_response = match http_request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(ApiError::Status {
                    url: url.to_string(),
                    status,
                    text: error_text(&body),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport {
                    url: url.to_string(),
                    source: Box::new(transport),
                })
            }
        };
        let headers: Vec<(String, String)> = http_response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                let value = http_response.header(&name)?.to_string();
                Some((name, value))
            })
            .collect();
        let body = http_response.into_string().map_err(|source| ApiError::Body {
            url: url.to_string(),
            source,
        })?;
        decode_response(url.as_str(), headers, &body)
    }
}

/// The api explains errors as `{"text": "..."}`
fn error_text(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("text").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// HTTP dates look like `Tue, 15 Nov 1994 08:12:31 GMT`. rfc 2822 with a numeric zone is what
/// the parser is guaranteed to accept, so the zone name is swapped for its offset.
pub fn parse_http_date(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    let normalized = match value.strip_suffix("GMT").or_else(|| value.strip_suffix("UTC")) {
        Some(prefix) => format!("{}+0000", prefix),
        None => value.to_string(),
    };
    OffsetDateTime::parse(&normalized, &Rfc2822).ok()
}

/// Builds a [Response] out of raw headers and body.
///
/// - `X-*` headers go into the extension data
/// - `Content-Language` is the culture
/// - `Date` / `Last-Modified` are parsed when they can be
/// - an empty body is absent content
pub fn decode_response(
    url: &str,
    headers: impl IntoIterator<Item = (String, String)>,
    body: &str,
) -> Result<Response, ApiError> {
    let content = if body.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(body).map_err(|source| ApiError::Json {
            url: url.to_string(),
            source,
        })?)
    };
    let mut response = Response::new(content);
    for (name, value) in headers {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "content-language" => {
                let value = value.trim();
                if !value.is_empty() {
                    response.culture = Some(Locale::new(value));
                }
            }
            "date" => response.date = parse_http_date(&value),
            "last-modified" => response.last_modified = parse_http_date(&value),
            _ if lower.starts_with("x-") => response.extension_data.insert(&name, value),
            _ => {}
        }
    }
    Ok(response)
}

/// Entry point of the crate
pub struct Gw2Client<T = UreqTransport> {
    transport: T,
    config: ClientConfig,
}

impl Gw2Client<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(&config);
        Self { transport, config }
    }
}

impl<T: Transport> Gw2Client<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// the configured language, if any
    pub fn locale(&self) -> Option<Locale> {
        self.config.locale.clone().map(Locale::from)
    }

    pub fn send(&self, request: &Request) -> Result<Response, ApiError> {
        let span = debug_span!("request", path = request.path.as_str());
        let _guard = span.enter();
        self.transport.send(request)
    }

    pub fn repository<E: EndPoint>(&self) -> Repository<'_, E, T> {
        Repository::new(self)
    }

    pub fn items(&self) -> Repository<'_, crate::end_point::items::Items, T> {
        self.repository()
    }
    pub fn recipes(&self) -> Repository<'_, crate::end_point::recipes::Recipes, T> {
        self.repository()
    }
    pub fn skins(&self) -> Repository<'_, crate::end_point::skins::Skins, T> {
        self.repository()
    }
    pub fn quaggans(&self) -> Repository<'_, crate::end_point::quaggans::Quaggans, T> {
        self.repository()
    }
    pub fn files(&self) -> Repository<'_, crate::end_point::files::Files, T> {
        self.repository()
    }
    pub fn colors(&self) -> Repository<'_, crate::end_point::colors::Colors, T> {
        self.repository()
    }
    pub fn worlds(&self) -> Repository<'_, crate::end_point::worlds::Worlds, T> {
        self.repository()
    }
    pub fn minis(&self) -> Repository<'_, crate::end_point::minis::Minis, T> {
        self.repository()
    }
}
