//! reqwest-backed request executor
//!
//! One `reqwest::blocking::Client` is built before the workers start and is
//! shared by all of them: its connection pool and optional cookie jar are
//! internally synchronized.

use super::{HttpConfig, HttpResponse, RequestExecutor};
use crate::error::{error_chain, ConfigError, RequestError};
use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::redirect::Policy;
use reqwest::{Proxy, Url};
use std::sync::Arc;
use tracing::debug;

/// Executes GET requests with a shared blocking client
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Build the shared client for `config`
    ///
    /// `target` scopes the static cookies when the cookie jar is enabled.
    pub fn new(config: &HttpConfig, target: &Url) -> Result<Self, ConfigError> {
        let client_err = |e: reqwest::Error| ConfigError::HttpClient {
            reason: error_chain(&e),
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            headers.append(name.clone(), value.clone());
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none());

        if let Some(address) = &config.socks5 {
            let proxy = Proxy::all(format!("socks5://{}", address)).map_err(client_err)?;
            builder = builder.proxy(proxy);
            debug!(proxy = %address, "Routing requests through SOCKS5 proxy");
        } else {
            builder = builder.no_proxy();
        }

        if config.use_cookie_jar {
            let jar = Arc::new(Jar::default());
            for cookie in &config.cookies {
                jar.add_cookie_str(&cookie.to_string(), target);
            }
            builder = builder.cookie_provider(jar);
        } else if !config.cookies.is_empty() {
            let joined = config
                .cookies
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&joined).map_err(|_| ConfigError::InvalidCookie {
                raw: joined.clone(),
            })?;
            headers.insert(COOKIE, value);
        }

        let client = builder
            .default_headers(headers)
            .build()
            .map_err(client_err)?;

        Ok(Self { client })
    }
}

impl RequestExecutor for HttpExecutor {
    fn execute(&self, url: &Url) -> Result<HttpResponse, RequestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| classify(url, &e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();

        // Drain the body so the connection goes back to the pool
        let body = response.bytes().map_err(|e| classify(url, &e))?;

        Ok(HttpResponse {
            status,
            headers,
            content_length: body.len() as u64,
        })
    }
}

fn classify(url: &Url, err: &reqwest::Error) -> RequestError {
    let url = url.to_string();
    let reason = error_chain(err);

    if err.is_timeout() {
        RequestError::Timeout { url, reason }
    } else if err.is_connect() {
        RequestError::Connect { url, reason }
    } else {
        RequestError::Transport { url, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Cookie;
    use reqwest::header::HeaderName;

    fn target() -> Url {
        Url::parse("http://127.0.0.1:8080/").unwrap()
    }

    #[test]
    fn test_build_default_client() {
        assert!(HttpExecutor::new(&HttpConfig::default(), &target()).is_ok());
    }

    #[test]
    fn test_build_with_everything() {
        let config = HttpConfig {
            socks5: Some("127.0.0.1:9050".into()),
            cookies: vec![Cookie {
                name: "session".into(),
                value: "abc".into(),
            }],
            headers: vec![(
                HeaderName::from_static("x-test"),
                HeaderValue::from_static("1"),
            )],
            use_cookie_jar: true,
            ..HttpConfig::default()
        };
        assert!(HttpExecutor::new(&config, &target()).is_ok());
    }

    #[test]
    fn test_connection_refused_is_reported() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = Url::parse(&format!("http://127.0.0.1:{}/home", port)).unwrap();
        let executor = HttpExecutor::new(&HttpConfig::default(), &url).unwrap();

        let err = executor.execute(&url).unwrap_err();
        assert_eq!(err.url(), url.as_str());
        assert!(err.to_string().contains("failed to perform request"));
    }
}
