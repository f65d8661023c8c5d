//! HTTP session with cookies imported from a browser export. The cookie
//! jar is populated once at construction; after that the client is only
//! ever read from.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Url};

use crate::error::{Error, Result};

/// Seam between the orchestrator and the network, so tests can feed
/// canned documents through the pipeline.
#[async_trait]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Debug)]
pub struct Session {
    client: Client,
}

impl Session {
    /// Build a session from a Netscape/Mozilla `cookies.txt` export.
    pub fn with_cookies(path: &Path) -> Result<Self> {
        let load_err = |reason: String| Error::CookieLoad {
            path: path.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let jar = Jar::default();
        for cookie in parse_cookie_file(&text).map_err(load_err)? {
            let scheme = if cookie.secure { "https" } else { "http" };
            let origin = format!("{}://{}/", scheme, cookie.domain.trim_start_matches('.'));
            let url: Url = origin.parse().map_err(|e| {
                load_err(format!("bad cookie domain {:?}: {}", cookie.domain, e))
            })?;
            jar.add_cookie_str(
                &format!(
                    "{}={}; Domain={}; Path={}",
                    cookie.name, cookie.value, cookie.domain, cookie.path
                ),
                &url,
            );
        }

        let client = Client::builder()
            .cookie_provider(Arc::new(jar))
            .build()
            .map_err(Error::Client)?;
        Ok(Session { client })
    }
}

#[async_trait]
impl Fetch for Session {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| Error::Request {
            url: url.to_string(),
            source: e,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status,
            });
        }
        response.text().await.map_err(|e| Error::Request {
            url: url.to_string(),
            source: e,
        })
    }
}

#[derive(Debug)]
struct CookieLine {
    domain: String,
    path: String,
    secure: bool,
    name: String,
    value: String,
}

/// Parse the tab-separated Netscape jar format. Comment and blank lines
/// are skipped; curl marks HttpOnly cookies with a `#HttpOnly_` prefix,
/// which is stripped rather than treated as a comment.
fn parse_cookie_file(text: &str) -> std::result::Result<Vec<CookieLine>, String> {
    let mut cookies = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.strip_prefix("#HttpOnly_").unwrap_or(raw);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        // domain, subdomain flag, path, secure, expiry, name, value
        let &[domain, _, path, secure, _, name, value] = fields.as_slice() else {
            return Err(format!(
                "malformed cookie line {} ({} fields, expected 7)",
                lineno + 1,
                fields.len()
            ));
        };
        cookies.push(CookieLine {
            domain: domain.to_string(),
            path: path.to_string(),
            secure: secure.eq_ignore_ascii_case("TRUE"),
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(cookies)
}
