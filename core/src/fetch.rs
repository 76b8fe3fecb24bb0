//! Remote fetcher — query URL construction and blocking JSON GETs.

use crate::{
    error::{ReportError, ReportResult},
    types::ParamMap,
};
use reqwest::{blocking::Client, header};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const USER_AGENT: &str = "Tkinter-Report/1.0";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Whether outbound requests validate the server certificate.
///
/// `Skip` accepts any certificate (expired, self-signed, wrong host).
/// It exists for internal endpoints and is not a security feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVerification {
    Verify,
    Skip,
}

impl TlsVerification {
    pub fn from_verify_flag(verify: bool) -> Self {
        if verify { Self::Verify } else { Self::Skip }
    }

    pub fn verifies(self) -> bool {
        self == Self::Verify
    }
}

/// Anything that can turn a URL into a parsed JSON document.
/// The pager only depends on this seam.
pub trait JsonSource {
    fn fetch_json(&self, url: &str) -> ReportResult<Value>;
}

/// Replace the query component of `base_url` with `params`.
/// Entries with an empty value are dropped rather than sent.
pub fn build_query_url(base_url: &str, params: &ParamMap) -> ReportResult<String> {
    let mut url = Url::parse(base_url)?;
    url.set_query(None);

    let mut kept = params.iter().filter(|(_, v)| !v.is_empty()).peekable();
    if kept.peek().is_some() {
        url.query_pairs_mut().extend_pairs(kept);
    }
    Ok(url.into())
}

/// Blocking HTTP client with the fixed user agent and timeout.
pub struct HttpFetcher {
    http: Client,
    tls: TlsVerification,
}

impl HttpFetcher {
    pub fn new(tls: TlsVerification) -> ReportResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .danger_accept_invalid_certs(!tls.verifies())
            .build()
            .map_err(|source| ReportError::Network { url: String::new(), source })?;

        if !tls.verifies() {
            log::warn!("fetch: TLS certificate verification is disabled");
        }
        Ok(Self { http, tls })
    }

    pub fn tls(&self) -> TlsVerification {
        self.tls
    }
}

impl JsonSource for HttpFetcher {
    fn fetch_json(&self, url: &str) -> ReportResult<Value> {
        let network = |source| ReportError::Network { url: url.to_string(), source };

        let response = self.http.get(url).send().map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().map_err(network)?;
        log::debug!("fetch: {} bytes from {url}", body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

/// One-shot convenience: fetch and parse a single URL.
pub fn fetch_json(url: &str, tls: TlsVerification) -> ReportResult<Value> {
    HttpFetcher::new(tls)?.fetch_json(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn decoded_query(url: &str) -> BTreeMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn existing_query_is_replaced_and_empty_values_dropped() {
        let params = ParamMap::from([
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), String::new()),
        ]);
        let url = build_query_url("https://x/y?old=1", &params).unwrap();
        assert_eq!(
            decoded_query(&url),
            BTreeMap::from([("a".to_string(), "1".to_string())])
        );
        assert!(url.starts_with("https://x/y?"));
    }

    #[test]
    fn values_are_percent_encoded() {
        let params = ParamMap::from([("status".to_string(), "a b&c=d".to_string())]);
        let url = build_query_url("https://host/api/", &params).unwrap();
        assert!(!url.contains("a b&c=d"));
        assert_eq!(decoded_query(&url)["status"], "a b&c=d");
    }

    #[test]
    fn no_params_leaves_no_query() {
        let url = build_query_url("https://host/api/?page=3", &ParamMap::new()).unwrap();
        assert_eq!(url, "https://host/api/");
    }

    #[test]
    fn unparsable_base_url_is_rejected() {
        assert!(matches!(
            build_query_url("not a url", &ParamMap::new()),
            Err(ReportError::InvalidUrl(_))
        ));
    }
}
