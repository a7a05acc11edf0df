use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating the news API base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a remote host would send the API key in the clear.
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    Insecure,
}

/// Validates the base URL requests are sent to.
///
/// The API key travels in the query string, so only `https://` is accepted,
/// except for loopback hosts where local stub servers run over plain HTTP.
///
/// The returned URL always ends in `/`, so endpoint names can be joined onto
/// it without dropping the last path segment (`.../v2` + `sources` becomes
/// `.../v2/sources`).
///
/// # Examples
///
/// ```
/// use topnews::util::validate_base_url;
///
/// let url = validate_base_url("https://newsapi.org/v2").unwrap();
/// assert_eq!(url.as_str(), "https://newsapi.org/v2/");
///
/// assert!(validate_base_url("http://newsapi.org/v2/").is_err());
/// assert!(validate_base_url("http://127.0.0.1:8080/").is_ok());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback_host(&url) => {
            tracing::warn!(host = ?url.host_str(), "Using plain HTTP news API base URL (loopback only)");
        }
        "http" => return Err(UrlValidationError::Insecure),
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
