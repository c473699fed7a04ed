//! Default [`Resolve`] implementation (§6): `file://` (and bare paths)
//! via `std::fs`, `http(s)://` via a blocking `reqwest` client when the
//! `http` feature is enabled.

use std::fs;
use tosca_core::resolve::{NotResolvable, Resolve};
use url::Url;

/// Resolves `file://` URLs (and plain filesystem paths) and, with the
/// `http` feature enabled, `http(s)://` URLs.
#[derive(Debug, Default)]
pub struct DefaultResolver;

impl Resolve for DefaultResolver {
    fn resolve(&self, reference: &str) -> Result<String, NotResolvable> {
        let url = Url::parse(reference).or_else(|_| Url::from_file_path(reference).map_err(|_| ()));

        match url {
            Ok(url) if url.scheme() == "file" => {
                let path = url.to_file_path().map_err(|_| NotResolvable::new(reference, "invalid file:// URL"))?;
                fs::read_to_string(&path).map_err(|e| NotResolvable::new(reference, e.to_string()))
            }
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => fetch_http(reference, &url),
            Ok(url) => Err(NotResolvable::new(reference, format!("unsupported scheme '{}'", url.scheme()))),
            Err(()) => fs::read_to_string(reference).map_err(|e| NotResolvable::new(reference, e.to_string())),
        }
    }
}

#[cfg(feature = "http")]
fn fetch_http(reference: &str, url: &Url) -> Result<String, NotResolvable> {
    reqwest::blocking::get(url.clone())
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(|resp| resp.text())
        .map_err(|e| NotResolvable::new(reference, e.to_string()))
}

#[cfg(not(feature = "http"))]
fn fetch_http(reference: &str, _url: &Url) -> Result<String, NotResolvable> {
    Err(NotResolvable::new(reference, "http(s) resolution requires the 'http' feature"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_scheme_is_rejected() {
        let resolver = DefaultResolver;
        let err = resolver.resolve("ftp://example.com/a.yaml");
        assert!(err.is_err());
    }
}
