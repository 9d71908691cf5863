//! Reading overlay documents from files, buffers or HTTP.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::normalize::{Error, Normalized, Normalizer};

pub fn from_reader<R: Read>(reader: R, normalizer: &Normalizer) -> Result<Normalized, Error> {
    let raw: Value = serde_json::from_reader(reader)?;
    normalizer.normalize(&raw)
}

pub fn from_slice(bytes: &[u8], normalizer: &Normalizer) -> Result<Normalized, Error> {
    let raw: Value = serde_json::from_slice(bytes)?;
    normalizer.normalize(&raw)
}

pub fn from_path(path: impl AsRef<Path>, normalizer: &Normalizer) -> Result<Normalized, Error> {
    let path = path.as_ref();
    log::info!("Loading GIS data: {}", path.display());
    let file = File::open(path)?;
    from_reader(BufReader::new(file), normalizer)
}

#[cfg(feature = "fetch")]
pub const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Fetches the whole document with a GET request. The response content type
/// is not checked.
#[cfg(feature = "fetch")]
pub fn from_url(url: &str, normalizer: &Normalizer) -> Result<Normalized, Error> {
    log::info!("Loading GIS data: {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus(status.as_u16()));
    }
    let bytes = response.bytes()?;
    from_slice(&bytes, normalizer)
}

pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
