//! Request URL construction from path segments and query parameters.

use url::Url;

use crate::error::{Result, StatusError};

/// Builds a request URL by appending path segments and query parameters to a
/// base URL.
///
/// Segments are appended individually so separators inside a segment (a
/// branch name containing `/`, for example) are percent-encoded rather than
/// interpreted as path structure.
///
/// # Errors
///
/// Returns `StatusError::InvalidUrl` if the base URL cannot carry path
/// segments (a cannot-be-a-base URL such as `mailto:`).
pub fn build_url(base: &Url, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|()| StatusError::invalid_url(format!("cannot extend path of {base}")))?
        .pop_if_empty()
        .extend(segments);

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    Ok(url)
}
