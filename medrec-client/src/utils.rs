use medrec_api::prelude::{RecordId, ResourceKind};
use url::Url;

use crate::errors::ClientResult;

/// Given a resource kind and an optional record id, returns the relative path of the route,
/// e.g. `doctors` or `doctors/7`.
#[inline]
pub fn resource_path(kind: ResourceKind, id: Option<RecordId>) -> String {
    match id {
        Some(id) => format!("{kind}/{id}"),
        None => kind.to_string(),
    }
}

/// Parses the base endpoint, making sure it ends with a `/` so relative routes are appended
/// to it instead of replacing its last segment.
pub fn normalize_base_url(base_url: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
