mod http;
#[cfg(feature = "memory")]
mod memory;

use medrec_api::prelude::{BearerToken, Record, RecordId, ResourceKind};

pub use self::http::HttpClient;
#[cfg(feature = "memory")]
#[cfg_attr(docsrs, doc(cfg(feature = "memory")))]
pub use self::memory::{ClientCall, MemoryClient};
use crate::errors::ClientResult;

/// Trait for implementing a medrec client.
///
/// This is used so the library can expose also an in-memory client for tests.
///
/// If you're looking for the REST API client, see [`HttpClient`].
pub trait Client {
    /// Fetches the whole collection of the given kind.
    fn list(&self, kind: ResourceKind) -> impl Future<Output = ClientResult<Vec<Record>>>;

    /// Fetches a single record.
    fn get(&self, kind: ResourceKind, id: RecordId) -> impl Future<Output = ClientResult<Record>>;

    /// Creates a record and returns it as stored by the API.
    fn create(
        &self,
        kind: ResourceKind,
        data: Record,
        token: &BearerToken,
    ) -> impl Future<Output = ClientResult<Record>>;

    /// Updates the given fields of a record and returns the updated record.
    fn update(
        &self,
        kind: ResourceKind,
        id: RecordId,
        data: Record,
        token: &BearerToken,
    ) -> impl Future<Output = ClientResult<Record>>;

    /// Deletes a single record.
    fn delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        token: &BearerToken,
    ) -> impl Future<Output = ClientResult<()>>;
}
