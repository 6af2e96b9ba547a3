//! This module exposes the client which talks to the medical-records REST API over HTTP.

use medrec_api::prelude::{
    BearerToken, Record, RecordId, ResourceKind, Session, validate_login, validate_patch,
    validate_record,
};
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::utils::{normalize_base_url, resource_path};

/// Client to interact with the medical-records REST API.
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpClient {
    /// Creates a new client from the given [`ClientConfig`].
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let base_url = normalize_base_url(&config.base_url)?;
        let mut builder = reqwest::Client::builder().timeout(config.timeout());
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Returns the base endpoint of the API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Logs in with the given credentials and returns the issued [`Session`].
    ///
    /// Malformed credentials are rejected with [`ClientError::InvalidInput`] before sending.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        validate_login(email, password)?;
        let url = self.base_url.join("login")?;
        let request = self
            .http
            .post(url)
            .json(&LoginRequest { email, password });
        let session: Session = self.send(request, None).await?;
        tracing::info!(email, "logged in");
        Ok(session)
    }

    /// Returns the URL of the given collection or record route.
    fn endpoint(&self, kind: ResourceKind, id: Option<RecordId>) -> ClientResult<Url> {
        Ok(self.base_url.join(&resource_path(kind, id))?)
    }

    fn request(
        &self,
        method: Method,
        kind: ResourceKind,
        id: Option<RecordId>,
        token: Option<&BearerToken>,
    ) -> ClientResult<RequestBuilder> {
        let request = self
            .http
            .request(method, self.endpoint(kind, id)?)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match token {
            Some(token) => Ok(request.bearer_auth(token.usable()?.as_str())),
            None => Ok(request),
        }
    }

    /// Sends the request and decodes the JSON body of a 2xx response.
    ///
    /// `target` is the record addressed by the request, used to report [`ClientError::NotFound`].
    async fn send<R>(
        &self,
        request: RequestBuilder,
        target: Option<(ResourceKind, RecordId)>,
    ) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let body = self.send_raw(request, target).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_raw(
        &self,
        request: RequestBuilder,
        target: Option<(ResourceKind, RecordId)>,
    ) -> ClientResult<Vec<u8>> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            return Ok(body.to_vec());
        }

        let err = ClientError::from_response(
            status.as_u16(),
            &String::from_utf8_lossy(&body),
            target,
        );
        tracing::debug!(status = status.as_u16(), "request failed: {err}");
        Err(err)
    }
}

impl Client for HttpClient {
    async fn list(&self, kind: ResourceKind) -> ClientResult<Vec<Record>> {
        let request = self.request(Method::GET, kind, None, None)?;
        self.send(request, None).await
    }

    async fn get(&self, kind: ResourceKind, id: RecordId) -> ClientResult<Record> {
        let request = self.request(Method::GET, kind, Some(id), None)?;
        self.send(request, Some((kind, id))).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        data: Record,
        token: &BearerToken,
    ) -> ClientResult<Record> {
        validate_record(kind, &data)?;
        let request = self
            .request(Method::POST, kind, None, Some(token))?
            .json(&data);
        let record: Record = self.send(request, None).await?;
        tracing::info!(%kind, id = ?record.id(), "record created");
        Ok(record)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: RecordId,
        data: Record,
        token: &BearerToken,
    ) -> ClientResult<Record> {
        validate_patch(kind, &data)?;
        let request = self
            .request(Method::PATCH, kind, Some(id), Some(token))?
            .json(&data);
        let record = self.send(request, Some((kind, id))).await?;
        tracing::info!(%kind, id, "record updated");
        Ok(record)
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        id: RecordId,
        token: &BearerToken,
    ) -> ClientResult<()> {
        let request = self.request(Method::DELETE, kind, Some(id), Some(token))?;
        // the API answers either with an empty body or with the deleted record
        self.send_raw(request, Some((kind, id))).await?;
        tracing::info!(%kind, id, "record deleted");
        Ok(())
    }
}
