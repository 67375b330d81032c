use api_types::{
    Data, ErrorBody,
    auth::{Credentials, LoginData, Registration},
    expense::{Expense, ExpensePayload},
    thing::{Thing, ThingPayload},
    user::ProfilePayload,
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::{
    error::{LedgerError, Result},
    remote::Remote,
};

/// [`Remote`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| LedgerError::transport(format!("invalid base_url: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| LedgerError::transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let res = request.send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(LedgerError::Unauthorized);
        }

        let messages = res
            .json::<ErrorBody>()
            .await
            .map(ErrorBody::messages)
            .unwrap_or_default();
        if messages.is_empty() {
            return Err(LedgerError::Transport {
                status: Some(status.as_u16()),
                message: status.to_string(),
            });
        }
        Err(LedgerError::Remote {
            status: status.as_u16(),
            messages,
        })
    }

    async fn data<T: DeserializeOwned>(res: Response) -> Result<T> {
        Ok(res.json::<Data<T>>().await?.data)
    }

    /// Writes may answer with the stored record, with something else or with
    /// nothing at all. Only the first counts as a record.
    async fn record<T: DeserializeOwned>(res: Response) -> Result<Option<T>> {
        let body = res.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        match serde_json::from_slice::<Data<T>>(&body) {
            Ok(envelope) => Ok(Some(envelope.data)),
            Err(err) => {
                tracing::debug!("write response carries no record: {err}");
                Ok(None)
            }
        }
    }

    fn get(&self, token: &str, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.get(self.endpoint(path)?).bearer_auth(token))
    }

    fn post(&self, token: &str, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.post(self.endpoint(path)?).bearer_auth(token))
    }

    fn put(&self, token: &str, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.put(self.endpoint(path)?).bearer_auth(token))
    }

    fn delete(&self, token: &str, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.delete(self.endpoint(path)?).bearer_auth(token))
    }
}

impl Remote for HttpClient {
    async fn login(&self, credentials: &Credentials) -> Result<LoginData> {
        let req = self.http.post(self.endpoint("auth")?).json(credentials);
        let res = self.send(req).await?;
        Self::data(res).await
    }

    async fn register(&self, registration: &Registration) -> Result<()> {
        let req = self.http.post(self.endpoint("register")?).json(registration);
        self.send(req).await?;
        Ok(())
    }

    async fn things(&self, token: &str) -> Result<Vec<Thing>> {
        let res = self.send(self.get(token, "api/")?).await?;
        Self::data(res).await
    }

    async fn create_thing(&self, token: &str, payload: &ThingPayload) -> Result<Option<Thing>> {
        let req = self.post(token, "api/admin/thing")?.json(payload);
        let res = self.send(req).await?;
        Self::record(res).await
    }

    async fn update_thing(
        &self,
        token: &str,
        id: i64,
        payload: &ThingPayload,
    ) -> Result<Option<Thing>> {
        let req = self
            .put(token, &format!("api/admin/thing/{id}"))?
            .json(payload);
        let res = self.send(req).await?;
        Self::record(res).await
    }

    async fn delete_thing(&self, token: &str, id: i64) -> Result<()> {
        self.send(self.delete(token, &format!("api/admin/thing/{id}"))?)
            .await?;
        Ok(())
    }

    async fn thing_expenses(&self, token: &str, thing_id: i64) -> Result<Vec<Expense>> {
        let res = self
            .send(self.get(token, &format!("api/admin/thing/{thing_id}/expenses"))?)
            .await?;
        Self::data(res).await
    }

    async fn create_expense(
        &self,
        token: &str,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>> {
        let req = self.post(token, "api/admin/expense")?.json(payload);
        let res = self.send(req).await?;
        Self::record(res).await
    }

    async fn update_expense(
        &self,
        token: &str,
        id: i64,
        payload: &ExpensePayload,
    ) -> Result<Option<Expense>> {
        let req = self
            .put(token, &format!("api/admin/expense/{id}"))?
            .json(payload);
        let res = self.send(req).await?;
        Self::record(res).await
    }

    async fn delete_expense(&self, token: &str, id: i64) -> Result<()> {
        self.send(self.delete(token, &format!("api/admin/expense/{id}"))?)
            .await?;
        Ok(())
    }

    async fn update_user(
        &self,
        token: &str,
        user_id: i64,
        payload: &ProfilePayload,
    ) -> Result<()> {
        let req = self
            .put(token, &format!("api/admin/user/{user_id}"))?
            .json(payload);
        self.send(req).await?;
        Ok(())
    }
}
