use std::{fmt, sync::Arc, time::Duration};

use api_types::{
    Authed, Created, Empty, ErrorResponse, StatusResponse,
    budget::{BudgetInfo, BudgetListResponse, BudgetNew, BudgetRecord, BudgetRef, BudgetUpdate},
    category::{
        CategoryInfo, CategoryListResponse, CategoryNew, CategoryRecord, CategoryRef,
        CategoryUpdate,
    },
    expense::{
        ExpenseInfo, ExpenseListResponse, ExpenseNew, ExpenseRecord, ExpenseRef, ExpenseUpdate,
    },
    session::{AuthToken, Credentials},
};
use reqwest::Url;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{ClientError, Result};

/// HTTP client of the budget API.
///
/// Cheap to clone: entities keep their own copy to issue follow-up calls.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<Arc<str>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("logged_in", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    /// Returns a copy of the client that authenticates with `token`.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(Arc::from(token));
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.authenticate("login", username, password).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Result<()> {
        self.authenticate("register", username, password).await
    }

    async fn authenticate(&mut self, path: &str, username: &str, password: &str) -> Result<()> {
        let reply: AuthToken = self
            .post(
                path,
                Credentials {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        tracing::debug!("{path} succeeded for {username}");
        self.token = Some(Arc::from(reply.authtoken));
        Ok(())
    }

    pub async fn status(&self) -> Result<String> {
        let reply: StatusResponse = self.post("status", Empty {}).await?;
        Ok(reply.status)
    }

    /// Sends `body` (plus the session token) and decodes the reply.
    ///
    /// Error replies are mapped onto [`ClientError`]; a successful status
    /// whose body still carries an `error` field is treated as a failure too.
    pub async fn post<TReq, TResp>(&self, path: &str, body: TReq) -> Result<TResp>
    where
        TReq: Serialize,
        TResp: DeserializeOwned,
    {
        let endpoint = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))?;

        let payload = Authed {
            authtoken: self.token.as_deref().map(str::to_string),
            body,
        };

        let res = self.http.post(endpoint).json(&payload).send().await?;
        let status = res.status();

        if status.is_success() {
            let value: serde_json::Value = res.json().await?;
            if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
                return Err(ClientError::from_reply(status.as_u16(), message.to_string()));
            }
            return Ok(serde_json::from_value(value)?);
        }

        let message = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(ClientError::from_reply(status.as_u16(), message))
    }

    async fn post_status<TReq: Serialize>(&self, path: &str, body: TReq) -> Result<()> {
        let _: StatusResponse = self.post(path, body).await?;
        Ok(())
    }

    pub async fn budget_list(&self) -> Result<Vec<BudgetRecord>> {
        let reply: BudgetListResponse = self.post("budget/list", Empty {}).await?;
        Ok(reply.budgets)
    }

    pub async fn budget_info(&self, budget_id: i64) -> Result<BudgetInfo> {
        self.post("budget/info", BudgetRef { budget_id }).await
    }

    pub async fn budget_create(&self, budget_name: &str) -> Result<i64> {
        let reply: Created = self
            .post(
                "budget/create",
                BudgetNew {
                    budget_name: budget_name.to_string(),
                },
            )
            .await?;
        Ok(reply.id)
    }

    pub async fn budget_update(&self, payload: BudgetUpdate) -> Result<()> {
        self.post_status("budget/update", payload).await
    }

    pub async fn budget_delete(&self, budget_id: i64) -> Result<()> {
        self.post_status("budget/delete", BudgetRef { budget_id })
            .await
    }

    pub async fn category_list(&self, budget_id: i64) -> Result<Vec<CategoryRecord>> {
        let reply: CategoryListResponse =
            self.post("category/list", BudgetRef { budget_id }).await?;
        Ok(reply.categories)
    }

    pub async fn category_info(&self, payload: CategoryRef) -> Result<CategoryInfo> {
        self.post("category/info", payload).await
    }

    pub async fn category_create(&self, payload: CategoryNew) -> Result<i64> {
        let reply: Created = self.post("category/create", payload).await?;
        Ok(reply.id)
    }

    pub async fn category_update(&self, payload: CategoryUpdate) -> Result<()> {
        self.post_status("category/update", payload).await
    }

    pub async fn category_delete(&self, payload: CategoryRef) -> Result<()> {
        self.post_status("category/delete", payload).await
    }

    pub async fn expense_list(&self, payload: CategoryRef) -> Result<Vec<ExpenseRecord>> {
        let reply: ExpenseListResponse = self.post("expense/list", payload).await?;
        Ok(reply.expenses)
    }

    pub async fn expense_info(&self, payload: ExpenseRef) -> Result<ExpenseInfo> {
        self.post("expense/info", payload).await
    }

    pub async fn expense_create(&self, payload: ExpenseNew) -> Result<i64> {
        let reply: Created = self.post("expense/create", payload).await?;
        Ok(reply.id)
    }

    pub async fn expense_update(&self, payload: ExpenseUpdate) -> Result<()> {
        self.post_status("expense/update", payload).await
    }

    pub async fn expense_delete(&self, payload: ExpenseRef) -> Result<()> {
        self.post_status("expense/delete", payload).await
    }
}
