//! Request and response bodies of the budget API.
//!
//! Every endpoint is a `POST` with a JSON body. Once a session exists the
//! client adds an `authtoken` field to every body, see [`Authed`]. Errors come
//! back as [`ErrorResponse`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reply body of a failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reply body of update/delete endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Reply body of create endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

/// Request body for endpoints without parameters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Empty {}

/// A request body carrying the session token next to its own fields.
#[derive(Debug, Serialize, Deserialize)]
pub struct Authed<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authtoken: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

/// Monetary amount as the server sends it.
///
/// Depending on the endpoint this is a formatted currency string
/// (`"$1,234.56"`) or a plain number (`12.5`). Clients convert it to integer
/// minor units right away.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Text(String),
    Number(f64),
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthToken {
        pub authtoken: String,
    }
}

pub mod budget {
    use super::*;

    /// One row of `budget/list`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BudgetRecord {
        pub id: i64,
        pub name: String,
        /// Raw permission level of the caller (0, 1, 2, 4 or 8).
        pub permissions: i64,
        /// Budget preceding this one in time, if any.
        #[serde(default)]
        pub previous_id: Option<i64>,
        /// Budget following this one in time, if any.
        #[serde(default)]
        pub next_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetRecord>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetRef {
        pub budget_id: i64,
    }

    /// Reply of `budget/info`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetInfo {
        pub name: String,
        pub permissions: i64,
        #[serde(default)]
        pub previous_id: Option<i64>,
        #[serde(default)]
        pub next_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub budget_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub budget_id: i64,
        pub budget_name: String,
    }
}

pub mod category {
    use super::*;

    /// One row of `category/list`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CategoryRecord {
        pub id: i64,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryRecord>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryRef {
        pub budget_id: i64,
        pub category_id: i64,
    }

    /// Reply of `category/info`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryInfo {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub budget_id: i64,
        pub category_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub budget_id: i64,
        pub category_id: i64,
        pub category_name: String,
    }
}

pub mod expense {
    use super::*;

    /// One row of `expense/list`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ExpenseRecord {
        pub id: i64,
        pub description: String,
        pub amount: RawAmount,
        /// Calendar date, `YYYY-MM-DD`.
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseRecord>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseRef {
        pub budget_id: i64,
        pub category_id: i64,
        pub expense_id: i64,
    }

    /// Reply of `expense/info`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseInfo {
        pub description: String,
        pub amount: RawAmount,
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub budget_id: i64,
        pub category_id: i64,
        pub description: String,
        /// Plain decimal string in major units (`"12.50"`).
        pub expense_amount: String,
        pub expense_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub budget_id: i64,
        pub category_id: i64,
        pub expense_id: i64,
        pub description: String,
        pub expense_amount: String,
        pub expense_date: NaiveDate,
    }
}
