use std::future::Future;

use crate::{
    api::ApiClient,
    error::Result,
    model::{Budget, Category, Expense},
};

/// Where the sync passes get their fresh collections from.
///
/// Every call is a fresh read; nothing is memoized at this level.
pub trait CollectionSource {
    fn budgets(&self) -> impl Future<Output = Result<Vec<Budget>>> + Send;

    fn categories(&self, budget_id: i64) -> impl Future<Output = Result<Vec<Category>>> + Send;

    fn expenses(
        &self,
        budget_id: i64,
        category_id: i64,
    ) -> impl Future<Output = Result<Vec<Expense>>> + Send;
}

impl CollectionSource for ApiClient {
    fn budgets(&self) -> impl Future<Output = Result<Vec<Budget>>> + Send {
        Budget::list(self)
    }

    fn categories(&self, budget_id: i64) -> impl Future<Output = Result<Vec<Category>>> + Send {
        Category::list(self, budget_id)
    }

    fn expenses(
        &self,
        budget_id: i64,
        category_id: i64,
    ) -> impl Future<Output = Result<Vec<Expense>>> + Send {
        Expense::list(self, budget_id, category_id)
    }
}
