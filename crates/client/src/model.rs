//! Entity model over the budget API.
//!
//! Entities are plain snapshots of server records plus a handle to the
//! client. Child collections are memoized per instance in a [`CacheSlot`]:
//! the first access fetches, later accesses return the cached list (possibly
//! stale) until it is invalidated. Creating or deleting a child invalidates
//! the parent's slot. Updates are confirmed by re-reading the entity, so the
//! local copy always holds the server's canonical fields.
//!
//! Children reached through their parent share its snapshot as a memoized
//! back-reference; mutations are gated on the budget's permission level
//! before anything is sent.

use api_types::{
    RawAmount,
    budget::{BudgetInfo, BudgetRecord, BudgetUpdate},
    category::{CategoryNew, CategoryRecord, CategoryRef, CategoryUpdate},
    expense::{ExpenseNew, ExpenseRecord, ExpenseRef, ExpenseUpdate},
};
use chrono::NaiveDate;
use engine::{CacheSlot, Key, Keyed, MoneyCents, PermissionLevel, util};

use crate::{
    api::ApiClient,
    error::{ClientError, Result},
};

/// Converts a wire amount into cents. This is the only place formatted
/// currency strings are accepted.
pub fn amount_from_wire(raw: &RawAmount) -> Result<MoneyCents> {
    let amount = match raw {
        RawAmount::Text(text) => text.parse::<MoneyCents>()?,
        RawAmount::Number(value) => MoneyCents::from_major_f64(*value)?,
    };
    Ok(amount)
}

fn allow(granted: bool) -> Result<()> {
    if granted {
        Ok(())
    } else {
        Err(ClientError::Forbidden)
    }
}

/// Treats a "not found" answer as success: the entity is already gone.
fn ignore_missing(res: Result<()>) -> Result<()> {
    match res {
        Err(ClientError::NotFound) => Ok(()),
        other => other,
    }
}

#[derive(Clone, Debug)]
pub struct Budget {
    api: ApiClient,
    id: i64,
    name: String,
    permissions: PermissionLevel,
    previous_id: Option<i64>,
    next_id: Option<i64>,
    categories: CacheSlot<Vec<Category>>,
}

impl Budget {
    pub fn from_record(api: ApiClient, record: BudgetRecord) -> Self {
        Self {
            api,
            id: record.id,
            name: record.name,
            permissions: PermissionLevel::from_raw(record.permissions),
            previous_id: record.previous_id,
            next_id: record.next_id,
            categories: CacheSlot::NotFetched,
        }
    }

    fn from_info(api: ApiClient, id: i64, info: BudgetInfo) -> Self {
        Self::from_record(
            api,
            BudgetRecord {
                id,
                name: info.name,
                permissions: info.permissions,
                previous_id: info.previous_id,
                next_id: info.next_id,
            },
        )
    }

    pub async fn list(api: &ApiClient) -> Result<Vec<Budget>> {
        let records = api.budget_list().await?;
        Ok(records
            .into_iter()
            .map(|record| Budget::from_record(api.clone(), record))
            .collect())
    }

    pub async fn from_id(api: &ApiClient, budget_id: i64) -> Result<Budget> {
        let info = api.budget_info(budget_id).await?;
        Ok(Budget::from_info(api.clone(), budget_id, info))
    }

    /// Creates a budget owned by the caller.
    pub async fn create(api: &ApiClient, name: &str) -> Result<Budget> {
        let name = util::require_non_empty("budget name", name)?;
        let id = api.budget_create(name).await?;
        // Canonical fields (and links) come from the server.
        Budget::from_id(api, id).await
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Copy without the memoized children, used as a back-reference.
    fn detached(&self) -> Budget {
        Self {
            api: self.api.clone(),
            id: self.id,
            name: self.name.clone(),
            permissions: self.permissions,
            previous_id: self.previous_id,
            next_id: self.next_id,
            categories: CacheSlot::NotFetched,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permissions(&self) -> PermissionLevel {
        self.permissions
    }

    pub fn previous_id(&self) -> Option<i64> {
        self.previous_id
    }

    pub fn next_id(&self) -> Option<i64> {
        self.next_id
    }

    /// Memoized category list.
    pub async fn categories(&mut self) -> Result<&[Category]> {
        let parent = self.detached();
        let categories = self
            .categories
            .get_or_try_fetch(|| Category::list_under(parent))
            .await?;
        Ok(categories.as_slice())
    }

    pub fn invalidate_categories(&mut self) {
        self.categories.invalidate();
    }

    pub async fn update(&mut self, name: &str) -> Result<()> {
        let name = util::require_non_empty("budget name", name)?;
        allow(self.permissions.can_update())?;
        self.api
            .budget_update(BudgetUpdate {
                budget_id: self.id,
                budget_name: name.to_string(),
            })
            .await?;
        self.reload().await
    }

    /// Re-reads the budget, overwriting the local fields.
    pub async fn reload(&mut self) -> Result<()> {
        let info = self.api.budget_info(self.id).await?;
        self.name = info.name;
        self.permissions = PermissionLevel::from_raw(info.permissions);
        self.previous_id = info.previous_id;
        self.next_id = info.next_id;
        Ok(())
    }

    pub async fn delete(&self) -> Result<()> {
        allow(self.permissions.can_admin())?;
        ignore_missing(self.api.budget_delete(self.id).await)
    }

    pub async fn add_category(&mut self, name: &str) -> Result<Category> {
        let name = util::require_non_empty("category name", name)?;
        allow(self.permissions.can_update())?;
        let id = self
            .api
            .category_create(CategoryNew {
                budget_id: self.id,
                category_name: name.to_string(),
            })
            .await?;
        self.categories.invalidate();
        let category = Category::from_id(&self.api, self.id, id).await?;
        Ok(category.with_parent(self))
    }

    /// Budget preceding this one in time.
    pub async fn previous(&self) -> Result<Option<Budget>> {
        match self.previous_id {
            Some(id) => Budget::from_id(&self.api, id).await.map(Some),
            None => Ok(None),
        }
    }

    /// Budget following this one in time.
    pub async fn next(&self) -> Result<Option<Budget>> {
        match self.next_id {
            Some(id) => Budget::from_id(&self.api, id).await.map(Some),
            None => Ok(None),
        }
    }
}

impl Keyed for Budget {
    fn key(&self) -> Key {
        self.id.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct Category {
    api: ApiClient,
    id: i64,
    budget_id: i64,
    name: String,
    budget: CacheSlot<Budget>,
    expenses: CacheSlot<Vec<Expense>>,
}

impl Category {
    pub fn from_record(api: ApiClient, budget_id: i64, record: CategoryRecord) -> Self {
        Self {
            api,
            id: record.id,
            budget_id,
            name: record.name,
            budget: CacheSlot::NotFetched,
            expenses: CacheSlot::NotFetched,
        }
    }

    pub async fn list(api: &ApiClient, budget_id: i64) -> Result<Vec<Category>> {
        let records = api.category_list(budget_id).await?;
        Ok(records
            .into_iter()
            .map(|record| Category::from_record(api.clone(), budget_id, record))
            .collect())
    }

    /// Lists the categories of `budget`, each already knowing its parent.
    async fn list_under(budget: Budget) -> Result<Vec<Category>> {
        let categories = Category::list(&budget.api, budget.id).await?;
        Ok(categories
            .into_iter()
            .map(|category| category.with_parent(&budget))
            .collect())
    }

    pub async fn from_id(api: &ApiClient, budget_id: i64, category_id: i64) -> Result<Category> {
        let info = api
            .category_info(CategoryRef {
                budget_id,
                category_id,
            })
            .await?;
        Ok(Category::from_record(
            api.clone(),
            budget_id,
            CategoryRecord {
                id: category_id,
                name: info.name,
            },
        ))
    }

    fn with_parent(mut self, budget: &Budget) -> Self {
        self.budget.set(budget.detached());
        self
    }

    fn detached(&self) -> Category {
        Self {
            api: self.api.clone(),
            id: self.id,
            budget_id: self.budget_id,
            name: self.name.clone(),
            budget: self.budget.clone(),
            expenses: CacheSlot::NotFetched,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn budget_id(&self) -> i64 {
        self.budget_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn reference(&self) -> CategoryRef {
        CategoryRef {
            budget_id: self.budget_id,
            category_id: self.id,
        }
    }

    /// Memoized owning budget.
    pub async fn budget(&mut self) -> Result<&Budget> {
        let api = &self.api;
        let budget_id = self.budget_id;
        let budget = self
            .budget
            .get_or_try_fetch(|| Budget::from_id(api, budget_id))
            .await?;
        Ok(budget)
    }

    /// The caller's level on the owning budget.
    pub async fn permissions(&mut self) -> Result<PermissionLevel> {
        Ok(self.budget().await?.permissions())
    }

    /// Memoized expense list.
    pub async fn expenses(&mut self) -> Result<&[Expense]> {
        let parent = self.detached();
        let expenses = self
            .expenses
            .get_or_try_fetch(|| Expense::list_under(parent))
            .await?;
        Ok(expenses.as_slice())
    }

    pub fn invalidate_expenses(&mut self) {
        self.expenses.invalidate();
    }

    /// Sum of the category's expenses.
    pub async fn total(&mut self) -> Result<MoneyCents> {
        let expenses = self.expenses().await?;
        let total = MoneyCents::checked_sum(expenses.iter().map(Expense::amount))?;
        Ok(total)
    }

    pub async fn update(&mut self, name: &str) -> Result<()> {
        let name = util::require_non_empty("category name", name)?;
        allow(self.permissions().await?.can_update())?;
        self.api
            .category_update(CategoryUpdate {
                budget_id: self.budget_id,
                category_id: self.id,
                category_name: name.to_string(),
            })
            .await?;
        let info = self.api.category_info(self.reference()).await?;
        self.name = info.name;
        Ok(())
    }

    pub async fn delete(&mut self) -> Result<()> {
        allow(self.permissions().await?.can_admin())?;
        ignore_missing(self.api.category_delete(self.reference()).await)
    }

    pub async fn add_expense(&mut self, fields: ExpenseFields) -> Result<Expense> {
        let (description, amount, date) = fields.validate()?;
        allow(self.permissions().await?.can_update())?;
        let id = self
            .api
            .expense_create(ExpenseNew {
                budget_id: self.budget_id,
                category_id: self.id,
                description,
                expense_amount: amount.to_decimal_string(),
                expense_date: date,
            })
            .await?;
        self.expenses.invalidate();
        let expense = Expense::from_id(&self.api, self.budget_id, self.id, id).await?;
        Ok(expense.with_parent(self))
    }
}

impl Keyed for Category {
    fn key(&self) -> Key {
        self.id.to_string()
    }
}

/// User supplied fields of an expense.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFields {
    pub description: String,
    pub amount: MoneyCents,
    /// Required; `None` aborts the operation locally.
    pub date: Option<NaiveDate>,
}

impl ExpenseFields {
    fn validate(self) -> Result<(String, MoneyCents, NaiveDate)> {
        let date = util::require("expense date", self.date)?;
        Ok((self.description.trim().to_string(), self.amount, date))
    }
}

#[derive(Clone, Debug)]
pub struct Expense {
    api: ApiClient,
    id: i64,
    budget_id: i64,
    category_id: i64,
    description: String,
    amount: MoneyCents,
    date: NaiveDate,
    category: CacheSlot<Category>,
    budget: CacheSlot<Budget>,
}

impl Expense {
    pub fn from_record(
        api: ApiClient,
        budget_id: i64,
        category_id: i64,
        record: ExpenseRecord,
    ) -> Result<Self> {
        Ok(Self {
            amount: amount_from_wire(&record.amount)?,
            api,
            id: record.id,
            budget_id,
            category_id,
            description: record.description,
            date: record.date,
            category: CacheSlot::NotFetched,
            budget: CacheSlot::NotFetched,
        })
    }

    pub async fn list(api: &ApiClient, budget_id: i64, category_id: i64) -> Result<Vec<Expense>> {
        let records = api
            .expense_list(CategoryRef {
                budget_id,
                category_id,
            })
            .await?;
        records
            .into_iter()
            .map(|record| Expense::from_record(api.clone(), budget_id, category_id, record))
            .collect()
    }

    async fn list_under(category: Category) -> Result<Vec<Expense>> {
        let expenses = Expense::list(&category.api, category.budget_id, category.id).await?;
        Ok(expenses
            .into_iter()
            .map(|expense| expense.with_parent(&category))
            .collect())
    }

    pub async fn from_id(
        api: &ApiClient,
        budget_id: i64,
        category_id: i64,
        expense_id: i64,
    ) -> Result<Expense> {
        let info = api
            .expense_info(ExpenseRef {
                budget_id,
                category_id,
                expense_id,
            })
            .await?;
        Expense::from_record(
            api.clone(),
            budget_id,
            category_id,
            ExpenseRecord {
                id: expense_id,
                description: info.description,
                amount: info.amount,
                date: info.date,
            },
        )
    }

    /// Seeds both back-references from an already loaded category.
    fn with_parent(mut self, category: &Category) -> Self {
        if let Some(budget) = category.budget.get() {
            self.budget.set(budget.clone());
        }
        self.category.set(category.detached());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn budget_id(&self) -> i64 {
        self.budget_id
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> MoneyCents {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    fn reference(&self) -> ExpenseRef {
        ExpenseRef {
            budget_id: self.budget_id,
            category_id: self.category_id,
            expense_id: self.id,
        }
    }

    /// Memoized owning category.
    pub async fn category(&mut self) -> Result<&Category> {
        let api = &self.api;
        let (budget_id, category_id) = (self.budget_id, self.category_id);
        let category = self
            .category
            .get_or_try_fetch(|| Category::from_id(api, budget_id, category_id))
            .await?;
        Ok(category)
    }

    /// Memoized owning budget.
    pub async fn budget(&mut self) -> Result<&Budget> {
        let api = &self.api;
        let budget_id = self.budget_id;
        let budget = self
            .budget
            .get_or_try_fetch(|| Budget::from_id(api, budget_id))
            .await?;
        Ok(budget)
    }

    /// The caller's level on the owning budget.
    pub async fn permissions(&mut self) -> Result<PermissionLevel> {
        Ok(self.budget().await?.permissions())
    }

    /// Sends the new fields, then adopts whatever the server stored.
    pub async fn update(&mut self, fields: ExpenseFields) -> Result<()> {
        let (description, amount, date) = fields.validate()?;
        allow(self.permissions().await?.can_update())?;
        self.api
            .expense_update(ExpenseUpdate {
                budget_id: self.budget_id,
                category_id: self.category_id,
                expense_id: self.id,
                description,
                expense_amount: amount.to_decimal_string(),
                expense_date: date,
            })
            .await?;
        let info = self.api.expense_info(self.reference()).await?;
        self.amount = amount_from_wire(&info.amount)?;
        self.description = info.description;
        self.date = info.date;
        Ok(())
    }

    pub async fn delete(&mut self) -> Result<()> {
        allow(self.permissions().await?.can_admin())?;
        ignore_missing(self.api.expense_delete(self.reference()).await)
    }
}

impl Keyed for Expense {
    fn key(&self) -> Key {
        self.id.to_string()
    }
}
