//! Live views: reconciled presentation state over server collections.
//!
//! A refresh pass always reads fresh lists from its [`CollectionSource`],
//! never from an entity's memoized children, and hands them to the
//! reconciler. When the fetch fails the pass stops before touching any
//! state; the previous view stays on screen and the next tick retries.

use std::{collections::HashSet, future::Future};

use engine::{Binder, Key, Keyed, ReconcileReport, ReconcilerState, ScopedState, UpdatePolicy};

use crate::{
    error::{ClientError, Result},
    model::{Budget, Category, Expense},
    poll::Refresh,
    source::CollectionSource,
};

/// The list of budgets visible to the user.
pub struct BudgetListView<S, B: Binder> {
    source: S,
    binder: B,
    state: ReconcilerState<B::Handle>,
}

impl<S, B> BudgetListView<S, B>
where
    S: CollectionSource,
    B: Binder<Entity = Budget>,
{
    pub fn new(source: S, binder: B, policy: UpdatePolicy) -> Self {
        Self {
            source,
            binder,
            state: ReconcilerState::with_policy(policy),
        }
    }

    pub fn state(&self) -> &ReconcilerState<B::Handle> {
        &self.state
    }

    pub fn binder(&self) -> &B {
        &self.binder
    }

    pub async fn refresh(&mut self) -> Result<ReconcileReport> {
        let budgets = self.source.budgets().await?;
        let report = self.state.reconcile(&budgets, &mut self.binder);
        tracing::debug!("budget list pass: {report}");
        Ok(report)
    }

    /// Removes every row through the binder.
    pub fn teardown(&mut self) -> Vec<Key> {
        self.state.clear(&mut self.binder)
    }
}

impl<S, B> Refresh for BudgetListView<S, B>
where
    S: CollectionSource + Send + Sync,
    B: Binder<Entity = Budget> + Send,
    B::Handle: Send,
{
    type Output = ReconcileReport;

    fn refresh(&mut self) -> impl Future<Output = Result<ReconcileReport>> + Send {
        Self::refresh(self)
    }
}

/// Outcome of one [`BudgetView`] pass.
#[derive(Debug, Default)]
pub struct BudgetPass {
    pub categories: ReconcileReport,
    /// Expense changes summed over every category scope.
    pub expenses: ReconcileReport,
    /// Category scopes whose expense fetch failed and were left as they were.
    pub stale: Vec<(Key, ClientError)>,
}

/// Categories of one budget, each with its own expense scope.
pub struct BudgetView<S, C: Binder, X: Binder> {
    source: S,
    budget_id: i64,
    categories: C,
    expenses: X,
    state: ScopedState<C::Handle, X::Handle>,
}

impl<S, C, X> BudgetView<S, C, X>
where
    S: CollectionSource,
    C: Binder<Entity = Category>,
    X: Binder<Entity = Expense>,
{
    pub fn new(source: S, budget_id: i64, categories: C, expenses: X, policy: UpdatePolicy) -> Self {
        Self {
            source,
            budget_id,
            categories,
            expenses,
            state: ScopedState::with_policies(policy, policy),
        }
    }

    pub fn budget_id(&self) -> i64 {
        self.budget_id
    }

    pub fn state(&self) -> &ScopedState<C::Handle, X::Handle> {
        &self.state
    }

    pub fn category_binder(&self) -> &C {
        &self.categories
    }

    pub fn expense_binder(&self) -> &X {
        &self.expenses
    }

    /// Reconciles the categories, then every category's expenses.
    ///
    /// A failed category fetch aborts the pass with no callbacks. A failed
    /// expense fetch only freezes that category's scope; it is reported in
    /// [`BudgetPass::stale`].
    pub async fn refresh(&mut self) -> Result<BudgetPass> {
        let categories = self.source.categories(self.budget_id).await?;

        let mut pass = BudgetPass {
            categories: self.state.reconcile_parents(
                &categories,
                &mut self.categories,
                &mut self.expenses,
            ),
            ..BudgetPass::default()
        };

        let mut seen = HashSet::new();
        for category in &categories {
            let key = category.key();
            if !seen.insert(key.clone()) {
                continue;
            }

            match self.source.expenses(self.budget_id, category.id()).await {
                Ok(expenses) => {
                    if let Some(report) =
                        self.state
                            .reconcile_children(&key, &expenses, &mut self.expenses)
                    {
                        pass.expenses.merge(report);
                    }
                }
                Err(err) => {
                    tracing::warn!("keeping cached expenses of category {key}: {err}");
                    pass.stale.push((key, err));
                }
            }
        }

        tracing::debug!(
            "budget {} pass: categories {}, expenses {}",
            self.budget_id,
            pass.categories,
            pass.expenses
        );
        Ok(pass)
    }

    /// Removes every row, expenses before their category.
    pub fn teardown(&mut self) -> Vec<Key> {
        self.state.clear(&mut self.categories, &mut self.expenses)
    }
}

impl<S, C, X> Refresh for BudgetView<S, C, X>
where
    S: CollectionSource + Send + Sync,
    C: Binder<Entity = Category> + Send,
    X: Binder<Entity = Expense> + Send,
    C::Handle: Send,
    X::Handle: Send,
{
    type Output = BudgetPass;

    fn refresh(&mut self) -> impl Future<Output = Result<BudgetPass>> + Send {
        Self::refresh(self)
    }
}
