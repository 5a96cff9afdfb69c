//! Dashboard data: category totals along a budget's previous/next chain.

use std::collections::HashSet;

use engine::{Timeline, TimelineColumn};

use crate::{
    error::Result,
    model::{Budget, Category},
};

/// Follows the links of `budget` in both directions and totals every
/// category of every budget on the chain.
///
/// A link pointing back into the already visited chain ends the walk in
/// that direction.
pub async fn collect(budget: &Budget) -> Result<Timeline> {
    let mut visited = HashSet::from([budget.id()]);

    let mut before = Vec::new();
    let mut cursor = budget.previous().await?;
    while let Some(previous) = cursor {
        if !visited.insert(previous.id()) {
            break;
        }
        cursor = previous.previous().await?;
        before.push(previous);
    }
    before.reverse();

    let mut after = Vec::new();
    let mut cursor = budget.next().await?;
    while let Some(next) = cursor {
        if !visited.insert(next.id()) {
            break;
        }
        cursor = next.next().await?;
        after.push(next);
    }

    let focus = before.len();
    let mut columns = Vec::with_capacity(before.len() + 1 + after.len());
    for linked in before.iter().chain(std::iter::once(budget)).chain(&after) {
        columns.push(column(linked).await?);
    }

    tracing::debug!(
        "timeline of budget {} spans {} budgets",
        budget.id(),
        columns.len()
    );
    Ok(Timeline::build(&columns, focus))
}

async fn column(budget: &Budget) -> Result<TimelineColumn> {
    let categories = Category::list(budget.api(), budget.id()).await?;
    let mut totals = Vec::with_capacity(categories.len());
    for mut category in categories {
        let total = category.total().await?;
        totals.push((category.name().to_string(), total));
    }
    Ok(TimelineColumn {
        label: budget.name().to_string(),
        totals,
    })
}
