//! Console presentation: every reconciler callback becomes a log line.

use std::fmt;

use client::{Budget, Category, Expense};
use engine::{Binder, PermissionLevel, Timeline};

/// Actions offered next to a row, gated by the caller's level on the budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Actions {
    pub add: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Actions {
    pub fn for_level(level: PermissionLevel) -> Self {
        Self {
            add: level.can_update(),
            edit: level.can_update(),
            delete: level.can_admin(),
        }
    }
}

impl fmt::Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = [
            (self.add, "[add]"),
            (self.edit, "[edit]"),
            (self.delete, "[delete]"),
        ]
        .into_iter()
        .filter_map(|(offered, tag)| offered.then_some(tag))
        .collect();
        if tags.is_empty() {
            f.write_str("[read only]")
        } else {
            f.write_str(&tags.join(" "))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub label: String,
    pub actions: Actions,
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.id, self.label, self.actions)
    }
}

fn budget_label(budget: &Budget) -> String {
    format!("{} ({})", budget.name(), budget.permissions())
}

fn expense_label(expense: &Expense) -> String {
    format!(
        "{} {} {}",
        expense.date(),
        expense.description(),
        expense.amount()
    )
}

/// Applies a fresh label, logging only real changes.
fn relabel(kind: &str, row: &mut Row, label: String) {
    if row.label != label {
        tracing::info!("~ {kind} #{}: {} -> {label}", row.id, row.label);
        row.label = label;
    }
}

#[derive(Debug, Default)]
pub struct BudgetConsole {
    shown: usize,
}

impl BudgetConsole {
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Binder for BudgetConsole {
    type Entity = Budget;
    type Handle = Row;

    fn on_create(&mut self, budget: &Budget) -> Row {
        let row = Row {
            id: budget.id(),
            label: budget_label(budget),
            actions: Actions::for_level(budget.permissions()),
        };
        self.shown += 1;
        tracing::info!("+ budget {row}");
        row
    }

    fn on_update(&mut self, row: &mut Row, budget: &Budget) {
        relabel("budget", row, budget_label(budget));
        row.actions = Actions::for_level(budget.permissions());
    }

    fn on_remove(&mut self, row: Row) {
        self.shown = self.shown.saturating_sub(1);
        tracing::info!("- budget #{} {}", row.id, row.label);
    }
}

/// Category rows of one budget.
#[derive(Debug)]
pub struct CategoryConsole {
    actions: Actions,
    shown: usize,
}

impl CategoryConsole {
    pub fn new(level: PermissionLevel) -> Self {
        Self {
            actions: Actions::for_level(level),
            shown: 0,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Binder for CategoryConsole {
    type Entity = Category;
    type Handle = Row;

    fn on_create(&mut self, category: &Category) -> Row {
        let row = Row {
            id: category.id(),
            label: category.name().to_string(),
            actions: self.actions,
        };
        self.shown += 1;
        tracing::info!("+ category {row}");
        row
    }

    fn on_update(&mut self, row: &mut Row, category: &Category) {
        relabel("category", row, category.name().to_string());
    }

    fn on_remove(&mut self, row: Row) {
        self.shown = self.shown.saturating_sub(1);
        tracing::info!("- category #{} {}", row.id, row.label);
    }
}

/// Expense rows, indented under their category.
#[derive(Debug)]
pub struct ExpenseConsole {
    actions: Actions,
    shown: usize,
}

impl ExpenseConsole {
    pub fn new(level: PermissionLevel) -> Self {
        // Expenses cannot hold children, so "add" never applies to them.
        Self {
            actions: Actions {
                add: false,
                ..Actions::for_level(level)
            },
            shown: 0,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Binder for ExpenseConsole {
    type Entity = Expense;
    type Handle = Row;

    fn on_create(&mut self, expense: &Expense) -> Row {
        let row = Row {
            id: expense.id(),
            label: expense_label(expense),
            actions: self.actions,
        };
        self.shown += 1;
        tracing::info!("  + expense {row} (category #{})", expense.category_id());
        row
    }

    fn on_update(&mut self, row: &mut Row, expense: &Expense) {
        relabel("expense", row, expense_label(expense));
    }

    fn on_remove(&mut self, row: Row) {
        self.shown = self.shown.saturating_sub(1);
        tracing::info!("  - expense #{} {}", row.id, row.label);
    }
}

/// Renders the dashboard data as text, one line per category.
pub fn timeline_lines(timeline: &Timeline) -> Vec<String> {
    let mut lines = Vec::with_capacity(timeline.series.len() + 1);
    lines.push(timeline.labels.join(" | "));
    for series in &timeline.series {
        let values: Vec<String> = series.values.iter().map(ToString::to_string).collect();
        lines.push(format!("{}: {}", series.category, values.join(" | ")));
    }
    lines
}
