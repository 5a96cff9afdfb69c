//! Per-category totals across a chain of budgets.
//!
//! Budgets can be linked in time (`previous_id`/`next_id`, e.g. one budget
//! per month). A [`Timeline`] lines up the category totals of every budget in
//! such a chain so they can be plotted as one series per category.

use crate::MoneyCents;

/// Totals of one budget, in chronological position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelineColumn {
    pub label: String,
    pub totals: Vec<(String, MoneyCents)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Series {
    pub category: String,
    pub values: Vec<MoneyCents>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timeline {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl Timeline {
    /// Aligns `columns` around the budget at index `focus`.
    ///
    /// Categories are matched by name. There is one series per category of
    /// the focus budget, in its order; budgets without that category
    /// contribute zero. Categories that only exist in other budgets are
    /// ignored.
    #[must_use]
    pub fn build(columns: &[TimelineColumn], focus: usize) -> Self {
        let labels = columns.iter().map(|column| column.label.clone()).collect();

        let Some(focus_column) = columns.get(focus) else {
            return Self {
                labels,
                series: Vec::new(),
            };
        };

        let mut series: Vec<Series> = Vec::with_capacity(focus_column.totals.len());
        for (name, _) in &focus_column.totals {
            if series.iter().any(|s| &s.category == name) {
                continue;
            }
            let values = columns
                .iter()
                .map(|column| {
                    column
                        .totals
                        .iter()
                        .find(|(other, _)| other == name)
                        .map_or(MoneyCents::ZERO, |(_, total)| *total)
                })
                .collect();
            series.push(Series {
                category: name.clone(),
                values,
            });
        }

        Self { labels, series }
    }
}
