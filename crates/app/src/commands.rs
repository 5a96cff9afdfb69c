//! One-shot edits run instead of the watch loop.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use client::{ApiClient, Budget, Category, ClientError, Expense, ExpenseFields};
use engine::MoneyCents;

use crate::{
    binder::Actions,
    error::{AppError, Result},
};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, rename or delete a budget.
    Budget(BudgetArgs),
    /// Add, rename or delete a category of a budget.
    Category(CategoryArgs),
    /// Add, edit or delete an expense of a category.
    Expense(ExpenseArgs),
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Debug, Subcommand)]
enum BudgetCommand {
    Create {
        name: String,
    },
    Rename {
        budget: i64,
        name: String,
    },
    Delete {
        budget: i64,
    },
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    Add {
        budget: i64,
        name: String,
    },
    Rename {
        budget: i64,
        category: i64,
        name: String,
    },
    Delete {
        budget: i64,
        category: i64,
    },
}

#[derive(Debug, Args)]
pub struct ExpenseArgs {
    #[command(subcommand)]
    command: ExpenseCommand,
}

#[derive(Debug, Subcommand)]
enum ExpenseCommand {
    Add(ExpenseAddArgs),
    Edit(ExpenseEditArgs),
    Delete {
        budget: i64,
        category: i64,
        expense: i64,
    },
}

#[derive(Debug, Args)]
struct ExpenseAddArgs {
    budget: i64,
    category: i64,
    /// Amount such as `12.50` or `$1,200`; refunds are negative.
    #[arg(long, allow_negative_numbers = true)]
    amount: MoneyCents,
    /// Day of the expense, `YYYY-MM-DD`.
    #[arg(long)]
    date: NaiveDate,
    #[arg(long, default_value = "")]
    description: String,
}

/// Fields left out keep their current value.
#[derive(Debug, Args)]
struct ExpenseEditArgs {
    budget: i64,
    category: i64,
    expense: i64,
    #[arg(long, allow_negative_numbers = true)]
    amount: Option<MoneyCents>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    description: Option<String>,
}

fn permit(offered: bool, action: &'static str, budget: &Budget) -> Result<()> {
    if offered {
        Ok(())
    } else {
        Err(AppError::Denied {
            action,
            level: budget.permissions(),
        })
    }
}

async fn find_category(budget: &mut Budget, category_id: i64) -> Result<Category> {
    budget
        .categories()
        .await?
        .iter()
        .find(|category| category.id() == category_id)
        .cloned()
        .ok_or(AppError::Client(ClientError::NotFound))
}

async fn find_expense(category: &mut Category, expense_id: i64) -> Result<Expense> {
    category
        .expenses()
        .await?
        .iter()
        .find(|expense| expense.id() == expense_id)
        .cloned()
        .ok_or(AppError::Client(ClientError::NotFound))
}

pub async fn run(api: &ApiClient, command: Command) -> Result<()> {
    match command {
        Command::Budget(args) => budget(api, args.command).await,
        Command::Category(args) => category(api, args.command).await,
        Command::Expense(args) => expense(api, args.command).await,
    }
}

async fn budget(api: &ApiClient, command: BudgetCommand) -> Result<()> {
    match command {
        BudgetCommand::Create { name } => {
            let budget = Budget::create(api, &name).await?;
            tracing::info!("created budget #{} {}", budget.id(), budget.name());
        }
        BudgetCommand::Rename { budget, name } => {
            let mut budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).edit,
                "rename budgets",
                &budget,
            )?;
            budget.update(&name).await?;
            tracing::info!("budget #{} is now {}", budget.id(), budget.name());
        }
        BudgetCommand::Delete { budget } => {
            let budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).delete,
                "delete budgets",
                &budget,
            )?;
            budget.delete().await?;
            tracing::info!("deleted budget #{} {}", budget.id(), budget.name());
        }
    }
    Ok(())
}

async fn category(api: &ApiClient, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::Add { budget, name } => {
            let mut budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).add,
                "add categories",
                &budget,
            )?;
            let category = budget.add_category(&name).await?;
            tracing::info!(
                "added category #{} {} to {}",
                category.id(),
                category.name(),
                budget.name()
            );
        }
        CategoryCommand::Rename {
            budget,
            category,
            name,
        } => {
            let mut budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).edit,
                "rename categories",
                &budget,
            )?;
            let mut category = find_category(&mut budget, category).await?;
            category.update(&name).await?;
            tracing::info!("category #{} is now {}", category.id(), category.name());
        }
        CategoryCommand::Delete { budget, category } => {
            let mut budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).delete,
                "delete categories",
                &budget,
            )?;
            let mut category = find_category(&mut budget, category).await?;
            category.delete().await?;
            tracing::info!("deleted category #{} {}", category.id(), category.name());
        }
    }
    Ok(())
}

async fn expense(api: &ApiClient, command: ExpenseCommand) -> Result<()> {
    match command {
        ExpenseCommand::Add(args) => {
            let mut budget = Budget::from_id(api, args.budget).await?;
            permit(
                Actions::for_level(budget.permissions()).add,
                "add expenses",
                &budget,
            )?;
            let mut category = find_category(&mut budget, args.category).await?;
            let expense = category
                .add_expense(ExpenseFields {
                    description: args.description,
                    amount: args.amount,
                    date: Some(args.date),
                })
                .await?;
            tracing::info!(
                "added expense #{} {} to {}",
                expense.id(),
                expense.amount(),
                category.name()
            );
        }
        ExpenseCommand::Edit(args) => {
            let mut budget = Budget::from_id(api, args.budget).await?;
            permit(
                Actions::for_level(budget.permissions()).edit,
                "edit expenses",
                &budget,
            )?;
            let mut category = find_category(&mut budget, args.category).await?;
            let mut expense = find_expense(&mut category, args.expense).await?;
            let fields = ExpenseFields {
                description: args
                    .description
                    .unwrap_or_else(|| expense.description().to_string()),
                amount: args.amount.unwrap_or(expense.amount()),
                date: Some(args.date.unwrap_or(expense.date())),
            };
            expense.update(fields).await?;
            tracing::info!(
                "expense #{} is now {} {} {}",
                expense.id(),
                expense.date(),
                expense.description(),
                expense.amount()
            );
        }
        ExpenseCommand::Delete {
            budget,
            category,
            expense,
        } => {
            let mut budget = Budget::from_id(api, budget).await?;
            permit(
                Actions::for_level(budget.permissions()).delete,
                "delete expenses",
                &budget,
            )?;
            let mut category = find_category(&mut budget, category).await?;
            let mut expense = find_expense(&mut category, expense).await?;
            expense.delete().await?;
            tracing::info!("deleted expense #{} from {}", expense.id(), category.name());
        }
    }
    Ok(())
}
