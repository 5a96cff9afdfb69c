//! HTTP client of the budget tracker: typed endpoints, the entity model and
//! the polling views that keep a rendered tree in step with the server.

pub use api::ApiClient;
pub use error::{ClientError, Result};
pub use model::{Budget, Category, Expense, ExpenseFields, amount_from_wire};
pub use poll::{PollEvent, PollStats, Poller, Refresh, RefreshGuard, RefreshTicket};
pub use source::CollectionSource;
pub use sync::{BudgetListView, BudgetPass, BudgetView};

mod api;
mod error;
mod model;
pub mod poll;
mod source;
mod sync;
pub mod timeline;
