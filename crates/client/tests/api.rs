use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};
use chrono::NaiveDate;
use serde_json::{Value, json};

use client::{
    ApiClient, Budget, BudgetListView, BudgetView, Category, ClientError, Expense, ExpenseFields,
    timeline,
};
use engine::{Binder, EngineError, Key, Keyed, MoneyCents, PermissionLevel, UpdatePolicy};

const TOKEN: &str = "token-alice";

struct BudgetRow {
    id: i64,
    name: String,
    permissions: i64,
    previous_id: Option<i64>,
    next_id: Option<i64>,
}

impl BudgetRow {
    fn info(&self) -> Value {
        json!({
            "name": self.name,
            "permissions": self.permissions,
            "previous_id": self.previous_id,
            "next_id": self.next_id,
        })
    }

    fn record(&self) -> Value {
        let mut record = self.info();
        record["id"] = json!(self.id);
        record
    }
}

struct CategoryRow {
    id: i64,
    budget_id: i64,
    name: String,
}

struct ExpenseRow {
    id: i64,
    budget_id: i64,
    category_id: i64,
    description: String,
    /// Decimal string as sent by the client, e.g. `12.50`.
    amount: String,
    date: String,
}

#[derive(Default)]
struct Mock {
    budgets: Vec<BudgetRow>,
    categories: Vec<CategoryRow>,
    expenses: Vec<ExpenseRow>,
    last_id: i64,
    fail_lists: bool,
    calls: Vec<String>,
    tokens: Vec<Option<String>>,
}

impl Mock {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn budget(&mut self, id: i64, name: &str, permissions: i64) -> i64 {
        self.last_id = self.last_id.max(id);
        self.budgets.push(BudgetRow {
            id,
            name: name.to_string(),
            permissions,
            previous_id: None,
            next_id: None,
        });
        id
    }

    fn link(&mut self, previous: i64, next: i64) {
        for row in &mut self.budgets {
            if row.id == previous {
                row.next_id = Some(next);
            }
            if row.id == next {
                row.previous_id = Some(previous);
            }
        }
    }

    fn category(&mut self, budget_id: i64, id: i64, name: &str) {
        self.last_id = self.last_id.max(id);
        self.categories.push(CategoryRow {
            id,
            budget_id,
            name: name.to_string(),
        });
    }

    fn expense(&mut self, (budget_id, category_id): (i64, i64), id: i64, amount: &str) {
        self.last_id = self.last_id.max(id);
        self.expenses.push(ExpenseRow {
            id,
            budget_id,
            category_id,
            description: format!("expense {id}"),
            amount: amount.to_string(),
            date: "2024-03-01".to_string(),
        });
    }
}

type Shared = Arc<Mutex<Mock>>;
type Reply = (StatusCode, Json<Value>);

fn ok(value: Value) -> Reply {
    (StatusCode::OK, Json(value))
}

fn done() -> Reply {
    ok(json!({ "status": "ok" }))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "error": message })))
}

fn not_found() -> Reply {
    fail(StatusCode::NOT_FOUND, "not found")
}

fn int(body: &Value, field: &str) -> i64 {
    body[field].as_i64().unwrap_or_default()
}

fn text(body: &Value, field: &str) -> String {
    body[field].as_str().unwrap_or_default().to_string()
}

async fn session(
    State(mock): State<Shared>,
    Path(action): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    let mut mock = mock.lock().unwrap();
    mock.calls.push(action.clone());
    match action.as_str() {
        "login" if text(&body, "username") == "alice" && text(&body, "password") == "secret" => {
            ok(json!({ "authtoken": TOKEN }))
        }
        "login" => fail(StatusCode::UNAUTHORIZED, "invalid credentials"),
        "register" if text(&body, "username") == "alice" => {
            fail(StatusCode::BAD_REQUEST, "username is taken")
        }
        "register" => ok(json!({ "authtoken": TOKEN })),
        "status" => ok(json!({ "status": "up" })),
        _ => not_found(),
    }
}

async fn dispatch(
    State(mock): State<Shared>,
    Path((group, action)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Reply {
    let mut guard = mock.lock().unwrap();
    let mock = &mut *guard;
    let token = body
        .get("authtoken")
        .and_then(Value::as_str)
        .map(str::to_string);
    mock.calls.push(format!("{group}/{action}"));
    mock.tokens.push(token.clone());

    if token.as_deref() != Some(TOKEN) {
        return fail(StatusCode::FORBIDDEN, "login required");
    }
    if mock.fail_lists && action == "list" {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }

    let budget_id = int(&body, "budget_id");
    let category_id = int(&body, "category_id");
    let expense_id = int(&body, "expense_id");

    match (group.as_str(), action.as_str()) {
        ("budget", "list") => {
            let budgets: Vec<Value> = mock.budgets.iter().map(BudgetRow::record).collect();
            ok(json!({ "budgets": budgets }))
        }
        ("budget", "info") => match mock.budgets.iter().find(|b| b.id == budget_id) {
            Some(budget) => ok(budget.info()),
            None => not_found(),
        },
        ("budget", "create") => {
            let name = text(&body, "budget_name");
            if mock.budgets.iter().any(|b| b.name == name) {
                return fail(StatusCode::BAD_REQUEST, "budget exists");
            }
            let id = mock.next_id();
            mock.budget(id, &name, 8);
            ok(json!({ "id": id }))
        }
        ("budget", "update") => match mock.budgets.iter_mut().find(|b| b.id == budget_id) {
            Some(budget) => {
                budget.name = text(&body, "budget_name").to_uppercase();
                done()
            }
            None => not_found(),
        },
        ("budget", "delete") => {
            let before = mock.budgets.len();
            mock.budgets.retain(|b| b.id != budget_id);
            if mock.budgets.len() == before {
                not_found()
            } else {
                done()
            }
        }
        ("category", "list") => {
            let categories: Vec<Value> = mock
                .categories
                .iter()
                .filter(|c| c.budget_id == budget_id)
                .map(|c| json!({ "id": c.id, "name": c.name }))
                .collect();
            ok(json!({ "categories": categories }))
        }
        ("category", "info") => match mock
            .categories
            .iter()
            .find(|c| c.budget_id == budget_id && c.id == category_id)
        {
            Some(category) => ok(json!({ "name": category.name })),
            None => not_found(),
        },
        ("category", "create") => {
            let id = mock.next_id();
            let name = text(&body, "category_name");
            mock.category(budget_id, id, &name);
            ok(json!({ "id": id }))
        }
        ("category", "update") => match mock
            .categories
            .iter_mut()
            .find(|c| c.budget_id == budget_id && c.id == category_id)
        {
            Some(category) => {
                category.name = text(&body, "category_name");
                done()
            }
            None => not_found(),
        },
        ("category", "delete") => {
            let before = mock.categories.len();
            mock.categories
                .retain(|c| !(c.budget_id == budget_id && c.id == category_id));
            if mock.categories.len() == before {
                not_found()
            } else {
                done()
            }
        }
        ("expense", "list") => {
            let expenses: Vec<Value> = mock
                .expenses
                .iter()
                .filter(|e| e.budget_id == budget_id && e.category_id == category_id)
                .map(|e| {
                    json!({
                        "id": e.id,
                        "description": e.description,
                        "amount": format!("${}", e.amount),
                        "date": e.date,
                    })
                })
                .collect();
            ok(json!({ "expenses": expenses }))
        }
        ("expense", "info") => match mock.expenses.iter().find(|e| e.id == expense_id) {
            // Plain number on purpose: both wire shapes must be accepted.
            Some(e) => ok(json!({
                "description": e.description,
                "amount": e.amount.parse::<f64>().unwrap_or_default(),
                "date": e.date,
            })),
            None => not_found(),
        },
        ("expense", "create") => {
            let id = mock.next_id();
            mock.expenses.push(ExpenseRow {
                id,
                budget_id,
                category_id,
                description: text(&body, "description"),
                amount: text(&body, "expense_amount"),
                date: text(&body, "expense_date"),
            });
            ok(json!({ "id": id }))
        }
        ("expense", "update") => match mock.expenses.iter_mut().find(|e| e.id == expense_id) {
            Some(expense) => {
                expense.description = text(&body, "description");
                expense.amount = text(&body, "expense_amount");
                expense.date = text(&body, "expense_date");
                done()
            }
            None => not_found(),
        },
        ("expense", "delete") => {
            let before = mock.expenses.len();
            mock.expenses.retain(|e| e.id != expense_id);
            if mock.expenses.len() == before {
                not_found()
            } else {
                done()
            }
        }
        _ => not_found(),
    }
}

async fn spawn_mock(mock: Mock) -> (ApiClient, Shared) {
    let shared = Arc::new(Mutex::new(mock));
    let app = Router::new()
        .route("/api/{action}", post(session))
        .route("/api/{group}/{action}", post(dispatch))
        .with_state(Arc::clone(&shared));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = ApiClient::new(&format!("http://{addr}/api"), Duration::from_secs(5)).unwrap();
    (api, shared)
}

async fn logged_in(mock: Mock) -> (ApiClient, Shared) {
    let (mut api, shared) = spawn_mock(mock).await;
    api.login("alice", "secret").await.unwrap();
    (api, shared)
}

fn calls(shared: &Shared) -> Vec<String> {
    std::mem::take(&mut shared.lock().unwrap().calls)
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

#[tokio::test]
async fn requests_carry_the_session_token_after_login() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    let (mut api, shared) = spawn_mock(mock).await;

    let err = Budget::list(&api).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));

    assert!(matches!(
        api.login("alice", "wrong").await,
        Err(ClientError::Unauthorized)
    ));
    assert!(!api.is_logged_in());

    api.login("alice", "secret").await.unwrap();
    let budgets = Budget::list(&api).await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].name(), "Home");
    assert_eq!(budgets[0].permissions(), PermissionLevel::Owner);

    let tokens = shared.lock().unwrap().tokens.clone();
    assert_eq!(tokens, vec![None, Some(TOKEN.to_string())]);
}

#[tokio::test]
async fn register_reports_taken_usernames() {
    let (mut api, _) = spawn_mock(Mock::default()).await;

    let err = api.register("alice", "secret").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(message) if message == "username is taken"));

    api.register("bob", "hunter2").await.unwrap();
    assert!(api.is_logged_in());
    assert_eq!(api.status().await.unwrap(), "up");
}

#[tokio::test]
async fn budget_update_adopts_the_server_copy() {
    let (api, shared) = logged_in(Mock::default()).await;

    let mut budget = Budget::create(&api, "  groceries ").await.unwrap();
    assert_eq!(budget.name(), "groceries");
    assert_eq!(budget.permissions(), PermissionLevel::Owner);

    calls(&shared);
    budget.update("weekly groceries").await.unwrap();

    // The mock stores names upper-cased; the local copy follows it.
    assert_eq!(budget.name(), "WEEKLY GROCERIES");
    assert_eq!(calls(&shared), vec!["budget/update", "budget/info"]);
}

#[tokio::test]
async fn server_errors_map_onto_client_errors() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    let (api, shared) = logged_in(mock).await;

    let err = Budget::create(&api, "Home").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(message) if message == "budget exists"));

    let err = Budget::from_id(&api, 99).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound));

    shared.lock().unwrap().fail_lists = true;
    let err = Budget::list(&api).await.unwrap_err();
    assert!(matches!(err, ClientError::Server(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn local_checks_run_before_any_request() {
    let mut mock = Mock::default();
    mock.budget(1, "Shared", 1);
    mock.category(1, 2, "Food");
    let (api, shared) = logged_in(mock).await;

    let mut budget = Budget::from_id(&api, 1).await.unwrap();
    calls(&shared);

    assert!(matches!(
        budget.update("Mine now").await,
        Err(ClientError::Forbidden)
    ));
    assert!(matches!(budget.delete().await, Err(ClientError::Forbidden)));
    assert!(matches!(
        budget.add_category("Rent").await,
        Err(ClientError::Forbidden)
    ));

    let mut category = Category::from_id(&api, 1, 2).await.unwrap();
    calls(&shared);
    let err = category
        .add_expense(ExpenseFields {
            description: "no date".to_string(),
            amount: MoneyCents::new(100),
            date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Engine(EngineError::Validation(_))
    ));
    assert!(matches!(
        category.update("   ").await,
        Err(ClientError::Engine(EngineError::Validation(_)))
    ));

    assert!(calls(&shared).is_empty());
}

#[tokio::test]
async fn viewers_cannot_touch_categories_or_expenses() {
    let mut mock = Mock::default();
    mock.budget(1, "Shared", 1);
    mock.category(1, 2, "Food");
    mock.expense((1, 2), 10, "4.00");
    let (api, shared) = logged_in(mock).await;

    let mut budget = Budget::from_id(&api, 1).await.unwrap();
    let mut food = budget.categories().await.unwrap()[0].clone();
    let mut lunch = food.expenses().await.unwrap()[0].clone();
    calls(&shared);

    let fields = ExpenseFields {
        description: "lunch".to_string(),
        amount: MoneyCents::new(900),
        date: Some(march(2)),
    };
    assert!(matches!(food.update("Groceries").await, Err(ClientError::Forbidden)));
    assert!(matches!(
        food.add_expense(fields.clone()).await,
        Err(ClientError::Forbidden)
    ));
    assert!(matches!(food.delete().await, Err(ClientError::Forbidden)));
    assert!(matches!(lunch.update(fields).await, Err(ClientError::Forbidden)));
    assert!(matches!(lunch.delete().await, Err(ClientError::Forbidden)));

    assert!(calls(&shared).is_empty());
    assert_eq!(shared.lock().unwrap().expenses.len(), 1);
}

#[tokio::test]
async fn editors_update_but_only_admins_delete() {
    let mut mock = Mock::default();
    mock.budget(1, "Shared", 2);
    mock.category(1, 2, "Food");
    let (api, shared) = logged_in(mock).await;

    // Loaded on its own, the category learns its level from the budget once.
    let mut food = Category::from_id(&api, 1, 2).await.unwrap();
    calls(&shared);
    assert!(matches!(food.delete().await, Err(ClientError::Forbidden)));
    assert_eq!(food.permissions().await.unwrap(), PermissionLevel::Update);
    assert_eq!(calls(&shared), vec!["budget/info"]);

    food.update("Groceries").await.unwrap();
    assert_eq!(food.name(), "Groceries");
    assert_eq!(calls(&shared), vec!["category/update", "category/info"]);
}

#[tokio::test]
async fn back_references_are_read_once() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    mock.category(1, 2, "Food");
    mock.expense((1, 2), 10, "4.00");
    let (api, shared) = logged_in(mock).await;

    let mut coffee = Expense::from_id(&api, 1, 2, 10).await.unwrap();
    calls(&shared);
    assert_eq!(coffee.category().await.unwrap().name(), "Food");
    assert_eq!(coffee.category().await.unwrap().id(), 2);
    assert_eq!(coffee.budget().await.unwrap().name(), "Home");
    assert_eq!(
        coffee.budget().await.unwrap().permissions(),
        PermissionLevel::Owner
    );
    assert_eq!(calls(&shared), vec!["category/info", "budget/info"]);

    // Reached through the parents, nothing needs to be read at all.
    let mut budget = Budget::from_id(&api, 1).await.unwrap();
    let mut food = budget.categories().await.unwrap()[0].clone();
    let mut coffee = food.expenses().await.unwrap()[0].clone();
    calls(&shared);
    assert_eq!(food.budget().await.unwrap().id(), 1);
    assert_eq!(coffee.category().await.unwrap().name(), "Food");
    assert_eq!(coffee.budget().await.unwrap().name(), "Home");
    assert!(calls(&shared).is_empty());
}

#[tokio::test]
async fn added_categories_come_from_the_server() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    let (api, shared) = logged_in(mock).await;

    let mut budget = Budget::from_id(&api, 1).await.unwrap();
    calls(&shared);
    let mut rent = budget.add_category("  Rent ").await.unwrap();

    assert_eq!(rent.name(), "Rent");
    assert_eq!(calls(&shared), vec!["category/create", "category/info"]);
    assert_eq!(rent.budget().await.unwrap().id(), 1);
    assert!(calls(&shared).is_empty());
}

#[tokio::test]
async fn deleting_a_missing_entity_is_a_no_op() {
    let mut mock = Mock::default();
    mock.budget(1, "Old", 8);
    let (api, shared) = logged_in(mock).await;

    let budget = Budget::from_id(&api, 1).await.unwrap();
    budget.delete().await.unwrap();
    budget.delete().await.unwrap();

    assert!(shared.lock().unwrap().budgets.is_empty());
}

#[tokio::test]
async fn children_are_memoized_until_invalidated() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    mock.category(1, 2, "Food");
    let (api, shared) = logged_in(mock).await;

    let mut budget = Budget::from_id(&api, 1).await.unwrap();
    assert_eq!(budget.categories().await.unwrap().len(), 1);
    calls(&shared);

    // Created behind our back: the cached list does not see it.
    shared.lock().unwrap().category(1, 3, "Rent");
    assert_eq!(budget.categories().await.unwrap().len(), 1);
    assert!(calls(&shared).is_empty());

    budget.invalidate_categories();
    assert_eq!(budget.categories().await.unwrap().len(), 2);

    // Creating through the parent invalidates on its own.
    budget.add_category("Fun").await.unwrap();
    let names: Vec<String> = budget
        .categories()
        .await
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["Food", "Rent", "Fun"]);
}

#[tokio::test]
async fn expenses_round_trip_through_cents() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    mock.category(1, 2, "Food");
    let (api, shared) = logged_in(mock).await;

    let mut category = Category::from_id(&api, 1, 2).await.unwrap();
    let mut milk = category
        .add_expense(ExpenseFields {
            description: " milk ".to_string(),
            amount: MoneyCents::new(1250),
            date: Some(march(4)),
        })
        .await
        .unwrap();
    category
        .add_expense(ExpenseFields {
            description: "refund".to_string(),
            amount: MoneyCents::new(-325),
            date: Some(march(5)),
        })
        .await
        .unwrap();

    assert_eq!(milk.description(), "milk");
    assert_eq!(milk.amount(), MoneyCents::new(1250));
    assert_eq!(milk.date(), march(4));
    assert_eq!(shared.lock().unwrap().expenses[0].amount, "12.50");

    assert_eq!(category.total().await.unwrap(), MoneyCents::new(925));

    calls(&shared);
    milk.update(ExpenseFields {
        description: "oat milk".to_string(),
        amount: MoneyCents::new(299),
        date: Some(march(6)),
    })
    .await
    .unwrap();
    assert_eq!(calls(&shared), vec!["expense/update", "expense/info"]);
    assert_eq!(milk.amount().to_string(), "$2.99");

    milk.delete().await.unwrap();
    category.invalidate_expenses();
    let left: Vec<i64> = category
        .expenses()
        .await
        .unwrap()
        .iter()
        .map(Expense::id)
        .collect();
    assert_eq!(left.len(), 1);
}

#[derive(Default)]
struct Rows {
    live: Vec<Key>,
    removed: Vec<Key>,
}

impl Binder for Rows {
    type Entity = Category;
    type Handle = Key;

    fn on_create(&mut self, category: &Category) -> Key {
        self.live.push(category.key());
        category.key()
    }

    fn on_remove(&mut self, key: Key) {
        self.live.retain(|live| *live != key);
        self.removed.push(key);
    }
}

#[derive(Default)]
struct ExpenseRows {
    live: Vec<Key>,
}

impl Binder for ExpenseRows {
    type Entity = Expense;
    type Handle = Key;

    fn on_create(&mut self, expense: &Expense) -> Key {
        self.live.push(expense.key());
        expense.key()
    }

    fn on_remove(&mut self, key: Key) {
        self.live.retain(|live| *live != key);
    }
}

#[tokio::test]
async fn budget_view_follows_the_server() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    mock.category(1, 2, "Food");
    mock.category(1, 3, "Rent");
    mock.expense((1, 2), 10, "4.00");
    mock.expense((1, 3), 11, "900.00");
    let (api, shared) = logged_in(mock).await;

    let mut view = BudgetView::new(
        api.clone(),
        1,
        Rows::default(),
        ExpenseRows::default(),
        UpdatePolicy::Skip,
    );
    view.refresh().await.unwrap();
    assert_eq!(view.category_binder().live, vec!["2", "3"]);
    assert_eq!(view.expense_binder().live.len(), 2);

    // Server goes down: nothing changes on screen.
    shared.lock().unwrap().fail_lists = true;
    assert!(matches!(
        view.refresh().await,
        Err(ClientError::Server(_))
    ));
    assert_eq!(view.category_binder().live, vec!["2", "3"]);

    // Back up, with "Rent" gone and a new expense under "Food".
    {
        let mut mock = shared.lock().unwrap();
        mock.fail_lists = false;
        mock.categories.retain(|c| c.id != 3);
        mock.expenses.retain(|e| e.category_id != 3);
        mock.expense((1, 2), 12, "1.50");
    }
    let pass = view.refresh().await.unwrap();

    assert_eq!(pass.categories.removed, vec!["3".to_string()]);
    assert_eq!(pass.expenses.created, vec!["12".to_string()]);
    assert_eq!(view.category_binder().removed, vec!["3"]);
    let mut expenses = view.expense_binder().live.clone();
    expenses.sort();
    assert_eq!(expenses, vec!["10", "12"]);
}

#[derive(Default)]
struct BudgetRows {
    created: usize,
}

impl Binder for BudgetRows {
    type Entity = Budget;
    type Handle = String;

    fn on_create(&mut self, budget: &Budget) -> String {
        self.created += 1;
        budget.name().to_string()
    }

    fn on_remove(&mut self, _: String) {}
}

#[tokio::test]
async fn budget_list_view_sees_new_budgets() {
    let mut mock = Mock::default();
    mock.budget(1, "Home", 8);
    let (api, shared) = logged_in(mock).await;

    let mut view = BudgetListView::new(api, BudgetRows::default(), UpdatePolicy::Skip);
    view.refresh().await.unwrap();
    shared.lock().unwrap().budget(2, "Trip", 2);
    let report = view.refresh().await.unwrap();

    assert_eq!(report.created, vec!["2".to_string()]);
    assert_eq!(report.kept, vec!["1".to_string()]);
    assert_eq!(view.binder().created, 2);
    assert_eq!(view.state().get("2").map(String::as_str), Some("Trip"));
}

#[tokio::test]
async fn timeline_spans_the_budget_chain() {
    let mut mock = Mock::default();
    for (id, name) in [(1, "January"), (2, "February"), (3, "March")] {
        mock.budget(id, name, 8);
    }
    mock.link(1, 2);
    mock.link(2, 3);
    mock.category(1, 11, "Food");
    mock.category(2, 21, "Food");
    mock.category(2, 22, "Rent");
    mock.category(3, 31, "Rent");
    mock.expense((1, 11), 100, "10.00");
    mock.expense((2, 21), 101, "20.00");
    mock.expense((2, 21), 102, "2.50");
    mock.expense((2, 22), 103, "800.00");
    mock.expense((3, 31), 104, "850.00");
    let (api, _) = logged_in(mock).await;

    let february = Budget::from_id(&api, 2).await.unwrap();
    let timeline = timeline::collect(&february).await.unwrap();

    assert_eq!(timeline.labels, vec!["January", "February", "March"]);
    assert_eq!(timeline.series.len(), 2);
    assert_eq!(timeline.series[0].category, "Food");
    assert_eq!(
        timeline.series[0].values,
        vec![
            MoneyCents::new(1000),
            MoneyCents::new(2250),
            MoneyCents::ZERO
        ]
    );
    assert_eq!(timeline.series[1].category, "Rent");
    assert_eq!(
        timeline.series[1].values,
        vec![
            MoneyCents::ZERO,
            MoneyCents::new(80_000),
            MoneyCents::new(85_000)
        ]
    );
}

#[tokio::test]
async fn timeline_stops_at_link_cycles() {
    let mut mock = Mock::default();
    mock.budget(1, "A", 8);
    mock.budget(2, "B", 8);
    mock.link(1, 2);
    mock.link(2, 1);
    let (api, _) = logged_in(mock).await;

    let budget = Budget::from_id(&api, 1).await.unwrap();
    let timeline = timeline::collect(&budget).await.unwrap();

    assert_eq!(timeline.labels, vec!["B", "A"]);
    assert!(timeline.series.is_empty());
}
