use std::sync::Arc;

use client::{
    ApiClient, Budget, BudgetListView, BudgetView, ClientError, PollEvent, Poller, Refresh,
    timeline,
};
use tokio::sync::{Mutex, mpsc, watch};

use crate::{
    binder::{BudgetConsole, CategoryConsole, ExpenseConsole},
    error::Result,
    settings::Settings,
};

mod binder;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, command) = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "isometric={level},client={level},engine={level}",
            level = settings.level
        ))
        .init();
    tracing::debug!("loaded {settings:?}");

    let api = connect(&settings).await?;
    if let Some(command) = command {
        return commands::run(&api, command).await;
    }

    let shutdown = shutdown_on_ctrl_c();
    let poller = Poller::new(settings.poll_interval());

    match settings.budget {
        Some(budget_id) => watch_budget(api, budget_id, &settings, &poller, shutdown).await?,
        None => {
            tracing::info!("watching your budgets, ctrl-c to stop");
            let view = BudgetListView::new(api, BudgetConsole::default(), settings.update_policy());
            let view = drive(&poller, view, shutdown).await;
            let shown = view.lock().await.binder().shown();
            tracing::info!("{shown} budgets on screen at exit");
        }
    }

    Ok(())
}

async fn connect(settings: &Settings) -> Result<ApiClient> {
    let mut api = ApiClient::new(&settings.base_url, settings.request_timeout())?;
    if settings.register {
        api.register(&settings.username, &settings.password).await?;
        tracing::info!("registered {}", settings.username);
    } else {
        api.login(&settings.username, &settings.password).await?;
        tracing::info!("logged in as {}", settings.username);
    }
    Ok(api)
}

async fn watch_budget(
    api: ApiClient,
    budget_id: i64,
    settings: &Settings,
    poller: &Poller,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let budget = Budget::from_id(&api, budget_id).await?;
    tracing::info!(
        "watching budget \"{}\" as {}, ctrl-c to stop",
        budget.name(),
        budget.permissions()
    );

    match timeline::collect(&budget).await {
        Ok(timeline) => {
            for line in binder::timeline_lines(&timeline) {
                tracing::info!("{line}");
            }
        }
        Err(err) => tracing::warn!("timeline unavailable: {err}"),
    }

    let level = budget.permissions();
    let view = BudgetView::new(
        api,
        budget_id,
        CategoryConsole::new(level),
        ExpenseConsole::new(level),
        settings.update_policy(),
    );
    let view = drive(poller, view, shutdown).await;
    let view = view.lock().await;
    tracing::info!(
        "{} categories and {} expenses on screen at exit",
        view.category_binder().shown(),
        view.expense_binder().shown()
    );
    Ok(())
}

/// Polls `view` until shutdown, turning failed refreshes into notifications.
async fn drive<R>(poller: &Poller, view: R, shutdown: watch::Receiver<bool>) -> Arc<Mutex<R>>
where
    R: Refresh + Send + 'static,
{
    let target = Arc::new(Mutex::new(view));
    let (events, mut rx) = mpsc::channel(8);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PollEvent::Refreshed(_) => {}
                PollEvent::Failed(ClientError::Unauthorized) => {
                    tracing::error!("session expired, restart to log in again");
                }
                PollEvent::Failed(err) if err.is_transient() => {
                    tracing::warn!("server unreachable, retrying: {err}");
                }
                PollEvent::Failed(err) => tracing::error!("refresh rejected: {err}"),
            }
        }
    });

    let stats = poller.run(Arc::clone(&target), events, shutdown).await;
    tracing::debug!("{} refreshes, {} ticks skipped", stats.started, stats.skipped);
    target
}

fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutting down"),
            Err(err) => tracing::error!("failed to listen for ctrl-c, stopping: {err}"),
        }
        let _ = tx.send(true);
    });
    rx
}
