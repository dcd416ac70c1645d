pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod tasks;

#[cfg(test)]
mod test_support;

use tokio_util::sync::CancellationToken;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::services::question_bank::PracticeCatalog;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let root = CancellationToken::new();
    let catalog = PracticeCatalog::builtin();
    tracing::info!(tests = catalog.tests().len(), "Practice catalog loaded");

    let state = AppState::new(settings, catalog, root.clone());
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "ExamEval API listening"
    );

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(core::shutdown::shutdown_signal(root.clone()))
        .await;

    root.cancel();
    result?;

    Ok(())
}
