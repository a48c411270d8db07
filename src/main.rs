use screening_quiz::{
    config::{get_config, init_config, ExpiryPolicy},
    routes,
    services::question_bank_service::{CsvQuestionBank, QuestionBankProvider},
    AppState,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    init_config()?;
    let config = get_config();

    // Fail fast on a missing or malformed bank instead of on the first start.
    let bank = CsvQuestionBank::new(&config.question_bank_path);
    let questions = bank.load()?;
    info!(
        path = %bank.path().display(),
        questions = questions.len(),
        "Question bank loaded"
    );
    if questions.is_empty() {
        tracing::warn!("Question bank has no complete rows; every quiz start will be refused");
    }

    let app_state = AppState::from_config(config);

    if config.expiry_policy == ExpiryPolicy::AutoSubmit {
        let service = app_state.quiz_service.clone();
        let interval = Duration::from_secs(config.expiry_sweep_seconds.max(1));
        tokio::spawn(async move {
            loop {
                let sweeper = service.clone();
                match tokio::task::spawn_blocking(move || sweeper.sweep_expired()).await {
                    Ok(Ok(0)) => {}
                    Ok(Ok(n)) => info!(submitted = n, "Expired sessions auto-submitted"),
                    Ok(Err(e)) => tracing::error!("Expiry sweeper error: {:?}", e),
                    Err(e) => tracing::error!("Expiry sweeper task panicked: {:?}", e),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    let app = routes::create_router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
