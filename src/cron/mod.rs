use crate::state::AppState;
use crate::utils::cron::build_cron_expr;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_cron_scheduler::{Job, JobScheduler};

mod refresh_matches;

pub async fn start_cron_jobs(state: Arc<AppState>) -> JobScheduler {
    let scheduler = JobScheduler::new().await.unwrap();

    /*
     * ------------------------------------------------------------
     * Initial delayed run after server restart
     * ------------------------------------------------------------
     */
    {
        let state = state.clone();
        tokio::spawn(async move {
            tracing::info!(
                "🚀 Server restarted, waiting 30 seconds before first refresh_matches..."
            );
            sleep(Duration::from_secs(30)).await;

            tracing::info!("🔎 Running initial refresh_matches...");
            refresh_matches::run(state).await;
        });
    }

    /*
     * ------------------------------------------------------------
     * refresh_matches cron
     * ------------------------------------------------------------
     */

    let (desc, cron_expr) = build_cron_expr(state.config.cron.refresh_matches.seconds);

    tracing::info!("📅 Scheduling refresh_matches cron: {} → {}", desc, cron_expr);

    scheduler
        .add(
            Job::new_async(&cron_expr, {
                let state = state.clone();
                move |_uuid, _l| {
                    let state = state.clone();
                    Box::pin(async move {
                        refresh_matches::run(state).await;
                    })
                }
            })
            .unwrap(),
        )
        .await
        .unwrap();

    /*
     * ------------------------------------------------------------
     * Start scheduler
     * ------------------------------------------------------------
     */

    scheduler.start().await.unwrap();
    scheduler
}
