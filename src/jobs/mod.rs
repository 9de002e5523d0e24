use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::revocation_sweep_job(Arc::clone(&self)));
        tokio::spawn(Self::health_check_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Drop expired revocations (interval from config)
    async fn revocation_sweep_job(scheduler: Arc<Self>) {
        let period = scheduler.context.config.authentication.revocation_sweep_secs.max(1);
        let mut interval = interval(Duration::from_secs(period));

        loop {
            interval.tick().await;

            let removed = tasks::sweep_revoked_tokens(&scheduler.context).await;
            if removed > 0 {
                info!("Swept {} expired token revocations", removed);
            } else {
                debug!("Revocation sweep: nothing to remove");
            }
        }
    }

    /// Health check job (runs every 5 minutes)
    async fn health_check_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(300));

        loop {
            interval.tick().await;

            match tasks::health_check(&scheduler.context).await {
                Ok(()) => debug!("Health check passed"),
                Err(e) => error!("Health check failed: {}", e),
            }
        }
    }
}
