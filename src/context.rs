/// Application context and dependency injection
use crate::{
    admin::{ApiKeyManager, EventManager, ItemManager, OperatorManager, UserManager},
    auth::{RevocationList, TokenIssuer, TokenService},
    config::ServerConfig,
    db,
    error::ApiResult,
    rate_limit::RateLimiter,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub tokens: TokenService,
    pub operators: OperatorManager,
    pub events: EventManager,
    pub items: ItemManager,
    pub users: UserManager,
    pub api_keys: ApiKeyManager,
    pub rate_limiter: RateLimiter,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let ctx = Self::with_pool(config, pool)?;
        ctx.bootstrap_operator().await?;

        Ok(ctx)
    }

    /// Build the context around an existing, migrated pool
    pub fn with_pool(config: ServerConfig, pool: SqlitePool) -> ApiResult<Self> {
        config.validate()?;

        let timeout = config.database.statement_timeout();
        let tokens = TokenService::new(
            TokenIssuer::new(
                &config.authentication.jwt_secret,
                config.authentication.token_ttl_hours,
            ),
            RevocationList::new(),
        );

        tracing::info!(
            token_ttl_secs = tokens.issuer().ttl_secs(),
            max_limit = config.listing.max_limit,
            "Application context initialized"
        );

        Ok(Self {
            operators: OperatorManager::new(pool.clone(), timeout),
            events: EventManager::new(pool.clone(), timeout),
            items: ItemManager::new(pool.clone(), timeout),
            users: UserManager::new(pool.clone(), timeout),
            api_keys: ApiKeyManager::new(pool.clone(), timeout),
            rate_limiter: RateLimiter::new(&config.rate_limit),
            tokens,
            db: pool,
            config: Arc::new(config),
        })
    }

    /// Create the configured superadmin if its username is not taken yet
    pub async fn bootstrap_operator(&self) -> ApiResult<()> {
        let Some(bootstrap) = &self.config.authentication.bootstrap else {
            return Ok(());
        };

        let created = self
            .operators
            .ensure_superadmin(&bootstrap.username, &bootstrap.password)
            .await?;

        if created {
            tracing::info!(username = %bootstrap.username, "Bootstrap operator created");
        } else {
            tracing::info!(username = %bootstrap.username, "Bootstrap operator already exists, left unchanged");
        }

        Ok(())
    }
}
