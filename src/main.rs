/// Back-office API server
use anyhow::Context;
use backoffice_api::{auth::password, error, jobs, server, AppContext, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `hash-password <password>` prints a PHC hash for seeding the pw_hash column
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [command, plain] = args.as_slice() {
        if command == "hash-password" {
            println!("{}", password::hash_password(plain)?);
            return Ok(());
        }
    }

    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.logging.level, config.logging.json);

    print_banner();

    error::expose_internal_details(config.service.development);

    let ctx = AppContext::new(config)
        .await
        .context("Failed to initialize application context")?;
    let ctx = Arc::new(ctx);

    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    server::serve((*ctx).clone()).await?;

    Ok(())
}

fn init_tracing(default_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("backoffice_api={0},tower_http={0}", default_level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
    ____             __          _________
   / __ )____ ______/ /______   / __/ __(_)_______
  / __  / __ `/ ___/ //_/ __ \ / /_/ /_/ / ___/ _ \
 / /_/ / /_/ / /__/ ,< / /_/ // __/ __/ / /__/  __/
/_____/\__,_/\___/_/|_|\____//_/ /_/ /_/\___/\___/

        Back-office API v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
