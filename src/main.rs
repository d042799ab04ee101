//! lookout - Entry point for the batch inbox scan

use anyhow::Context;

use lookout::config::Settings;
use lookout::domain::AccountId;
use lookout::providers::email::{GmailCredentials, GmailFetcher};
use lookout::services::ScanService;
use lookout::sinks::{AlertSink, LogSink, WebhookSink};
use lookout::storage::{Database, KeychainAccess, SqliteSeenStore};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting lookout");

    if let Err(e) = run().await {
        tracing::error!("Scan failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("load settings")?;

    let db = Database::open(settings.database_path()?)
        .await
        .context("open database")?;
    let seen = SqliteSeenStore::new(db);

    let account_id = AccountId::from(settings.account.clone());
    let keychain = KeychainAccess::new();

    // Credentials normally live in the OS keychain. Passing them through the
    // environment bootstraps a new installation: they are saved to the
    // keychain so later runs need no environment setup.
    let mut fetcher = match credentials_from_env() {
        Some(credentials) => {
            let key = KeychainAccess::gmail_credentials_key(&account_id.0);
            let creds_json = serde_json::to_string(&credentials)?;
            if let Err(e) = keychain.store(&key, &creds_json).await {
                tracing::warn!("Could not save credentials to keychain: {}", e);
            }
            GmailFetcher::with_credentials(account_id, credentials)
        }
        None => GmailFetcher::new(account_id, keychain),
    };
    fetcher.authenticate().await.context("authenticate")?;

    let mut sinks: Vec<Box<dyn AlertSink>> =
        vec![Box::new(LogSink::new(settings.alert_log_path()?))];
    match &settings.notify.webhook_url {
        Some(url) => {
            sinks.push(Box::new(WebhookSink::new(url).context("webhook url")?));
        }
        None => {
            tracing::info!("No webhook configured, alerts will only be logged locally");
        }
    }

    let service = ScanService::new(
        fetcher,
        settings.detection_rules(),
        seen,
        sinks,
        settings.max_results,
    );

    let summary = service.run_once().await?;

    if !summary.is_clean() {
        tracing::warn!(
            failures = summary.sink_failures,
            "some alert deliveries failed"
        );
    }

    Ok(())
}

/// Reads Gmail OAuth credentials from the environment, if all three
/// variables are set.
fn credentials_from_env() -> Option<GmailCredentials> {
    let client_id = std::env::var("GMAIL_CLIENT_ID").ok()?;
    let client_secret = std::env::var("GMAIL_CLIENT_SECRET").ok()?;
    let refresh_token = std::env::var("GMAIL_REFRESH_TOKEN").ok()?;

    Some(GmailCredentials {
        client_id,
        client_secret,
        refresh_token,
    })
}
