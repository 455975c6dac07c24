//! Prints a small account overview.
//!
//! Public endpoints run as-is; signed endpoints run only when
//! `KUCOIN_API_KEY`, `KUCOIN_API_SECRET` and `KUCOIN_API_PASSPHRASE` are
//! set (a `.env` file works too).

use std::env;
use std::time::Duration;

use kucoin::{retry_async, Credentials, KucoinRestClient};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let public = KucoinRestClient::spot(None);

    let time = retry_async(3, Duration::from_millis(500), || public.server_time()).await?;
    info!("KuCoin server time: {}", time);

    let symbols = public.symbols().await?;
    info!("{} trading pairs listed", symbols.len());

    let (Ok(key), Ok(secret), Ok(passphrase)) = (
        env::var("KUCOIN_API_KEY"),
        env::var("KUCOIN_API_SECRET"),
        env::var("KUCOIN_API_PASSPHRASE"),
    ) else {
        warn!("KuCoin credentials not set; skipping signed endpoints");
        return Ok(());
    };

    let client = KucoinRestClient::spot(Some(Credentials::new(key, secret, passphrase)));

    for account in client.accounts(None, Some("trade")).await? {
        info!(
            "{}: available {} (holds {})",
            account.currency, account.available, account.holds
        );
    }

    let fills = client.fills_all_pages(None, None, Some(2)).await?;
    info!("{} fills across the first two pages", fills.len());

    Ok(())
}
