//! Simple example of using proxy-rotation-pool.

use proxy_rotation_pool::{shared, ResourcePoolConfig, ResourcePoolMiddleware};
use reqwest_middleware::ClientBuilder;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Initializing resource pool...");

    let config = ResourcePoolConfig::builder()
        .full_identities(true)
        .fetch_timeout(Duration::from_secs(20))
        .request_timeout(Duration::from_secs(5))
        .retry_count(2)
        .build();

    let middleware = ResourcePoolMiddleware::new(config).await?;

    let client = ClientBuilder::new(reqwest::Client::new())
        .with(middleware)
        .build();

    println!("Sending request...");
    let response = client.get("https://httpbin.org/ip").send().await?;

    println!("Status: {}", response.status());
    println!("Response: {}", response.text().await?);

    // Manual use of the same pool.
    let pool = shared().await?;
    let proxy = pool.acquire_proxy().await?;
    println!("Next proxy: {} as {}", proxy, pool.select_identity());
    pool.release_proxy(proxy).await;

    Ok(())
}
