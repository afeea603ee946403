use scout_core::settings::Configuration;
use serde_json::json;
use tracing::info;

use super::{print_json, Context};

pub fn show(ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.store.get();
    if ctx.json {
        return print_json(&json!({
            "path": ctx.store.path().display().to_string(),
            "config": config,
        }));
    }
    print!("{}", render(&config, &ctx.store.path().display().to_string()));
    Ok(())
}

/// Apply the requested changes, persist them, and point the client at the
/// new source. `use_remote` of `None` keeps the current mode.
pub fn set(ctx: &Context, use_remote: Option<bool>, api_url: Option<String>) -> anyhow::Result<()> {
    let config = apply(ctx.store.get(), use_remote, api_url);
    ctx.store.set(&config)?;
    ctx.client.reload(&config);
    info!(use_remote = config.use_remote, api_url = %config.api_base_url, "configuration saved");

    if ctx.json {
        return print_json(&config);
    }
    println!("Settings saved.");
    print!("{}", render(&config, &ctx.store.path().display().to_string()));
    Ok(())
}

/// Probe the backend. An explicit `api_url` is tested as a remote
/// configuration without being saved.
pub async fn test(ctx: &Context, api_url: Option<String>) -> anyhow::Result<()> {
    let config = match api_url {
        Some(url) => Configuration::remote(url),
        None => ctx.store.get(),
    };
    let status = ctx.client.test_connection(&config).await;

    if ctx.json {
        print_json(&status)?;
    } else {
        println!("{}", status.describe());
    }
    if !status.is_ok() {
        anyhow::bail!("connection test failed");
    }
    Ok(())
}

fn apply(mut config: Configuration, use_remote: Option<bool>, api_url: Option<String>) -> Configuration {
    if let Some(remote) = use_remote {
        config.use_remote = remote;
    }
    if let Some(url) = api_url {
        config.api_base_url = url;
    }
    config
}

fn render(config: &Configuration, path: &str) -> String {
    let mode = if config.use_remote { "remote" } else { "mock" };
    format!(
        "Data source:  {mode}\nAPI base URL: {}\nStored in:    {path}\n",
        config.api_base_url
    )
}
