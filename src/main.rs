use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use indesign_mcp::{cli::Cli, logging, server, Config, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut cfg = Config::load()?;
    // CLI flags win over rc file and environment
    if let Some(app) = &args.app {
        cfg.set("INDESIGN_APP", app.clone());
    }
    if let Some(secs) = args.timeout {
        cfg.set("SCRIPT_TIMEOUT", secs.to_string());
    }
    if let Some(dir) = &args.scratch_dir {
        cfg.set("SCRATCH_DIR", dir.to_string_lossy().into_owned());
    }

    logging::init(&cfg.log_level());

    let dispatcher = Dispatcher::from_config(&cfg)?;

    if args.list_tools {
        println!("{}", serde_json::to_string_pretty(&dispatcher.tools())?);
        return Ok(());
    }

    let arguments: serde_json::Value = serde_json::from_str(&args.args)
        .with_context(|| format!("invalid --args json: {}", args.args))?;

    if let Some(name) = &args.render {
        print!("{}", dispatcher.render(name, &arguments)?);
        return Ok(());
    }

    if let Some(name) = &args.call {
        println!("{}", dispatcher.invoke(name, &arguments).await?);
        return Ok(());
    }

    info!(
        app = %cfg.app_name(),
        scratch_dir = %cfg.scratch_dir().display(),
        config = %cfg.config_path.display(),
        "serving MCP on stdio"
    );
    server::run_stdio(dispatcher).await
}
