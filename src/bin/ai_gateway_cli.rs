//! AI-Gateway CLI — 查看可用 Provider、健康检查、发起一次生成请求的命令行工具
//!
//! Usage:
//!   ai-gateway-cli providers [--config <yaml>]                      List selectable providers
//!   ai-gateway-cli health [--config <yaml>]                         Show health report
//!   ai-gateway-cli generate <prompt> [--timeout-secs <n>] [--config <yaml>]

use ai_gateway::{Gateway, GatewayConfig, HealthStatus, RequestContext, UnifiedRequest};
use anyhow::{bail, Context};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "providers" => cmd_providers(&args[2..]),
        "health" => cmd_health(&args[2..]),
        "generate" => cmd_generate(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"ai-gateway-cli — AI-Gateway 命令行工具

USAGE:
    ai-gateway-cli <COMMAND> [OPTIONS]

COMMANDS:
    providers                   List selectable providers in precedence order
    health                      Show gateway health
    generate <prompt>           Send one prompt through the failover chain
    version                     Show version information
    help                        Show this help message

OPTIONS:
    --config <path>             YAML configuration file (default: environment)
    --timeout-secs <n>          Deadline for `generate`

ENVIRONMENT:
    <PROVIDER>_API_KEY, TENCENT_SECRET_ID, TENCENT_SECRET_KEY, ...
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn cmd_version() {
    println!("ai-gateway-cli {}", env!("CARGO_PKG_VERSION"));
}

fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Arguments that are neither flags nor flag values.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "--timeout-secs" {
            iter.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn load_gateway(args: &[String]) -> anyhow::Result<Gateway> {
    let config = match flag_value(args, "--config") {
        Some(path) => GatewayConfig::from_yaml_file(PathBuf::from(path))
            .with_context(|| format!("loading {path}"))?,
        None => GatewayConfig::from_env().context("reading environment")?,
    };
    Ok(Gateway::from_config(&config)?)
}

fn cmd_providers(args: &[String]) -> anyhow::Result<()> {
    let gateway = load_gateway(args)?;
    let services = gateway.available_services();
    if services.is_empty() {
        println!("No providers configured.");
        return Ok(());
    }
    for (idx, svc) in services.iter().enumerate() {
        println!(
            "{:>2}. {:<12} {:<40} [{}]",
            idx + 1,
            svc.service.as_str(),
            svc.description,
            svc.models.join(", ")
        );
    }
    Ok(())
}

fn cmd_health(args: &[String]) -> anyhow::Result<()> {
    let gateway = load_gateway(args)?;
    let report = gateway.health();
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.status == HealthStatus::Unhealthy {
        std::process::exit(2);
    }
    Ok(())
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let prompt = positional(args).join(" ");
    if prompt.trim().is_empty() {
        bail!("generate requires a prompt");
    }

    let gateway = load_gateway(args)?;

    let token = CancellationToken::new();
    let mut ctx = RequestContext::new().with_cancellation(token.clone());
    if let Some(raw) = flag_value(args, "--timeout-secs") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("invalid --timeout-secs '{raw}'"))?;
        ctx = ctx.with_timeout(Duration::from_secs(secs));
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let request = UnifiedRequest::from_prompt(prompt);
    let response = gateway.generate_text(&ctx, &request).await?;
    println!("{}", response.first_content().unwrap_or_default());
    eprintln!(
        "[{} | {} tokens]",
        response.model, response.usage.total_tokens
    );
    Ok(())
}
