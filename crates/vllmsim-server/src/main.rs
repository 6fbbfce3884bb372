use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vllmsim_core::{Config, LoraModule, Mode};
use vllmsim_server::{run_server, AppState};

/// vLLM-compatible inference server simulator.
#[derive(Parser, Debug)]
#[command(name = "vllmsim")]
#[command(about = "Simulates an OpenAI/vLLM-compatible serving endpoint without running a model")]
#[command(version)]
struct Args {
    /// Base model name to serve
    #[arg(long)]
    model: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Capacity of the dynamically-loaded LoRA adapter set
    #[arg(long, default_value_t = 1)]
    max_loras: usize,

    /// LoRA adapters servable at startup; repeatable, each a JSON object
    /// with at least "name"
    #[arg(long = "lora-modules", value_parser = parse_lora_module)]
    lora_modules: Vec<LoraModule>,

    /// Maximum concurrent sequences: worker count and admission-queue bound
    #[arg(long, default_value_t = 5)]
    max_num_seqs: usize,

    /// Maximum prompt + completion tokens per request (0 disables the check)
    #[arg(long, default_value_t = 1024)]
    max_model_len: usize,

    /// Response synthesis mode
    #[arg(long, value_enum, default_value_t = Mode::Random)]
    mode: Mode,

    /// Mean time to first token, in milliseconds
    #[arg(long, default_value_t = 0)]
    time_to_first_token: u64,

    /// Standard deviation of the time to first token, in milliseconds
    #[arg(long, default_value_t = 0)]
    time_to_first_token_std_dev: u64,

    /// Mean delay between streamed tokens, in milliseconds
    #[arg(long, default_value_t = 0)]
    inter_token_latency: u64,

    /// Standard deviation of the inter-token delay, in milliseconds
    #[arg(long, default_value_t = 0)]
    inter_token_latency_std_dev: u64,

    /// Mean KV-cache transfer latency for remote-prefill requests, in
    /// milliseconds
    #[arg(long, default_value_t = 0)]
    kv_cache_transfer_latency: u64,

    /// Standard deviation of the KV-cache transfer latency, in milliseconds
    #[arg(long, default_value_t = 0)]
    kv_cache_transfer_latency_std_dev: u64,
}

fn parse_lora_module(raw: &str) -> Result<LoraModule, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid LoRA module {raw:?}: {err}"))
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            model: args.model,
            lora_modules: args.lora_modules,
            max_loras: args.max_loras,
            max_num_seqs: args.max_num_seqs,
            max_model_len: args.max_model_len,
            mode: args.mode,
            port: args.port,
            time_to_first_token: args.time_to_first_token,
            time_to_first_token_std_dev: args.time_to_first_token_std_dev,
            inter_token_latency: args.inter_token_latency,
            inter_token_latency_std_dev: args.inter_token_latency_std_dev,
            kv_cache_transfer_latency: args.kv_cache_transfer_latency,
            kv_cache_transfer_latency_std_dev: args.kv_cache_transfer_latency_std_dev,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vllmsim=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from(Args::parse());
    config.validate()?;

    tracing::info!(
        model = %config.model,
        mode = %config.mode,
        max_num_seqs = config.max_num_seqs,
        max_model_len = config.max_model_len,
        max_loras = config.max_loras,
        lora_modules = config.lora_modules.len(),
        "starting simulator"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(config), shutdown.clone());

    run_server(state, addr, shutdown).await?;
    tracing::info!("server stopped");
    Ok(())
}
