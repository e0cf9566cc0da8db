use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;

use imds_fetch::config::{FetchConfig, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_TTL_SECS};
use imds_fetch::{app, output, utils};

#[derive(Parser)]
#[command(
    name = "imds-fetch",
    version,
    about = "Fetch EC2 instance metadata (IMDSv2) as JSON"
)]
struct AppCli {
    /// Fetch a single metadata key instead of the full tree
    #[arg(long)]
    key: Option<String>,

    /// Base URL of the metadata endpoint (e.g. http://169.254.169.254/latest/meta-data/)
    #[arg(long)]
    base_url: String,

    /// URL to request the session token from (e.g. http://169.254.169.254/latest/api/token)
    #[arg(long)]
    token_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Requested token lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_SECS)]
    token_ttl: u64,

    /// Abort tree walks that nest deeper than this many directories
    #[arg(long)]
    max_depth: Option<usize>,

    /// Log request details to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = AppCli::parse();
    utils::logging::init(args.verbose);

    let config = FetchConfig::new(args.base_url, args.token_url)
        .with_timeout(Duration::from_secs(args.timeout_secs))
        .with_token_ttl(args.token_ttl)
        .with_max_depth(args.max_depth);

    match app::run(config, args.key.as_deref()).await {
        Ok(rendered) => {
            println!("{}", rendered);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", output::error_line(&err));
            ExitCode::FAILURE
        }
    }
}
