mod platform;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "dashboard", version, about = "Regulatory news dashboard client")]
struct Cli {
    /// RON configuration file.
    #[arg(long, default_value = "dashboard.ron")]
    config: PathBuf,
    /// Root of the remote API, e.g. http://localhost:8000/api/.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    user_id: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::run_app(platform::LaunchOptions {
        config_path: cli.config,
        api_url: cli.api_url,
        user_id: cli.user_id,
    })
}
