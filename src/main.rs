use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokendash::config::Settings;
use tokendash::dashboard::{Command as DashboardCommand, Dashboard, HELP};
use tokendash::host::{DevNetwork, DevNetworkConfig, LedgerHost, RpcHost, RpcHostConfig, DEV_CHAIN_ID};
use tokendash::identity::{Address, Keypair};
use tokendash::scripts::{self, DEPLOYED_TOKEN_ADDRESS};
use tokendash::storage::ChainStore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "tokendash", version, about = "ERC-20 token dashboard and dev scripts")]
struct Cli {
    /// Settings file (defaults to ./tokendash.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deploy the optimized token (200 OPT) from the first dev account
    Deploy,
    /// Deploy the simple token and run transfer/approve from the owner
    Simulate,
    /// Run the allowance journey on the deployed optimized token
    Walkthrough,
    /// Interactive dashboard
    Dashboard,
    /// Forget the saved development chain
    Reset,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Deploy => {
            let report = scripts::deploy(dev_network(&settings)?).await?;
            println!("{}", report);
        }
        Command::Simulate => {
            let report = scripts::simulate(dev_network(&settings)?).await?;
            println!("{}", report);
        }
        Command::Walkthrough => {
            let report = scripts::walkthrough(dev_network(&settings)?).await?;
            println!("{}", report);
        }
        Command::Dashboard => run_dashboard(&settings).await?,
        Command::Reset => {
            ChainStore::open(chain_dir(&settings))?.reset()?;
            println!("development chain reset");
        }
    }

    Ok(())
}

fn chain_dir(settings: &Settings) -> PathBuf {
    settings.data_dir.join("chain")
}

fn dev_network(settings: &Settings) -> CliResult<Arc<dyn LedgerHost>> {
    let network = DevNetwork::open(DevNetworkConfig::default(), chain_dir(settings))?;
    Ok(Arc::new(network))
}

async fn run_dashboard(settings: &Settings) -> CliResult<()> {
    let mut config = settings.client_config()?;
    let mut signer = settings.signer()?;

    let host: Arc<dyn LedgerHost> = match &settings.rpc_url {
        Some(url) => {
            info!(%url, "using JSON-RPC host");
            Arc::new(RpcHost::new(RpcHostConfig::new(url))?)
        }
        None => {
            info!(dir = %chain_dir(settings).display(), "using development network");
            if settings.chain_id.is_none() {
                config = config
                    .with_expected_chain_id(DEV_CHAIN_ID)
                    .with_network_name("development");
            }
            if config.token_address.is_none() {
                config = config.with_token_address(Address::parse(DEPLOYED_TOKEN_ADDRESS)?);
            }
            if signer.is_none() {
                signer = Keypair::dev_account(0);
            }
            dev_network(settings)?
        }
    };

    let mut dashboard = Dashboard::new(config);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<DashboardCommand>() {
            Ok(DashboardCommand::Quit) => break,
            Ok(DashboardCommand::Help) => println!("{}", HELP),
            Ok(DashboardCommand::Connect) => {
                dashboard.connect(host.clone(), signer.clone()).await;
            }
            Ok(command) => {
                dashboard.handle(command).await;
            }
            Err(e) => {
                println!("{}", e);
                continue;
            }
        }

        for notification in dashboard.poll_notifications() {
            println!("{}", notification);
        }
        println!("{}", dashboard.render());
    }

    Ok(())
}
