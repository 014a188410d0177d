//! EQIV service board simulator.
//!
//! Replays a board session (connect, create requests, bid, browse) against the
//! mock wallet provider, printing each step the way the page would report it
//! and the final ledger as JSON.

mod script;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use eqiv_common::board::Board;
use eqiv_common::category::CategoryFilter;
use eqiv_common::config::{BoardConfig, DEFAULT_CHAIN_ID};
use eqiv_common::connection::ConnectOutcome;
use eqiv_common::currency::format_amount;
use eqiv_common::environment::RuntimeContext;
use eqiv_common::media::MediaItem;
use eqiv_common::provider::mock::MockWalletProvider;
use eqiv_common::request::{RequestId, ServiceRequest};
use eqiv_common::BoardError;

use script::{raw_input, Step};

const DESKTOP_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";
const MOBILE_UA: &str =
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Mobile Safari/537.36";

/// Shorthand for a runtime context.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum EnvArg {
    /// Wallet extension injected into a desktop browser.
    Extension,
    /// Mobile browser without a wallet.
    Mobile,
    /// Desktop browser without a wallet.
    Desktop,
}

#[derive(Parser)]
#[command(name = "eqiv-sim", about = "Replay a service board session against a mock wallet")]
struct Cli {
    /// Runtime shorthand; overrides --user-agent and --no-provider.
    #[arg(long, value_enum)]
    environment: Option<EnvArg>,

    /// User agent used for environment detection.
    #[arg(long, env = "EQIV_USER_AGENT", default_value = DESKTOP_UA)]
    user_agent: String,

    /// Simulate a page without an injected wallet provider.
    #[arg(long)]
    no_provider: bool,

    /// Account the mock wallet hands out.
    #[arg(long, env = "EQIV_ACCOUNT", default_value = "0xABCD...1234")]
    account: String,

    /// Chain the mock wallet starts on.
    #[arg(long, default_value_t = DEFAULT_CHAIN_ID)]
    chain_id: u64,

    /// Chain the board expects.
    #[arg(long, env = "EQIV_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    expected_chain_id: u64,

    /// Page URL used for the mobile deep link.
    #[arg(long, env = "EQIV_DAPP_URL", default_value = "localhost:8080")]
    dapp_url: String,

    /// The mock wallet rejects the account request.
    #[arg(long)]
    reject_accounts: bool,

    /// The mock wallet rejects network switches.
    #[arg(long)]
    reject_switch: bool,

    /// JSON session script; the built-in demo runs when omitted.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Category for the final listing ("all" for everything).
    #[arg(long, default_value = "all")]
    filter: String,
}

impl Cli {
    fn runtime_context(&self) -> RuntimeContext {
        match self.environment {
            Some(EnvArg::Extension) => RuntimeContext::new(true, DESKTOP_UA),
            Some(EnvArg::Mobile) => RuntimeContext::new(false, MOBILE_UA),
            Some(EnvArg::Desktop) => RuntimeContext::new(false, DESKTOP_UA),
            None => RuntimeContext::new(!self.no_provider, self.user_agent.clone()),
        }
    }

    fn wallet(&self) -> MockWalletProvider {
        let mut wallet = MockWalletProvider::new(self.account.as_str(), self.chain_id);
        if self.reject_accounts {
            wallet = wallet.rejecting_accounts("User rejected the request.");
        }
        if self.reject_switch {
            wallet = wallet.rejecting_switch("User rejected the request.");
        }
        wallet
    }

    fn config(&self) -> BoardConfig {
        BoardConfig::default()
            .with_dapp_url(&self.dapp_url)
            .with_expected_chain_id(self.expected_chain_id)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let steps = match &cli.script {
        Some(path) => script::load(path)?,
        None => script::demo(),
    };
    let filter: CategoryFilter = cli
        .filter
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid --filter: {e}"))?;

    let ctx = cli.runtime_context();
    let mut board = Board::new(cli.config(), &ctx, Some(cli.wallet()));
    println!("environment: {}", board.connection().environment());

    for (n, step) in steps.iter().enumerate() {
        print!("[{n}] ");
        if let Err(err) = run_step(&mut board, step).await {
            tracing::warn!("step {n} failed: {err}");
            println!("notice: {}", err.user_notice());
        }
    }

    println!("--- requests ({filter:?}) ---");
    let currency = board.config().currency_label.clone();
    match board.list_requests(&filter) {
        Ok(requests) => {
            for request in requests {
                println!("{}", listing_line(request, &currency));
            }
        }
        Err(err) => println!("notice: {}", err.user_notice()),
    }

    println!("{}", board.ledger().export_json()?);
    Ok(())
}

async fn run_step(board: &mut Board<MockWalletProvider>, step: &Step) -> Result<(), BoardError> {
    match step {
        Step::Connect => match board.connect().await? {
            ConnectOutcome::Connected {
                address,
                chain_id,
                network_notice,
            } => {
                println!("connected {} on chain {chain_id}", address.truncated());
                if let Some(notice) = network_notice {
                    println!("notice: {notice}");
                }
            }
            ConnectOutcome::Redirect { url } => println!("redirect to {url}"),
            ConnectOutcome::AlreadyPending => println!("connect already pending"),
        },
        Step::SwitchNetwork { chain_id } => {
            board.connection().switch_network(*chain_id).await?;
            println!("switched to chain {chain_id}");
        }
        Step::Create { media, .. } => {
            let draft = step.draft().unwrap_or_default();
            let media: Vec<MediaItem> = media.iter().map(MediaItem::from).collect();
            let request = board.create_request(&draft, media)?;
            println!("created request {} ({})", request.id, request.title);
        }
        Step::Bid {
            request,
            id,
            amount,
            message,
        } => {
            let target = resolve(board, *id, *request);
            let bid = board.place_bid_input(target, &raw_input(amount), message.as_deref())?;
            println!("bid {} on request {target}", bid.amount);
        }
        Step::List { category } => {
            let filter: CategoryFilter = category.as_deref().unwrap_or("all").parse()?;
            let currency = board.config().currency_label.clone();
            let lines: Vec<String> = board
                .list_requests(&filter)?
                .map(|r| listing_line(r, &currency))
                .collect();
            println!("{} matching request(s)", lines.len());
            for line in lines {
                println!("    {line}");
            }
        }
        Step::Detail { request } => {
            let target = resolve(board, None, Some(*request));
            let detail = board.request_detail(target)?;
            println!(
                "{} | {} | {} | {} | by {} | {} bid(s)",
                detail.title,
                detail.category,
                detail.budget,
                detail.location,
                detail.requester,
                detail.bids.len()
            );
            for bid in &detail.bids {
                println!(
                    "    {} from {}{}",
                    bid.amount,
                    bid.bidder,
                    bid.message
                        .as_deref()
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

/// Turn a script reference into a request id. Positions past the end resolve
/// to an id no request has, so the board reports it as not found.
fn resolve(board: &Board<MockWalletProvider>, id: Option<u64>, position: Option<usize>) -> RequestId {
    if let Some(id) = id {
        return RequestId(id);
    }
    let ledger = board.ledger();
    let found = match position {
        Some(n) => ledger.iter().nth(n),
        None => ledger.iter().last(),
    };
    found.map(|r| r.id).unwrap_or(RequestId(0))
}

fn listing_line(request: &ServiceRequest, currency: &str) -> String {
    format!(
        "#{} {} [{}] {} @ {} ({} bid(s))",
        request.id,
        request.title,
        request.category.label(),
        format_amount(request.budget, currency),
        request.location,
        request.bid_count()
    )
}
