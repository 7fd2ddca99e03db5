//! Command Line Interface for the LP impermanent loss estimator.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use lp_il_api::{ApiServer, AppState, ServerConfig};
use lp_il_data::{ChainRegistry, CoinGeckoClient, DataQuality, EvmPoolReader, PoolAnalyzer};
use lp_il_domain::metrics::{fees, impermanent_loss};
use lp_il_domain::position::decimal_input;
use lp_il_domain::{FeeRecord, PoolKind, Position, PriceMovement};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(name = "lp-il")]
#[command(about = "Impermanent loss and fee APR estimator for LP positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate IL and APR for an explicit position (no external data)
    Calculate {
        /// Token0 amount at deposit
        #[arg(long)]
        amount0: f64,

        /// Token1 amount at deposit
        #[arg(long)]
        amount1: f64,

        /// Token0 USD price at deposit
        #[arg(long)]
        price0: f64,

        /// Token1 USD price at deposit
        #[arg(long)]
        price1: f64,

        /// Current token0/token1 price ratio vs deposit (1.0 = unchanged)
        #[arg(long)]
        ratio: f64,

        /// Fees earned so far (USD)
        #[arg(long, default_value_t = 0.0)]
        fees: f64,

        /// Days the position has been held
        #[arg(long)]
        days: f64,
    },
    /// Print IL estimates for common price-move scenarios
    Scenarios {
        /// Token weights, comma separated (e.g. 50,50 or 80,20)
        #[arg(long, value_delimiter = ',', default_value = "50,50")]
        weights: Vec<f64>,
    },
    /// Estimate IL and fee APR for an on-chain pool
    Estimate {
        /// LP pool address
        #[arg(long)]
        pool: String,

        /// Chain id (1 = Ethereum, 8453 = Base, ...)
        #[arg(long, default_value_t = 1)]
        chain: u64,

        /// Trailing window in hours
        #[arg(long, default_value_t = 24.0)]
        window_hours: f64,

        /// Pool family (uniswap-v2, uniswap-v3, sushiswap, balancer-weighted, curve-stable)
        #[arg(long, default_value = "uniswap-v2")]
        pool_type: String,

        /// Token weights, comma separated
        #[arg(long, value_delimiter = ',')]
        weights: Option<Vec<f64>>,
    },
    /// Run the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            amount0,
            amount1,
            price0,
            price1,
            ratio,
            fees,
            days,
        } => {
            let position = Position::new(
                decimal_input(amount0, "amount0")?,
                decimal_input(amount1, "amount1")?,
                decimal_input(price0, "price0")?,
                decimal_input(price1, "price1")?,
            )?;
            let movement = PriceMovement::new(decimal_input(ratio, "ratio")?)?;
            let fee_record =
                FeeRecord::new(decimal_input(fees, "fees")?, decimal_input(days, "days")?)?;

            let report =
                impermanent_loss::constant_product_report(&position, &movement, &fee_record)?;

            println!("\n📊 Position Report");
            println!("════════════════════════════════════");
            println!("Initial Value:   ${:.2}", report.initial_value_usd);
            println!("Hold Value:      ${:.2}", report.hodl_value_usd);
            println!("Current Value:   ${:.2}", report.current_value_usd);
            println!("IL:              ${:.2} ({:.2}%)", report.il_usd, report.il_percentage);
            println!("Fee APR:         {:.2}%", report.fee_apr);
            println!("Net APR:         {:.2}%", report.net_apr);
            println!("════════════════════════════════════");
            println!("💡 {}", report.recommendation);
            if fee_record.is_short_window() {
                println!("⚠️  Held under one day - annualized figures amplify noise");
            }
        }
        Commands::Scenarios { weights } => {
            let weights = to_decimals(&weights, "weights")?;
            let rows = impermanent_loss::scenario_estimates(&weights)?;

            println!("\n📉 IL Scenarios (weights {weights:?})");
            println!("{:<20} | {:<8} | {:<10}", "Scenario", "Ratio", "IL %");
            println!("{}", "-".repeat(44));
            for row in rows {
                println!(
                    "{:<20} | {:<8} | {:<10.4}",
                    row.label, row.price_ratio, row.il_percent
                );
            }
        }
        Commands::Estimate {
            pool,
            chain,
            window_hours,
            pool_type,
            weights,
        } => {
            let pool_kind = PoolKind::from_str(&pool_type)
                .ok_or_else(|| anyhow!("unknown pool type '{pool_type}'"))?;
            let window = decimal_input(window_hours, "window_hours")?;
            let weights = weights
                .as_deref()
                .map(|w| to_decimals(w, "weights"))
                .transpose()?;

            let registry = ChainRegistry::from_env();
            let endpoint = registry.endpoint(chain)?;
            let http = reqwest::Client::new();

            println!("🔍 Analyzing pool {pool} on {} ({window_hours}h window)...", endpoint.name);
            let analyzer = PoolAnalyzer::new(
                EvmPoolReader::new(http.clone(), endpoint.rpc_url.clone()),
                CoinGeckoClient::new(http),
                endpoint,
            );
            let analysis = analyzer.analyze(&pool, window, pool_kind, weights).await?;

            let ratios = [analysis.price_ratio0, analysis.price_ratio1];
            let (il_percent, fallback_note) =
                impermanent_loss::pool_il_percent_or_approximation(&analysis.context, &ratios)?;
            let fee_apr = fees::pool_fee_apr(
                analysis.context.volume_window_usd,
                analysis.context.fee_rate,
                analysis.context.tvl_usd,
                window,
            )?;

            println!("\n📊 Pool Estimate");
            println!("════════════════════════════════════");
            println!("Pair:            {} / {}", analysis.token0.symbol, analysis.token1.symbol);
            println!("Pool Type:       {}", analysis.context.pool_kind.as_str());
            println!("TVL:             ${:.2}", analysis.context.tvl_usd);
            println!("Volume (est):    ${:.2}", analysis.context.volume_window_usd);
            println!("Fee Tier:        {:.2}%", analysis.context.fee_tier_percent());
            println!(
                "Price Moves:     {} {:.4}x, {} {:.4}x",
                analysis.token0.symbol,
                analysis.price_ratio0,
                analysis.token1.symbol,
                analysis.price_ratio1
            );
            println!("IL:              {:.2}%", il_percent);
            println!("Fee APR (est):   {:.2}%", fee_apr);
            let velocity = fees::fee_velocity(
                analysis.context.volume_window_usd,
                analysis.context.tvl_usd,
                window,
            )?;
            println!("Fee Velocity:    {:.2}x TVL/yr", velocity);
            println!("════════════════════════════════════");

            println!("\nAPR by fee tier at this volume:");
            for (tier, apr) in fees::compare_fee_tiers(
                analysis.context.volume_window_usd,
                analysis.context.tvl_usd,
                window,
            )? {
                println!("  {tier:<6} -> {apr:.2}%");
            }
            if let Some(note) = fallback_note {
                println!("⚠️  {note}");
            }
            if analysis.data_quality == DataQuality::Limited {
                println!("⚠️  Limited historical data - estimates may be less accurate");
            }
        }
        Commands::Serve => {
            let server = ApiServer::new(ServerConfig::from_env(), AppState::from_env());
            server.serve().await?;
        }
    }

    Ok(())
}

fn to_decimals(values: &[f64], field: &str) -> Result<Vec<Decimal>> {
    values
        .iter()
        .map(|v| decimal_input(*v, field).map_err(Into::into))
        .collect()
}
