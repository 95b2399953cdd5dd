#![deny(warnings)]

//! Headless CLI: assembles a demo nation snapshot, validates it, and runs
//! one sanction simulation against it.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use sim_core::{validate_snapshot, Nation, NationId, SanctionCategory, SimConfig};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct CliArgs {
    sanctioner: String,
    target: String,
    category: String,
    seed: u64,
}

fn parse_args() -> CliArgs {
    let mut args = CliArgs {
        sanctioner: "USA".to_string(),
        target: "RUS".to_string(),
        category: "trade-ban".to_string(),
        seed: 42,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--sanctioner" => {
                if let Some(v) = it.next() {
                    args.sanctioner = v;
                }
            }
            "--target" => {
                if let Some(v) = it.next() {
                    args.target = v;
                }
            }
            "--category" => {
                if let Some(v) = it.next() {
                    args.category = v;
                }
            }
            "--seed" => {
                if let Some(v) = it.next().and_then(|s| s.parse().ok()) {
                    args.seed = v;
                }
            }
            _ => {}
        }
    }
    args
}

fn nation(id: &str, gdp_billions: i64, affinities: &[(&str, i32)]) -> Nation {
    Nation {
        id: NationId(id.to_string()),
        gdp_usd: Decimal::new(gdp_billions, 0),
        affinities: affinities
            .iter()
            .map(|&(other, score)| (NationId(other.to_string()), score))
            .collect(),
    }
}

/// Seven-nation demo snapshot with GDP in USD billions.
fn demo_nations() -> Vec<Nation> {
    vec![
        nation(
            "USA",
            27_000,
            &[
                ("CHN", -40),
                ("DEU", 80),
                ("JPN", 85),
                ("IND", 55),
                ("RUS", -75),
                ("BRA", 45),
            ],
        ),
        nation(
            "CHN",
            18_000,
            &[
                ("USA", -40),
                ("DEU", 35),
                ("JPN", 10),
                ("IND", -15),
                ("RUS", 65),
                ("BRA", 50),
            ],
        ),
        nation(
            "DEU",
            4_500,
            &[
                ("USA", 80),
                ("CHN", 30),
                ("JPN", 60),
                ("IND", 40),
                ("RUS", -60),
                ("BRA", 35),
            ],
        ),
        nation(
            "JPN",
            4_200,
            &[
                ("USA", 85),
                ("CHN", 5),
                ("DEU", 60),
                ("IND", 50),
                ("RUS", -45),
                ("BRA", 30),
            ],
        ),
        nation(
            "IND",
            3_700,
            &[
                ("USA", 55),
                ("CHN", -20),
                ("DEU", 45),
                ("JPN", 50),
                ("RUS", 40),
                ("BRA", 35),
            ],
        ),
        nation(
            "RUS",
            2_000,
            &[
                ("USA", -75),
                ("CHN", 65),
                ("DEU", -55),
                ("JPN", -40),
                ("IND", 45),
                ("BRA", 25),
            ],
        ),
        nation(
            "BRA",
            2_200,
            &[
                ("USA", 45),
                ("CHN", 55),
                ("DEU", 35),
                ("JPN", 30),
                ("IND", 35),
                ("RUS", 20),
            ],
        ),
    ]
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(git_sha = env!("GIT_SHA"), "starting sanctions CLI");

    let nations = demo_nations();
    validate_snapshot(&nations)?;

    let category: SanctionCategory = args.category.parse()?;
    let cfg = SimConfig {
        rng_seed: args.seed,
    };
    let record = sim_sanctions::simulate_seeded(
        &NationId(args.sanctioner),
        &NationId(args.target),
        category,
        &nations,
        Utc::now(),
        cfg.rng_seed,
    )?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    println!(
        "Impact | target loss: {:.2}% | sanctioner cost: {:.2}% | cascade: {} | substitutes: {} | recovery: {}y",
        record.direct.target_loss_pct,
        record.direct.sanctioner_cost_pct,
        record.cascade.len(),
        record.substitutions.len(),
        record.recovery_years
    );

    Ok(())
}
