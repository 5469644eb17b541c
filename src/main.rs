use clap::{Parser, Subcommand};
use moving_estimate::config::{EngineConfig, MissPolicy, ReferenceConfig};
use moving_estimate::estimate::{EstimateEngine, QuoteRequest};
use moving_estimate::location::{RegionLocalityKey, SnapshotCache};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Moving Estimate — distance and truck price for a move.
///
/// Addresses are given as REGION:LOCALITY, e.g. 13:Shinjuku or 01:Sapporo-shi.
///
/// Examples:
///   estimate distance --from 13:Shinjuku --to 27:Osaka-shi
///   estimate price --boxes 35
///   estimate quote --from 13:Shinjuku --to 27:Osaka-shi --package 1=2 --service 3
///   estimate --data lonlat.csv distance --from 13:Shinjuku --to 14:Yokohama-shi
#[derive(Parser)]
#[command(name = "estimate", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.moving_estimate/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference CSV (region,locality,lat,lon). Overrides the configured source.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Offline mode: never fetch remote reference data.
    #[arg(long, global = true)]
    offline: bool,

    /// Use a zero coordinate for unknown addresses instead of failing.
    #[arg(long, global = true)]
    zero_fill: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Great-circle distance between two addresses.
    Distance {
        #[arg(long, value_parser = parse_address)]
        from: RegionLocalityKey,
        #[arg(long, value_parser = parse_address)]
        to: RegionLocalityKey,
    },
    /// Truck price for a number of boxes.
    Price {
        /// Loose boxes.
        #[arg(long, short = 'b', default_value_t = 0)]
        boxes: u32,
        /// Packages as ID=QTY (repeatable).
        #[arg(long = "package", short = 'p', value_parser = parse_package)]
        packages: Vec<(u32, u32)>,
    },
    /// Full quote: distance, trucks and optional services.
    Quote {
        #[arg(long, value_parser = parse_address)]
        from: Option<RegionLocalityKey>,
        #[arg(long, value_parser = parse_address)]
        to: Option<RegionLocalityKey>,
        #[arg(long, short = 'b', default_value_t = 0)]
        boxes: u32,
        #[arg(long = "package", short = 'p', value_parser = parse_package)]
        packages: Vec<(u32, u32)>,
        /// Optional service ids (repeatable).
        #[arg(long = "service", short = 's')]
        services: Vec<u32>,
    },
}

fn parse_address(s: &str) -> Result<RegionLocalityKey, String> {
    match s.split_once(':') {
        Some((region, locality)) if !region.is_empty() && !locality.is_empty() => {
            Ok(RegionLocalityKey::new(region, locality))
        }
        _ => Err(format!("Invalid address '{}'. Use REGION:LOCALITY, e.g. 13:Shinjuku.", s)),
    }
}

fn parse_package(s: &str) -> Result<(u32, u32), String> {
    let (id, qty) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid package '{}'. Use ID=QTY, e.g. 1=2.", s))?;
    let id = id.trim().parse::<u32>().map_err(|e| format!("Invalid package id '{}': {}", id, e))?;
    let qty = qty.trim().parse::<u32>().map_err(|e| format!("Invalid quantity '{}': {}", qty, e))?;
    Ok((id, qty))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    // ── Load config ─────────────────────────────────────────────

    let loaded = match &cli.config {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Some(path) = &cli.data {
        config.reference = ReferenceConfig::File { path: path.clone() };
    }
    if cli.zero_fill {
        config.lookup_miss = MissPolicy::ZeroFill;
    }

    // ── Build engine ────────────────────────────────────────────

    let mut cache = SnapshotCache::load();
    let engine = EstimateEngine::from_config(&config, &mut cache, cli.offline).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // ── Run ─────────────────────────────────────────────────────

    let output = match run(&engine, cli.command) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(engine: &EstimateEngine, command: Command) -> Result<serde_json::Value, Box<dyn Error>> {
    let value = match command {
        Command::Distance { from, to } => {
            let est = engine.estimate_distance_km(&from.region, &from.locality, &to.region, &to.locality)?;
            eprintln!(
                "  {} {} \u{2192} {} {}  ({:.1} km)",
                from, est.origin.coordinate, to, est.destination.coordinate, est.distance_km
            );
            if !est.is_complete() {
                eprintln!("  \u{26A0}\u{FE0F}  Address not found; zero coordinate used.");
            }
            serde_json::to_value(&est)?
        }
        Command::Price { boxes, packages } => {
            let request = QuoteRequest { loose_boxes: boxes, packages, ..Default::default() };
            let box_count = engine.box_count(&request)?;
            let plan = engine.tiers().plan(box_count);
            eprintln!("  {} boxes \u{2192} {} truck(s), {}", box_count, plan.truck_count(), plan.price);
            serde_json::to_value(&plan)?
        }
        Command::Quote { from, to, boxes, packages, services } => {
            let request = QuoteRequest {
                origin: from,
                destination: to,
                loose_boxes: boxes,
                packages,
                services,
            };
            let quote = engine.quote(&request)?;
            eprintln!(
                "  {} boxes, {} truck(s): {} + options {} = {}",
                quote.box_count,
                quote.trucks.truck_count(),
                quote.truck_price,
                quote.options_price,
                quote.total
            );
            serde_json::to_value(&quote)?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moving_estimate::location::LocationResolver;
    use moving_estimate::pricing::{PriceTier, TierTable};
    use moving_estimate::EstimateError;

    fn engine() -> EstimateEngine {
        let tiers = TierTable::new(vec![PriceTier::new(10, 5000), PriceTier::new(20, 9000)]).unwrap();
        EstimateEngine::new(LocationResolver::builtin(), tiers)
    }

    #[test]
    fn test_parse_address() {
        let key = parse_address("01:Sapporo-shi").unwrap();
        assert_eq!(key.region, "1");
        assert_eq!(key.locality, "Sapporo-shi");
        assert!(parse_address("13").is_err());
        assert!(parse_address(":Shinjuku").is_err());
        assert!(parse_address("13:").is_err());
    }

    #[test]
    fn test_parse_package() {
        assert_eq!(parse_package("1=2").unwrap(), (1, 2));
        assert_eq!(parse_package(" 7 = 3 ").unwrap(), (7, 3));
        assert!(parse_package("1").is_err());
        assert!(parse_package("a=2").is_err());
    }

    #[test]
    fn test_cli_parses_quote() {
        let cli = Cli::try_parse_from([
            "estimate", "--offline", "quote", "--from", "13:Shinjuku", "--to", "27:Osaka-shi",
            "-p", "1=2", "-s", "3",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Command::Quote { from, packages, services, .. } => {
                assert_eq!(from.unwrap().locality, "Shinjuku");
                assert_eq!(packages, vec![(1, 2)]);
                assert_eq!(services, vec![3]);
            }
            _ => panic!("expected quote"),
        }
    }

    #[test]
    fn test_run_price_outputs_plan() {
        let value = run(&engine(), Command::Price { boxes: 35, packages: vec![] }).unwrap();
        assert_eq!(value["price"], 18000);
        assert_eq!(value["full_loads"], 1);
    }

    #[test]
    fn test_run_keeps_domain_error() {
        let command = Command::Distance {
            from: RegionLocalityKey::new("13", "Atlantis"),
            to: RegionLocalityKey::new("27", "Osaka-shi"),
        };
        let err = run(&engine(), command).unwrap_err();
        assert!(matches!(err.downcast_ref::<EstimateError>(), Some(EstimateError::LookupMiss { .. })));
    }
}
