//! covid-atlas CLI
//!
//! Command-line interface for the dashboard:
//! - Render the static dashboard (SVG charts + HTML page)
//! - Print summaries, rankings, lookups and series
//! - Serve the dashboard over HTTP
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use covid_atlas::aggregate::{top_n, RankedEntry, Series};
use covid_atlas::api::{serve, AppState};
use covid_atlas::config::{generate_default_config, Config, LoggingConfig};
use covid_atlas::dashboard::{export_static, Dashboard, Selection};
use covid_atlas::dataset::load_dashboard_data;
use covid_atlas::render::format_count;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(Parser)]
#[command(name = "covid-atlas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "COVID-19 dashboard: world choropleth, top-N ranking and per-country series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write map.svg, bars.svg, lines.svg, index.html and summary.json
    Render {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
        /// Countries for the line chart (repeatable; default from config)
        #[arg(short = 'C', long = "country")]
        countries: Vec<String>,
        /// Metric for the line chart
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Print the top-N countries by summarized value
    Summary {
        /// Metric to summarize (default from config)
        #[arg(short, long)]
        metric: Option<String>,
        /// Number of entries
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Print per-country series for a metric
    Series {
        /// Countries (repeatable)
        #[arg(short = 'C', long = "country", required = true)]
        countries: Vec<String>,
        /// Metric (default from config)
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Print one country's summarized value (0 when unknown)
    Lookup {
        country: String,
        #[arg(short, long)]
        metric: Option<String>,
    },

    /// Serve the dashboard over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `[logging]` is not known yet, so config problems go to a stderr subscriber
    let mut config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        match &cli.config {
            Some(path) => Config::load_with_env(path)
                .with_context(|| format!("loading config from {:?}", path)),
            None => Ok(Config::load_default()),
        }
    })?;

    match cli.command {
        Commands::Config { output } => write_default_config(output.as_ref())?,

        Commands::Render {
            out,
            countries,
            metric,
        } => {
            let mut dashboard = load_dashboard(&config).await?;
            if !countries.is_empty() || metric.is_some() {
                let current = dashboard.selection().clone();
                dashboard.select(Selection {
                    countries: if countries.is_empty() {
                        current.countries
                    } else {
                        countries
                    },
                    metric: metric.unwrap_or(current.metric),
                });
            }

            let written = export_static(&dashboard, &config.render, &out)
                .with_context(|| format!("writing dashboard to {:?}", out))?;
            for path in written {
                println!("{}", path.display());
            }
        }

        Commands::Summary { metric, top } => {
            if let Some(metric) = metric {
                config.dashboard.summary_metric = metric;
            }
            let n = top.unwrap_or(config.dashboard.top_n);
            let dashboard = load_dashboard(&config).await?;
            let entries = top_n(dashboard.summary(), n);
            print_ranking(&entries, dashboard.summary().metric(), cli.format)?;
        }

        Commands::Series { countries, metric } => {
            let mut dashboard = load_dashboard(&config).await?;
            let metric = metric.unwrap_or_else(|| config.dashboard.default_metric.clone());
            dashboard.select(Selection::new(countries, metric));
            print_series(dashboard.series(), &dashboard.selection().metric, cli.format)?;
        }

        Commands::Lookup { country, metric } => {
            if let Some(metric) = metric {
                config.dashboard.summary_metric = metric;
            }
            let dashboard = load_dashboard(&config).await?;
            let metric = dashboard.summary().metric();
            let value = dashboard.summary().lookup(&country);
            match cli.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({
                        "country": country,
                        "metric": metric,
                        "value": value,
                    })
                ),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    writer.write_record(["country", metric])?;
                    writer.write_record([country.as_str(), value.to_string().as_str()])?;
                    writer.flush()?;
                }
                OutputFormat::Table => println!("{}: {}", country, format_count(value)),
            }
        }

        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }

            let dashboard = load_dashboard(&config).await?;
            let state = AppState::new(
                dashboard,
                config.render.clone(),
                config.api.clone(),
                config.dashboard.top_n,
            );
            serve(state, &config.api).await?;
        }
    }

    Ok(())
}

/// Start logging, load both inputs and build the default dashboard
async fn load_dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    init_logging(&config.logging)?;
    tracing::info!("covid-atlas v{}", env!("CARGO_PKG_VERSION"));

    let data = load_dashboard_data(&config.data).await.with_context(|| {
        format!(
            "loading {:?} and {:?}",
            config.data.cases_path, config.data.world_path
        )
    })?;

    Ok(Dashboard::new(
        Arc::new(data),
        config.join.join_aliases(),
        &config.dashboard,
    ))
}

/// Subscriber active while the config file is read
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("covid_atlas=info")),
        )
        .with_writer(std::io::stderr)
        .finish()
}

/// Set up tracing from the `[logging]` section; `RUST_LOG` wins over `level`
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("covid_atlas={},tower_http=info", config.level))
    });

    // stdout carries command output, so logs go to stderr or a file
    let writer = match &config.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = config.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init(),
        _ => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init(),
    }
    Ok(())
}

fn write_default_config(output: Option<&PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config).with_context(|| format!("writing {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }
    Ok(())
}

fn print_ranking(entries: &[RankedEntry], metric: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["rank", "country", metric])?;
            for (i, entry) in entries.iter().enumerate() {
                writer.write_record([
                    (i + 1).to_string(),
                    entry.country.clone(),
                    entry.value.to_string(),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No data for {}", metric);
                return Ok(());
            }
            println!("{:<5} {:<32} {:>16}", "Rank", "Country", metric);
            println!("{}", "-".repeat(55));
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "{:<5} {:<32} {:>16}",
                    i + 1,
                    entry.country,
                    format_count(entry.value)
                );
            }
        }
    }
    Ok(())
}

fn print_series(series: &[Series], metric: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(series)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["country", "date", metric])?;
            for s in series {
                for point in &s.points {
                    writer.write_record([
                        s.country.clone(),
                        point.date.format("%Y-%m-%d").to_string(),
                        point.value.to_string(),
                    ])?;
                }
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            for s in series {
                println!("{} ({} points)", s.country, s.len());
                if s.is_empty() {
                    println!("  No data");
                    continue;
                }
                for point in &s.points {
                    println!("  {}  {:>16}", point.date, format_count(point.value));
                }
            }
        }
    }
    Ok(())
}
