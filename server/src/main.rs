use anyhow::{bail, Context};
use bridge::bridge::DashboardBridge;
use clap::Parser;
use dataset::demo::{build_demo_rows, DemoConfig};
use dataset::loader::load_csv;
use log::info;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use visitcore::records::{Dataset, VisitSource};
use visitcore::render::DashboardView;
use workflow::config::DashboardConfig;
use workflow::runner::Runner;

mod bridge;
mod dataset;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Field visit trail navigator")]
struct Args {
    /// Load dashboard settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Visit dataset CSV (overrides the config file)
    #[arg(long)]
    dataset: Option<PathBuf>,
    /// Use a seeded synthetic dataset instead of a CSV file
    #[arg(long, default_value_t = false)]
    demo: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Agent to walk through offline
    #[arg(long, requires = "date")]
    agent: Option<String>,
    /// Date (YYYY-MM-DD) to walk through offline
    #[arg(long, requires = "agent")]
    date: Option<String>,
    /// Number of forward steps before printing the offline view
    #[arg(long, default_value_t = 0)]
    steps: usize,
    /// Write the offline view as JSON
    #[arg(long)]
    output: Option<PathBuf>,
    /// Keep the HTTP bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long)]
    bind: Option<SocketAddr>,
}

fn load_dataset(args: &Args, config: &DashboardConfig) -> anyhow::Result<Dataset> {
    if args.demo {
        let rows = build_demo_rows(&DemoConfig {
            seed: args.seed,
            ..Default::default()
        })?;
        let (dataset, report) = Dataset::from_raw(rows, &config.classification);
        info!("Generated {} demo visits", report.accepted);
        return Ok(dataset);
    }
    let Some(path) = args.dataset.as_ref().or(config.dataset.as_ref()) else {
        bail!("no visit dataset: pass --dataset <csv>, set `dataset` in the config, or use --demo");
    };
    let (dataset, _) = load_csv(path, &config.classification)?;
    Ok(dataset)
}

fn print_view(view: &DashboardView) {
    match view {
        DashboardView::Empty { agent, date, message } => {
            println!("{} / {}: {}", agent, date, message);
        }
        DashboardView::Trail(plan) => {
            println!(
                "{} / {}: {} -> layers {}, center ({:.5}, {:.5}) zoom {}",
                plan.agent,
                plan.date,
                plan.readout,
                plan.layers.len(),
                plan.viewport.center.lat,
                plan.viewport.center.lon,
                plan.viewport.zoom
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config.as_ref() {
        DashboardConfig::load(path)?
    } else {
        DashboardConfig::default()
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    let dataset = load_dataset(&args, &config)?;

    if let (Some(agent), Some(date)) = (args.agent.as_deref(), args.date.as_deref()) {
        let runner = Runner::new(config.clone());
        let view = runner.execute(&dataset, agent, date, args.steps);
        print_view(&view);

        if let Some(path) = args.output.as_ref() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let json = serde_json::to_string_pretty(&view).context("serializing view")?;
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        }
    } else if !args.serve {
        for agent in dataset.agents() {
            println!("{}: {} day(s)", agent, dataset.dates_for(&agent).len());
        }
    }

    if args.serve {
        let bind = config.bind;
        let bridge = DashboardBridge::new(dataset, config);
        let (bound, _server) = bridge.spawn(bind)?;
        bridge.publish_status(&format!(
            "HTTP bridge listening on {} (Ctrl+C to stop)...",
            bound
        ));
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
