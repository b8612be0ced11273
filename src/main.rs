use anyhow::bail;
use clap::Parser;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod ftdc;
mod report;
mod spec;

pub type Result<T> = anyhow::Result<T>;

/// Render a diagnostic capture (diagnostic.data) as a mongostat-style
/// console table.
#[derive(Parser)]
#[command(name = "ftdcstat")]
#[command(about = "mongostat-style report over FTDC diagnostic captures", long_about = None)]
struct Cli {
    /// Diagnostic capture file or directory.
    path: PathBuf,

    /// Custom metric list (overrides --cpu/--mem). Empty means unset.
    #[arg(long, default_value = "")]
    metrics: String,

    /// Show OS CPU counters.
    #[arg(long)]
    cpu: bool,

    /// Show OS memory counters.
    #[arg(long)]
    mem: bool,

    /// Column width.
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// List all raw series keys of the first chunk instead of rendering.
    #[arg(long)]
    keys: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1) Decode the whole capture into memory before any rendering.
    let chunks = ftdc::decode_path(&cli.path)?;

    // 2) Key discovery bypasses the report entirely.
    if cli.keys {
        let Some(first) = chunks.first() else {
            bail!("input contains no metric chunks");
        };
        for key in first.sorted_keys() {
            println!("{key}");
        }
        return Ok(());
    }

    // 3) Pick the metric list: default -> cpu -> mem -> custom.
    let custom = (!cli.metrics.is_empty()).then_some(cli.metrics.as_str());
    let columns = spec::parse_metrics(spec::select_spec(cli.cpu, cli.mem, custom));

    // 4) Render to stdout; logs go to stderr.
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    report::Renderer::new(columns, cli.width).render(&chunks, &mut out)?;

    Ok(())
}
