use anyhow::{Context, Result, anyhow};
use clap::Parser;

use butterfly_d33::analysis::analyze;
use butterfly_d33::app;
use butterfly_d33::cli::Args;
use butterfly_d33::data::loader::load_file;
use butterfly_d33::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = args.analysis_config();

    let sweep = load_file(&config.input, &config.sheet)?;
    let analysis = analyze(&sweep, &config);

    if args.json {
        let json =
            serde_json::to_string_pretty(&analysis.summary).context("serialising summary")?;
        println!("{json}");
    } else {
        print!("{}", analysis.summary);
    }

    if args.no_plot {
        return Ok(());
    }

    app::run(AppState::with_analysis(config, sweep, analysis))
        .map_err(|e| anyhow!("plot window failed: {e}"))
}
