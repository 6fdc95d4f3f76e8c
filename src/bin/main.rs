use anyhow::Context;
use bladecool_rs::config::RunConfig;
use bladecool_rs::pipeline::run;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RunConfig::from_args(std::env::args().skip(1));
    log::info!(
        "geometry from {}, injections from {}, output to {}",
        config.geometry_dir.display(),
        config.injection_config.display(),
        config.output_dir.display()
    );

    let summary = run(&config).context("injection placement failed")?;
    log::info!(
        "{} geometry files, {} curves, {} injections written, {} failed",
        summary.files_parsed,
        summary.curves_registered,
        summary.requests_written,
        summary.requests_failed
    );

    Ok(())
}
