mod opt;

use std::fs::File;
use std::io::BufWriter;

use crate::opt::{Opt, ValidOpt};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use env_logger::Env;
use genjets::{
    prelude::*, run::RunSummary, writer::HistogramFile, FEATURES, GIT_BRANCH,
    GIT_REV, VERSION,
};
use log::{debug, info};

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = match Opt::parse_from(args).validate() {
        Ok(opt) => opt,
        Err(err) => {
            eprintln!("{} {err}", style("Error:").bold().red());
            std::process::exit(1);
        }
    };

    let env = Env::default().filter_or("GENJETS_LOG", &opt.opt.loglevel);
    env_logger::init_from_env(env);

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("genjets {VERSION} rev {rev} ({branch}) {FEATURES:?}");
    } else {
        info!("genjets {VERSION} {FEATURES:?}");
    }

    debug!("settings: {:#?}", opt);

    let summary = run_main(opt)?;
    info!("{}", summary.sigma);
    println!("{:e}", summary.sigma.mean);
    info!("done");
    Ok(())
}

fn run_main(opt: ValidOpt) -> Result<RunSummary> {
    let ValidOpt { nevents, opt } = opt;
    let generator = GeneratorSettings::builder()
        .bias2_selection(opt.bias)
        .seed(Some(opt.seed))
        .build();
    let config = RunConfig::builder()
        .nevents(nevents)
        .generator(generator)
        .build();
    config.validate()?;

    if let Some(path) = &opt.write_cmnd {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {path:?}"))?;
        config
            .generator
            .write_cmnd(BufWriter::new(file))
            .with_context(|| format!("Failed to write to {path:?}"))?;
        info!("Wrote generator settings to {path:?}");
    }

    let writer = FileWriter::builder()
        .filename(opt.outfile.clone())
        .format(opt.outformat.into())
        .compression(opt.compression)
        .build()
        .open()?;
    debug!("Writing histogram to {:?}", writer.path());

    #[cfg(feature = "hepmc2")]
    if !opt.infiles.is_empty() {
        if opt.bias {
            log::warn!("Ignoring --bias when reading events from files");
        }
        let source = FileSource::from_files(&opt.infiles)?;
        return run_with(&config, source, writer);
    }
    let source = ToyGenerator::new(config.generator.clone())?;
    run_with(&config, source, writer)
}

fn run_with<S>(
    config: &RunConfig,
    source: S,
    writer: HistogramFile,
) -> Result<RunSummary>
where
    S: EventSource,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let (hist, summary) = RunBuilder::from_config(config, source, writer)
        .build()
        .run()?;
    info!(
        "Histogram `{}`: {} entries, integral {:.6e}",
        hist.name(),
        hist.entries(),
        hist.integral()
    );
    Ok(summary)
}
