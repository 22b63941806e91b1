use std::path::PathBuf;

use clap::Parser;
use noto_amalgamate::{Config, DEFAULT_SOURCE_DIR};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory with the .glyphs sources at its top level and .ufo sources
    /// anywhere below.
    #[arg(long, default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,

    /// Directory to write the NotoAmalgamated-*.ufo fonts into.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let config = Config {
        source_dir: cli.source_dir,
        output_dir: cli.output_dir,
    };
    let written = noto_amalgamate::run(&config)?;
    log::info!("Wrote {} amalgamated fonts", written.len());
    Ok(())
}
