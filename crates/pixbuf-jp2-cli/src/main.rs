//! jp2pix - JPEG2000 pixbuf host
//!
//! Loads JPEG2000 images through the pixbuf module registry, reports what
//! was decoded and converts to PNG.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "jp2pix")]
#[command(author, version, about = "JPEG2000 pixbuf loader host")]
#[command(long_about = "
Decodes JPEG2000 images (.jp2, .j2k, .jpc, .jpx, ...) the way an image
host would through its loader module, and shows or converts the result.

Examples:
  jp2pix info scan.jp2                  # Show decoded layout
  jp2pix info a.jp2 b.j2k --json        # Machine-readable output
  jp2pix convert scan.jp2 scan.png      # Decode to PNG
  jp2pix convert big.jp2 thumb.png --reduce 3
  jp2pix formats                        # List registered modules

Set RUST_LOG=pixbuf_jp2=trace,openjpeg=debug for decoder diagnostics.
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Display decoded image information
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Decode and write as PNG
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// List registered format modules
    Formats,
}

#[derive(Args)]
struct InfoArgs {
    /// Input image(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    decode: DecodeArgs,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input image
    input: PathBuf,

    /// Output PNG
    output: PathBuf,

    #[command(flatten)]
    decode: DecodeArgs,
}

#[derive(Args, Clone, Copy)]
struct DecodeArgs {
    /// Discard this many resolution levels (each halves width and height)
    #[arg(short, long, default_value = "0")]
    reduce: u32,

    /// Decode at most this many quality layers (0 = all)
    #[arg(short, long, default_value = "0")]
    layers: u32,
}

impl DecodeArgs {
    fn options(self) -> pixbuf_jp2::DecodeOptions {
        pixbuf_jp2::DecodeOptions::new()
            .with_reduce(self.reduce)
            .with_quality_layers(self.layers)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, cli.verbose),
        Commands::Formats => commands::formats::run(cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn convert_parses_decode_options() {
        let cli = Cli::try_parse_from(["jp2pix", "convert", "in.jp2", "out.png", "-r", "2", "--layers", "1"]).unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        let options = args.decode.options();
        assert_eq!((options.reduce(), options.quality_layers()), (2, 1));
    }

    #[test]
    fn info_requires_input() {
        assert!(Cli::try_parse_from(["jp2pix", "info"]).is_err());
    }
}
