use clap::{Parser, Subcommand};
use env_logger::Env;
use image_sitemap::config::{self, ConfigOverrides, TimestampMode};
use image_sitemap::{SitemapBuilder, output};
use log::{LevelFilter, debug};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-sitemap")]
#[command(version)]
#[command(about = "Generate an XML image sitemap for a static site")]
#[command(long_about = "\
Generate an XML image sitemap for a static site

Walks the site directory, lists every image (png, jpg, jpeg, webp, gif, svg by
default) and writes a sitemap with one <url> per image, using the Google image
extension for location and caption.

Hidden files and directories (names starting with '.') are skipped, including .git.

Last-modified dates come from the latest git commit touching each file; files
outside a repository or not yet committed use their modification time (UTC).

Settings are read from sitemap.toml in the scan root when present. Flags
override the file. Run 'image-sitemap gen-config' for a documented template.")]
struct Cli {
    /// Site directory to scan
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/sitemap.toml, if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Public URL of the site root
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Sitemap path (relative paths resolve against --root)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Timestamp source: git or filesystem
    #[arg(long, global = true)]
    timestamps: Option<TimestampMode>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Write the sitemap (default)
    Generate,
    /// List the entries the sitemap would contain without writing it
    Check,
    /// Print a stock sitemap.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(Env::default())
        .filter_level(log_level)
        .init();

    match cli.command.as_ref().unwrap_or(&Command::Generate) {
        Command::Generate => {
            let result = builder(&cli)?.write()?;
            output::print_generate_output(&result);
        }
        Command::Check => {
            let entries = builder(&cli)?.entries()?;
            output::print_check_output(&entries);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the layered config (stock → file → flags) into a builder.
fn builder(cli: &Cli) -> Result<SitemapBuilder, config::ConfigError> {
    let file_config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&cli.root)?,
    };
    let site_config = file_config.with_overrides(ConfigOverrides {
        base_url: cli.base_url.clone(),
        output: cli.output.clone(),
        timestamps: cli.timestamps,
    })?;
    debug!("Root: {}", cli.root.display());
    debug!("Config: {:?}", site_config);
    Ok(SitemapBuilder::new(&cli.root, site_config))
}
