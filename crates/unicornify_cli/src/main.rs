use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use unicornify_avatar::{make_avatar, mail_hash, random_hash, AvatarOptions, AvatarParameters};

/// Largest accepted image side.
const MAX_SIZE: i64 = 16384;

#[derive(Debug, Parser)]
#[command(version, about = "Render a unicorn avatar for a hex hash or an email address", long_about = None)]
#[command(group(ArgGroup::new("seed").required(true).args(["hash", "mail", "random"])))]
struct Args {
    /// hex hash that determines the unicorn
    #[arg(short = 'H', long)]
    hash: Option<String>,
    /// email address whose MD5 hash determines the unicorn
    #[arg(short, long)]
    mail: Option<String>,
    /// use a random hash
    #[arg(short, long)]
    random: bool,
    /// width and height of the image in pixels
    #[arg(short, long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..=MAX_SIZE))]
    size: u32,
    /// output file, <hash>.png by default
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// no background, just the unicorn on white
    #[arg(short, long)]
    free: bool,
    /// always show the whole unicorn
    #[arg(short, long)]
    zoom_out: bool,
    /// skip supersampling
    #[arg(long)]
    no_aa: bool,
    /// shade surfaces by a directional light
    #[arg(long)]
    shading: bool,
    /// cast shadows
    #[arg(long)]
    shadow: bool,
    /// grow grass on the ground
    #[arg(long)]
    grass: bool,
    /// render on the calling thread only
    #[arg(long)]
    serial: bool,
    /// log verbosity, RUST_LOG is used when not given
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
    /// write the generated parameters as JSON to this file
    #[arg(long, value_name = "JSON")]
    dump_params: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Args {
    fn options(&self) -> AvatarOptions {
        AvatarOptions {
            background: !self.free,
            shading: self.shading,
            shadow: self.shadow,
            grass: self.grass,
            parallel: !self.serial,
            zoom_out: self.zoom_out,
            supersample: !self.no_aa,
        }
    }

    fn seed(&self) -> String {
        match (&self.hash, &self.mail) {
            _ if self.random => random_hash(),
            (Some(hash), _) => hash.clone(),
            (None, Some(mail)) => mail_hash(mail),
            (None, None) => random_hash(),
        }
    }
}

fn init_logging(level: Option<LogLevel>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

fn dump_params(path: &Path, hash: &str) -> Result<()> {
    let params = AvatarParameters::generate(hash)
        .with_context(|| format!("Invalid hash {hash:?}"))?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &params).context("Failed to write parameters")?;
    writeln!(writer)?;
    log::info!("Parameters written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let hash = args.seed();
    let options = args.options();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{hash}.png")));
    log::info!("Rendering unicorn {hash} at {0}x{0}", args.size);

    if let Some(path) = &args.dump_params {
        dump_params(path, &hash)?;
    }

    let render_height = if options.supersample {
        args.size * 2
    } else {
        args.size
    };
    let last_percent = Cell::new(u32::MAX);
    let progress = |rows: u32| {
        let percent = rows * 100 / render_height.max(1);
        if percent != last_percent.get() {
            last_percent.set(percent);
            eprint!("\r{percent:3}%");
        }
    };

    let start = Instant::now();
    let raster = make_avatar(&hash, args.size, &options, Some(&progress))
        .with_context(|| format!("Failed to render unicorn {hash:?}"))?;
    eprintln!();
    log::info!("Done in {:.2?}", start.elapsed());

    raster
        .to_image()
        .save_with_format(&output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    println!("{}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_options() {
        let args = Args::try_parse_from([
            "unicornify", "-H", "abcd", "-s", "64", "--free", "--no-aa", "--shadow", "--serial",
        ])
        .unwrap();
        assert_eq!(args.seed(), "abcd");
        assert_eq!(args.size, 64);
        let options = args.options();
        assert!(!options.background);
        assert!(!options.supersample);
        assert!(options.shadow && !options.shading && !options.grass);
        assert!(!options.parallel);
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["unicornify", "--hash", "00ff"]).unwrap();
        assert_eq!(args.size, 256);
        assert!(args.output.is_none());
        assert_eq!(args.options(), AvatarOptions::default());
    }

    #[test]
    fn test_seed_is_required() {
        assert!(Args::try_parse_from(["unicornify", "-s", "32"]).is_err());
        let args = Args::try_parse_from(["unicornify", "-r"]).unwrap();
        let seed = args.seed();
        assert_eq!(seed.len(), 32);
        assert!(seed.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_log_level() {
        let args = Args::try_parse_from(["unicornify", "-r", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(log::LevelFilter::from(LogLevel::Debug), log::LevelFilter::Debug);
    }

    #[test]
    fn test_mail_becomes_hash() {
        let args = Args::try_parse_from(["unicornify", "-m", " ABC "]).unwrap();
        assert_eq!(args.seed(), "900150983cd24fb0d6963f7d28e17f72");
        assert!(Args::try_parse_from(["unicornify", "-m", "a@b.c", "-H", "00"]).is_err());
    }

    #[test]
    fn test_size_is_bounded() {
        assert!(Args::try_parse_from(["unicornify", "-r", "-s", "0"]).is_err());
        assert!(Args::try_parse_from(["unicornify", "-r", "-s", "4294967295"]).is_err());
        let args = Args::try_parse_from(["unicornify", "-r", "-s", "16384"]).unwrap();
        assert_eq!(args.size, 16384);
    }
}
