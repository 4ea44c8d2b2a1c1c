//! EEPROM image tool.
//!
//! Reads, edits, and converts AVR EEPROM images using the same raw byte
//! routines firmware uses to persist settings:
//!
//! - **info**: chip, capacity, used ranges, write statistics
//! - **dump** / **diff**: hex views of one or two images
//! - **read** / **write**: typed values (`u8` … `f64`) at an address
//! - **erase** / **convert**: reset an image, or change its file format
//!
//! Image format is chosen by extension (`.bin` raw, `.eep` Intel HEX,
//! `.eeps` snapshot) unless the config file forces one.

mod config;
mod value;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eeprom_core::{image, inspect, Chip, Eeprom, EepromStorage, Error, ImageFormat};

use config::Config;
use value::{parse_addr, ValueKind};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, global = true, help = "Path to config TOML (default: ./eeprom.toml if present)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override target chip (32u4, 328p, 2560, tiny85)")]
    chip: Option<String>,
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Raise log level (-v debug, -vv trace)")]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show chip, capacity, used ranges, and wear statistics
    Info {
        image: Option<PathBuf>,
    },
    /// Hex + ASCII dump
    Dump {
        image: Option<PathBuf>,
        #[arg(long, value_parser = parse_addr, default_value = "0")]
        start: usize,
        #[arg(long, value_parser = parse_addr, help = "Bytes to show (default: to end)")]
        len: Option<usize>,
    },
    /// Read a typed value
    Read {
        image: Option<PathBuf>,
        #[arg(long, value_parser = parse_addr)]
        addr: usize,
        #[arg(long = "type", value_enum)]
        kind: ValueKind,
    },
    /// Write a typed value (creates an erased image if missing)
    Write {
        image: PathBuf,
        #[arg(allow_hyphen_values = true)]
        value: String,
        #[arg(long, value_parser = parse_addr)]
        addr: usize,
        #[arg(long = "type", value_enum)]
        kind: ValueKind,
        #[arg(long, help = "Skip cells that already hold the right byte")]
        update: bool,
    },
    /// Reset every cell to 0xFF
    Erase {
        image: Option<PathBuf>,
    },
    /// Convert between raw, Intel HEX, and snapshot formats
    Convert {
        input: PathBuf,
        output: PathBuf,
    },
    /// Show bytes that differ between two images
    Diff {
        a: PathBuf,
        b: PathBuf,
    },
}

/// Resolved settings shared by every command.
struct Session {
    chip: Chip,
    default_image: Option<PathBuf>,
    format: Option<ImageFormat>,
}

impl Session {
    fn image_path(&self, arg: Option<PathBuf>) -> Result<PathBuf> {
        arg.or_else(|| self.default_image.clone())
            .context("no image given (pass a path or set `image` in the config file)")
    }

    fn format_for(&self, path: &Path) -> ImageFormat {
        self.format.unwrap_or_else(|| ImageFormat::from_path(path))
    }

    fn load(&self, path: &Path) -> Result<Eeprom> {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let eeprom = image::decode(&data, self.format_for(path), self.chip)
            .with_context(|| format!("failed to decode {}", path.display()))?;
        Ok(eeprom)
    }

    /// Like `load`, but a missing file yields a blank image.
    fn load_or_blank(&self, path: &Path) -> Result<Eeprom> {
        if path.exists() {
            self.load(path)
        } else {
            log::info!("{} does not exist, starting from an erased {}", path.display(), self.chip);
            Ok(Eeprom::for_chip(self.chip))
        }
    }

    fn save(&self, eeprom: &Eeprom, path: &Path) -> Result<()> {
        let out = image::encode(eeprom, self.format_for(path), self.chip)?;
        fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Reject ranges that do not fit the device. The library routines never
/// check; the tool does, so a typo does not silently drop bytes.
fn check_range(addr: usize, len: usize, capacity: usize) -> Result<(), Error> {
    match addr.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(Error::OutOfRange { addr, len, capacity }),
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let chip = match &args.chip {
        Some(s) => s.parse::<Chip>()?,
        None => config.chip,
    };
    let ctx = Session { chip, default_image: config.image, format: config.format };

    match args.command {
        Command::Info { image } => {
            let path = ctx.image_path(image)?;
            let eeprom = ctx.load(&path)?;
            println!("Image:    {} ({:?})", path.display(), ctx.format_for(&path));
            println!("Chip:     {}", ctx.chip);
            println!("Capacity: {} bytes", eeprom.capacity());
            println!("Used:     {}", inspect::summarize_used(eeprom.as_bytes()));
            println!("Dirty:    {}", if eeprom.is_dirty() { "yes" } else { "no" });
            let tracked = if ctx.format_for(&path) == ImageFormat::Snapshot { "" } else { " (kept in .eeps snapshots only)" };
            println!("Writes:   {} total, {} max per cell{}", eeprom.total_writes(), eeprom.max_wear(), tracked);
        }
        Command::Dump { image, start, len } => {
            let path = ctx.image_path(image)?;
            let eeprom = ctx.load(&path)?;
            let len = len.unwrap_or_else(|| eeprom.capacity().saturating_sub(start));
            print!("{}", inspect::dump(eeprom.as_bytes(), start, len));
        }
        Command::Read { image, addr, kind } => {
            let path = ctx.image_path(image)?;
            let mut eeprom = ctx.load(&path)?;
            check_range(addr, kind.size(), eeprom.capacity())?;
            println!("{}", value::load(&mut eeprom, addr, kind));
        }
        Command::Write { image: path, value: text, addr, kind, update } => {
            let created = !path.exists();
            let mut eeprom = ctx.load_or_blank(&path)?;
            check_range(addr, kind.size(), eeprom.capacity())?;
            let before = eeprom.total_writes();
            let n = value::store(&mut eeprom, addr, kind, &text, update)?;
            log::debug!("{} cell writes", eeprom.total_writes() - before);
            if eeprom.is_dirty() || created {
                ctx.save(&eeprom, &path)?;
            }
            println!("{} bytes written at 0x{:04X}", n, addr);
        }
        Command::Erase { image } => {
            let path = ctx.image_path(image)?;
            let mut eeprom = ctx.load_or_blank(&path)?;
            eeprom.erase();
            ctx.save(&eeprom, &path)?;
            println!("Erased {} bytes", eeprom.capacity());
        }
        Command::Convert { input, output } => {
            let eeprom = ctx.load(&input)?;
            ctx.save(&eeprom, &output)?;
            println!("{} ({:?}) -> {} ({:?})",
                input.display(), ctx.format_for(&input), output.display(), ctx.format_for(&output));
        }
        Command::Diff { a, b } => {
            let ea = ctx.load(&a)?;
            let eb = ctx.load(&b)?;
            let len = ea.capacity().max(eb.capacity());
            print!("{}", inspect::diff(ea.as_bytes(), eb.as_bytes(), 0, len));
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
