//! Command line tool for WEY keyboards.
//!
//! File commands talk to the keyboard over a serial line (`--device`) or
//! over USB in regular mode. Bootloader commands (modules, id, read-mem,
//! restart) always run over USB: they first switch the device into
//! bootloader mode and reopen it under its bootloader identity.

mod hexdump;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wey_client::session::{open_usb, UsbMode};
use wey_client::Client;
use wey_protocol::GraphKind;
use wey_transport::{SerialTransport, Transport};

use hexdump::hexdump;

#[derive(Parser)]
#[command(name = "weyctl", version, about = "Control tool for WEY keyboards")]
struct Cli {
    /// Serial device path; file commands run over USB when omitted
    #[arg(short = 'D', long, global = true)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(short, long, global = true, default_value_t = 115200)]
    baud: u32,

    /// Per-operation I/O timeout in milliseconds
    #[arg(long, global = true, default_value_t = 1000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List files stored on the keyboard
    List,

    /// Download a file; indices 4 and 6 address graph resources
    Read {
        /// File index
        index: u16,
        /// File subindex
        subindex: u16,
        /// Local path; defaults to the device-supplied name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a local file
    Write {
        /// Local source file
        path: PathBuf,
        /// File index; inferred for LAYERnn.LAY names
        #[arg(long)]
        index: Option<u16>,
        /// File subindex; inferred for LAYERnn.LAY names
        #[arg(long)]
        subindex: Option<u16>,
    },

    /// Delete a file
    Delete {
        /// File index
        index: u16,
        /// File subindex
        subindex: u16,
    },

    /// List firmware modules (bootloader mode)
    Modules,

    /// Print the keyboard id (bootloader mode)
    Id,

    /// Dump a memory range (bootloader mode)
    ReadMem {
        /// First address, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_int)]
        base: u32,
        /// Number of bytes, decimal or 0x-prefixed hex
        #[arg(value_parser = parse_int)]
        len: u32,
        /// Write the dump here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restart the device into a firmware mode (bootloader mode)
    Restart {
        /// Target firmware mode
        #[arg(long, default_value_t = 5)]
        mode: u8,
    },

    /// Send raw hex bytes and print the reply
    Raw {
        /// Bytes to send, as hex digits
        tx: String,
        /// How many reply bytes to read
        #[arg(long, default_value_t = 0)]
        rx_len: usize,
    },
}

impl Cmd {
    /// Whether this command needs the bootloader identity.
    fn needs_bootloader(&self) -> bool {
        matches!(
            self,
            Cmd::Modules | Cmd::Id | Cmd::ReadMem { .. } | Cmd::Restart { .. }
        )
    }
}

fn parse_int(arg: &str) -> Result<u32, String> {
    let arg = arg.trim();
    match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => arg.parse(),
    }
    .map_err(|err| err.to_string())
}

/// Infer index/subindex for the LAYERnn.LAY upload convention.
fn layer_subindex(name: &str) -> Option<u16> {
    let digits = name.strip_prefix("LAYER")?.strip_suffix(".LAY")?;
    if digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn save_artifact(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
    println!("{}: {} bytes", path.display(), data.len());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);

    let transport: Box<dyn Transport> = match &cli.device {
        Some(path) => {
            if cli.command.needs_bootloader() {
                bail!("bootloader commands require the USB transport, not --device");
            }
            Box::new(SerialTransport::open(path, cli.baud, timeout)?)
        }
        None if cli.command.needs_bootloader() => Box::new(open_usb(UsbMode::Bootloader, timeout)?),
        None => Box::new(open_usb(UsbMode::Keyboard, timeout)?),
    };

    let mut client = Client::new(transport);

    match cli.command {
        Cmd::List => {
            let files = client.list_files()?;
            println!("Number Index SubIndex Name");
            for (i, entry) in files.iter().enumerate() {
                println!(
                    "{:6} {:5} {:8} {}",
                    i, entry.index, entry.subindex, entry.name
                );
            }
        }

        Cmd::Read {
            index,
            subindex,
            output,
        } => {
            let file = match GraphKind::from_domain_code(index) {
                Some(kind) => client.read_graph(kind, subindex)?,
                None => client.read_file(index, subindex)?,
            };
            let path = output.unwrap_or_else(|| PathBuf::from(&file.name));
            save_artifact(&path, &file.data)?;
        }

        Cmd::Write {
            path,
            index,
            subindex,
        } => {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("{}: not a usable file name", path.display()))?
                .to_string();

            let (index, subindex) = match (index, subindex) {
                (Some(index), Some(subindex)) => (index, subindex),
                (None, None) => {
                    let subindex = layer_subindex(&name).ok_or_else(|| {
                        anyhow!("{name}: pass --index and --subindex for non-layer files")
                    })?;
                    (9, subindex)
                }
                _ => bail!("--index and --subindex must be given together"),
            };

            let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            client.write_file(index, subindex, &name, &data)?;
            println!("{name}: {} bytes written to {index},{subindex}", data.len());
        }

        Cmd::Delete { index, subindex } => {
            client
                .delete_file(index, subindex)
                .with_context(|| format!("deleting {index},{subindex}"))?;
            println!("{index},{subindex}: deleted");
        }

        Cmd::Modules => {
            for module in client.list_modules()? {
                println!(
                    "{:2}: {:08x} - {:08x} {}",
                    module.number, module.base, module.end, module.name
                );
            }
        }

        Cmd::Id => {
            client.unlock()?;
            let id = client.identify()?;
            println!("Keyboard ID: {id}");
        }

        Cmd::ReadMem { base, len, output } => {
            client.unlock()?;
            let data = client.read_memory(base, len)?;
            match output {
                Some(path) => save_artifact(&path, &data)?,
                None => hexdump(&data),
            }
        }

        Cmd::Restart { mode } => {
            client.restart(mode)?;
            println!("restart request sent (mode {mode})");
        }

        Cmd::Raw { tx, rx_len } => {
            let tx: String = tx.split_whitespace().collect();
            let tx = hex::decode(&tx).context("tx bytes must be hex digits")?;
            let rx = client.raw(&tx, rx_len)?;
            if !rx.is_empty() {
                hexdump(&rx);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_accepts_both_bases() {
        assert_eq!(parse_int("256"), Ok(256));
        assert_eq!(parse_int("0x100"), Ok(256));
        assert_eq!(parse_int("0X100"), Ok(256));
        assert!(parse_int("0xzz").is_err());
    }

    #[test]
    fn test_layer_subindex() {
        assert_eq!(layer_subindex("LAYER02.LAY"), Some(2));
        assert_eq!(layer_subindex("LAYER15.LAY"), Some(15));
        assert_eq!(layer_subindex("LAYER2.LAY"), None);
        assert_eq!(layer_subindex("CONF.BIN"), None);
    }
}
