//! hlx - Byte inspector for pipes
//!
//! Non-interactive front end to the classifier, renderer, editor and ciphers.

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hexlens::buffer;
use hexlens::cipher::{CipherJob, Direction};
use hexlens::config::{Config, DEFAULT_MAX_FILE_SIZE, DEFAULT_WINDOW_LENGTH, parse_encoding};
use hexlens::edit::{parse_byte_value, parse_offset};
use hexlens::encoding::CharEncoding;
use hexlens::region;
use hexlens::session::Session;

/// Byte inspector for pipes
#[derive(Parser, Debug)]
#[command(name = "hlx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reject inputs larger than this many bytes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: usize,

    /// Name used to pick the file type when reading stdin ("-")
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Confirm the file type declared by the extension
    Detect {
        /// Input file ("-" for stdin)
        input: String,
    },

    /// List classified regions
    Regions {
        /// Input file ("-" for stdin)
        input: String,
    },

    /// Render a window of the file
    Dump {
        /// Input file ("-" for stdin)
        input: String,

        /// Window offset (hex with 0x prefix, or decimal)
        #[arg(short, long, default_value = "0")]
        offset: String,

        /// Window length in bytes
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_LENGTH)]
        length: usize,

        /// Show the binary view instead of hex+text
        #[arg(short, long)]
        binary: bool,

        /// Text column encoding
        #[arg(short, long, default_value = "utf-8", value_parser = parse_encoding)]
        encoding: CharEncoding,
    },

    /// Patch single bytes and write the result to stdout
    Patch {
        /// Input file ("-" for stdin)
        input: String,

        /// Patches in format "offset=HH" or "offset=#DEC" (e.g., "0x10=FF" "0=#65")
        #[arg(required = true)]
        patches: Vec<String>,
    },

    /// Run a toy cipher over the file and print the result as hex
    Cipher {
        /// Input file ("-" for stdin)
        input: String,

        /// Algorithm: "caesar" or "xor"
        algorithm: String,

        /// Key (0-25 for caesar, non-empty string for xor)
        key: String,

        /// Decrypt instead of encrypt
        #[arg(short, long)]
        decrypt: bool,

        /// Print the decoded text instead of hex (caesar only)
        #[arg(short, long)]
        text: bool,
    },

    /// Show the metadata summary
    Info {
        /// Input file ("-" for stdin)
        input: String,
    },
}

fn main() -> Result<()> {
    // ログは stderr に出す（stdout はパイプ用）
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config {
        max_file_size: args.max_size,
        ..Config::default()
    };
    config.validate()?;
    let name = args.name.as_deref();

    match args.command {
        Command::Detect { input } => cmd_detect(&load(&input, name, config)?),
        Command::Regions { input } => cmd_regions(&load(&input, name, config)?),
        Command::Dump {
            input,
            offset,
            length,
            binary,
            encoding,
        } => {
            let config = Config {
                window_length: length,
                encoding,
                ..config
            };
            config.validate()?;
            cmd_dump(load(&input, name, config)?, &offset, binary)
        }
        Command::Patch { input, patches } => cmd_patch(load(&input, name, config)?, &patches),
        Command::Cipher {
            input,
            algorithm,
            key,
            decrypt,
            text,
        } => cmd_cipher(&load(&input, name, config)?, &algorithm, &key, decrypt, text),
        Command::Info { input } => cmd_info(&load(&input, name, config)?),
    }
}

/// Read input from file or stdin, detect its type and classify it
fn load(input: &str, name: Option<&str>, config: Config) -> Result<Session> {
    let limit = config.max_file_size;
    let data = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().take(limit as u64 + 1).read_to_end(&mut buf)?;
        buf
    } else {
        buffer::read_file(Path::new(input), limit).with_context(|| format!("cannot read {}", input))?
    };

    let name = match name {
        Some(n) => n.to_string(),
        None if input == "-" => bail!("--name is required when reading stdin"),
        None => Path::new(input)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.to_string()),
    };

    let mut session = Session::new(config);
    session.load(&name, data)?;
    session.classify_now();
    Ok(session)
}

// === Commands ===

fn cmd_detect(session: &Session) -> Result<()> {
    if let Some(document) = session.document() {
        println!("{}", document.descriptor().tag);
    }
    Ok(())
}

fn cmd_regions(session: &Session) -> Result<()> {
    let regions = session.regions().unwrap_or_default();
    for r in regions {
        println!("{:08X}-{:08X} {}", r.range.start, r.range.end, r.kind.name());
    }
    println!();
    for summary in region::summarize(regions) {
        println!("{:<10} {} bytes", summary.kind.name(), summary.bytes);
    }
    Ok(())
}

fn cmd_dump(mut session: Session, offset: &str, binary: bool) -> Result<()> {
    let Some(offset) = parse_offset(offset) else {
        bail!("Invalid offset: {}", offset);
    };
    session.scrub(offset);
    let Some(view) = session.render() else {
        return Ok(());
    };
    if binary {
        println!("{}", view.binary_dump());
    } else {
        println!("{}", view.hex_dump());
    }
    Ok(())
}

/// "offset=HH" / "offset=#DEC" を (オフセット, 値) にする
fn parse_patch(patch: &str) -> Result<(usize, u8)> {
    let Some((offset, value)) = patch.split_once('=') else {
        bail!("Patch must be in format 'offset=HH' or 'offset=#DEC': {}", patch);
    };
    let Some(offset) = parse_offset(offset) else {
        bail!("Invalid offset in patch: {}", patch);
    };
    Ok((offset, parse_byte_value(value)?))
}

fn cmd_patch(mut session: Session, patches: &[String]) -> Result<()> {
    for patch in patches {
        let (offset, value) = parse_patch(patch)?;
        session.edit_byte(offset, value)?;
    }

    if let Some(document) = session.document() {
        io::stdout().write_all(document.buffer().data())?;
    }
    Ok(())
}

fn cmd_cipher(session: &Session, algorithm: &str, key: &str, decrypt: bool, text: bool) -> Result<()> {
    let direction = if decrypt { Direction::Decrypt } else { Direction::Encrypt };
    let job = CipherJob::parse(algorithm, Some(key), direction)?;
    let output = session.cipher(&job)?;

    match (text, output.text.as_deref()) {
        (true, Some(decoded)) => println!("{}", decoded),
        (true, None) => bail!("{} output has no text form", job.algorithm.name()),
        (false, _) => println!("{}", output.hex()),
    }
    Ok(())
}

fn info_lines(session: &Session) -> Vec<String> {
    let Some(document) = session.document() else {
        return Vec::new();
    };
    let len = document.len();

    let mut lines = vec![
        format!("Type: {}", document.descriptor().tag),
        format!("Size: {} bytes (0x{:X})", len, len),
    ];
    if let Some(summary) = session.summary() {
        for entry in summary.entries() {
            let mark = if entry.sensitive { " [sensitive]" } else { "" };
            lines.push(format!("{}: {}{}", entry.label, entry.value, mark));
        }
    }
    lines
}

fn cmd_info(session: &Session) -> Result<()> {
    for line in info_lines(session) {
        println!("{}", line);
    }
    Ok(())
}
