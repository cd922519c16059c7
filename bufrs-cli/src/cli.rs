//! Command-line interface definitions and command implementations

use crate::endpoint::{parse_copy_operation, Endpoint};
use anyhow::{Context, Result};
use bufrs::{
    presets, tokens, FromStd, InputBuffer, OutputBuffer, TransferStats, DEFAULT_CAPACITY,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::io::{Read, Write};

/// Buffered I/O tool
#[derive(Parser, Debug)]
#[command(name = "bufrs")]
#[command(about = "Buffered cat, copy and token scanning over files and stdio", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Concatenate inputs to stdout
    ///
    /// Each input is read a full buffer at a time, so output from a pipe or
    /// terminal appears once the buffer fills or the input ends.
    Cat {
        /// Inputs to concatenate ("-" for stdin)
        #[arg(default_value = "-")]
        inputs: Vec<String>,

        /// Buffer capacity; output is held until this much input arrives
        #[arg(short, long, value_enum, default_value_t = BufferSize::K4)]
        buffer: BufferSize,
    },

    /// Copy one endpoint to another
    Copy {
        /// Source ("-" for stdin)
        source: String,

        /// Destination ("-" for stdout)
        dest: String,

        /// Size of each read/write request in bytes
        #[arg(short, long, default_value_t = 4096)]
        chunk: usize,

        /// Buffer capacity
        #[arg(short, long, value_enum, default_value_t = BufferSize::Default)]
        buffer: BufferSize,

        /// Retry short writes instead of dropping the unwritten tail
        #[arg(long)]
        full_retry: bool,

        /// Print transfer statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Print whitespace-delimited tokens, one per line
    Tokens {
        /// Input ("-" for stdin)
        #[arg(default_value = "-")]
        input: String,

        /// Only print the number of tokens
        #[arg(long)]
        count: bool,

        /// Buffer capacity
        #[arg(short, long, value_enum, default_value_t = BufferSize::Default)]
        buffer: BufferSize,
    },
}

/// Buffer capacity choices
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BufferSize {
    /// 4 KiB
    #[value(name = "4k")]
    K4,
    /// 64 KiB
    #[value(name = "64k")]
    K64,
    /// 1 MiB
    #[value(name = "1m")]
    M1,
    /// Platform default
    Default,
}

// Monomorphise `$f` for the capacity selected at runtime.
macro_rules! with_capacity {
    ($size:expr, $f:ident ( $($arg:expr),* $(,)? )) => {
        match $size {
            BufferSize::K4 => $f::<{ presets::BUF_4K }>($($arg),*),
            BufferSize::K64 => $f::<{ presets::BUF_64K }>($($arg),*),
            BufferSize::M1 => $f::<{ presets::BUF_1M }>($($arg),*),
            BufferSize::Default => $f::<DEFAULT_CAPACITY>($($arg),*),
        }
    };
}

/// Options for the copy command
#[derive(Debug, Clone, Copy)]
pub struct CopyOptions {
    pub chunk: usize,
    pub full_retry: bool,
}

/// Result of a copy
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyReport {
    pub bytes: u64,
    pub input: TransferStats,
    pub output: TransferStats,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Cat { inputs, buffer } => {
            let inputs: Vec<Endpoint> = inputs.iter().map(|s| Endpoint::parse(s)).collect();
            let stdout = Endpoint::Stdio.open_write()?;
            with_capacity!(buffer, cat(&inputs, stdout))
        }
        Commands::Copy {
            source,
            dest,
            chunk,
            buffer,
            full_retry,
            stats,
        } => {
            anyhow::ensure!(chunk > 0, "Chunk size must be non-zero");
            let (src, dst) = parse_copy_operation(&source, &dest)?;
            info!("Copying {} -> {}", src, dst);

            let options = CopyOptions { chunk, full_retry };
            let reader = src.open_read()?;
            let writer = dst.open_write()?;
            let report = with_capacity!(buffer, copy(reader, writer, options))?;

            if stats {
                print_report(&report);
            }
            Ok(())
        }
        Commands::Tokens {
            input,
            count,
            buffer,
        } => {
            let reader = Endpoint::parse(&input).open_read()?;
            let stdout = Endpoint::Stdio.open_write()?;
            with_capacity!(buffer, print_tokens(reader, stdout, count))
        }
    }
}

/// Forward every input to `out` through its buffer, without an extra copy.
pub fn cat<const CAP: usize>(inputs: &[Endpoint], out: Box<dyn Write>) -> Result<()> {
    let mut output = OutputBuffer::<_, CAP>::new(FromStd::new(out));

    for endpoint in inputs {
        let mut input = InputBuffer::<_, CAP>::new(FromStd::new(endpoint.open_read()?));
        while input.fill().with_context(|| format!("Failed to read '{}'", endpoint))? {
            let unread = input.unread();
            let n = unread.len();
            output.write(unread).context("Failed to write output")?;
            input.consume(n);
        }
        debug!("{}: {:?}", endpoint, input.stats());
    }

    output.sync().context("Failed to flush output")?;
    Ok(())
}

/// Copy `reader` to `writer` in `options.chunk`-sized requests.
pub fn copy<const CAP: usize>(
    reader: Box<dyn Read>,
    writer: Box<dyn Write>,
    options: CopyOptions,
) -> Result<CopyReport> {
    let mut input = InputBuffer::<_, CAP>::new(FromStd::new(reader));
    let mut output = if options.full_retry {
        OutputBuffer::<_, CAP>::with_full_retry(FromStd::new(writer))
    } else {
        OutputBuffer::<_, CAP>::new(FromStd::new(writer))
    };

    let mut chunk = vec![0u8; options.chunk];
    let mut bytes = 0u64;
    loop {
        let n = input.read(&mut chunk).context("Failed to read source")?;
        output
            .write(&chunk[..n])
            .context("Failed to write destination")?;
        bytes += n as u64;
        if n < chunk.len() {
            break;
        }
    }
    output.sync().context("Failed to flush destination")?;

    Ok(CopyReport {
        bytes,
        input: input.stats(),
        output: output.stats(),
    })
}

/// Print tokens of `reader`, one per line, or just their count.
pub fn print_tokens<const CAP: usize>(
    reader: Box<dyn Read>,
    out: Box<dyn Write>,
    count_only: bool,
) -> Result<()> {
    let mut input = InputBuffer::<_, CAP>::new(FromStd::new(reader));
    let mut output = OutputBuffer::<_, CAP>::new(FromStd::new(out));

    let mut count = 0u64;
    for token in tokens(&mut input) {
        let token = token.context("Failed to read input")?;
        count += 1;
        if !count_only {
            output.write(&token)?;
            output.put(b'\n')?;
        }
    }
    if count_only {
        writeln!(output, "{}", count)?;
    }

    output.sync().context("Failed to flush output")?;
    Ok(())
}

fn print_report(report: &CopyReport) {
    eprintln!("Copied {} bytes", report.bytes);
    eprintln!(
        "  input:  {} handle reads ({} passthrough), {} allocations",
        report.input.handle_reads, report.input.passthrough_reads, report.input.allocations
    );
    eprintln!(
        "  output: {} handle writes ({} passthrough), {} allocations",
        report.output.handle_writes, report.output.passthrough_writes, report.output.allocations
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor};

    fn sink(path: &std::path::Path) -> Box<dyn Write> {
        Box::new(fs::File::create(path).unwrap())
    }

    #[test]
    fn test_cli_parses_copy() {
        let cli = Cli::try_parse_from([
            "bufrs", "copy", "a.bin", "b.bin", "--chunk", "100", "-b", "4k", "--full-retry",
        ])
        .unwrap();
        match cli.command {
            Commands::Copy {
                chunk,
                buffer,
                full_retry,
                stats,
                ..
            } => {
                assert_eq!(chunk, 100);
                assert_eq!(buffer, BufferSize::K4);
                assert!(full_retry);
                assert!(!stats);
            }
            other => panic!("Expected Copy, got {:?}", other),
        }
    }

    #[test]
    fn test_cat_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["bufrs", "cat"]).unwrap();
        match cli.command {
            Commands::Cat { inputs, buffer } => {
                assert_eq!(inputs, ["-"]);
                assert_eq!(buffer, BufferSize::K4);
            }
            other => panic!("Expected Cat, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_file() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.bin");
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();

        let options = CopyOptions {
            chunk: 1000,
            full_retry: false,
        };
        let report =
            copy::<{ presets::BUF_4K }>(Box::new(Cursor::new(data.clone())), sink(&dst), options)
                .unwrap();

        assert_eq!(report.bytes, 10_000);
        assert_eq!(report.input.allocations, 1);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn test_copy_large_chunks_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out.bin");
        let data = vec![7u8; 3 * presets::BUF_4K];

        let options = CopyOptions {
            chunk: presets::BUF_4K,
            full_retry: true,
        };
        let report =
            copy::<{ presets::BUF_4K }>(Box::new(Cursor::new(data.clone())), sink(&dst), options)
                .unwrap();

        assert_eq!(report.input.allocations, 0);
        assert_eq!(report.output.allocations, 0);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn test_cat_concatenates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let out = dir.path().join("out.txt");
        fs::write(&a, "first\n").unwrap();
        fs::write(&b, "second\n").unwrap();

        let inputs = [Endpoint::Path(a), Endpoint::Path(b)];
        cat::<{ presets::BUF_4K }>(&inputs, sink(&out)).unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_tokens_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("tokens.txt");

        let text = Cursor::new(b"  alpha beta\n\tgamma ".to_vec());
        print_tokens::<{ presets::BUF_4K }>(Box::new(text), sink(&out), false).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "alpha\nbeta\ngamma\n");
    }

    #[test]
    fn test_tokens_count() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("count.txt");

        let text = Cursor::new(b"a b c d".to_vec());
        print_tokens::<{ presets::BUF_4K }>(Box::new(text), sink(&out), true).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "4\n");
    }
}
