//! Argument parsing and command execution for `oc-delta`.
//!
//! `signature` prints the block checksums of a basis file, the list a
//! receiver would send. `delta` computes those checksums on a producer thread,
//! scans a target file against them and prints the resulting operations.

use std::error::Error as _;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use checksums::strong::StrongAlgorithm;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use matching::{
    BlockOperation, CancellationToken, DeltaSummary, Operation, ScanConfig, SyncError, sync,
};
use signature::{ChecksumOptions, generate_block_checksums, spawn_checksum_producer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const PROGRAM_NAME: &str = "oc-delta";

/// Exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit status for invalid arguments.
pub const EXIT_USAGE: i32 = 1;
/// Exit status when a file could not be read or output could not be written.
pub const EXIT_IO: i32 = 2;
/// Exit status when the delta stream ended with an error operation.
pub const EXIT_DELTA: i32 = 3;

/// Entries buffered between the checksum producer and the table builder.
const PRODUCER_CAPACITY: usize = 64;

/// Parsed subcommand produced by [`parse_args`].
#[derive(Debug, Eq, PartialEq)]
enum ParsedCommand {
    Signature {
        basis: PathBuf,
        options: ChecksumOptions,
    },
    Delta {
        basis: PathBuf,
        target: PathBuf,
        options: ChecksumOptions,
        timeout: Option<Duration>,
    },
}

#[derive(Debug, Eq, PartialEq)]
struct ParsedArgs {
    verbosity: u8,
    command: ParsedCommand,
}

#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Delta(#[from] SyncError),
}

impl CommandError {
    fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    const fn exit_status(&self) -> i32 {
        match self {
            Self::Io { .. } => EXIT_IO,
            Self::Delta(_) => EXIT_DELTA,
        }
    }
}

fn block_size_arg() -> Arg {
    Arg::new("block-size")
        .long("block-size")
        .short('B')
        .value_name("SIZE")
        .help("Block length in bytes; both sides must agree.")
        .value_parser(value_parser!(NonZeroU32))
}

fn checksum_arg() -> Arg {
    Arg::new("checksum")
        .long("checksum")
        .value_name("NAME")
        .help("Strong checksum: md4, md5, sha1 or xxh64.")
        .value_parser(value_parser!(StrongAlgorithm))
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Block checksums and sender-side delta computation.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity; repeat for more detail.")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("signature")
                .about("Print the block checksums of BASIS.")
                .arg(
                    Arg::new("basis")
                        .value_name("BASIS")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(block_size_arg())
                .arg(checksum_arg()),
        )
        .subcommand(
            Command::new("delta")
                .about("Print the operations that turn BASIS into TARGET.")
                .arg(
                    Arg::new("basis")
                        .value_name("BASIS")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("target")
                        .value_name("TARGET")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(block_size_arg())
                .arg(checksum_arg())
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Abandon the scan after SECONDS.")
                        .value_parser(value_parser!(u64)),
                ),
        )
}

fn checksum_options(matches: &ArgMatches) -> ChecksumOptions {
    let mut options = ChecksumOptions::new();
    if let Some(&size) = matches.get_one::<NonZeroU32>("block-size") {
        options = options.with_block_size(size);
    }
    if let Some(&algorithm) = matches.get_one::<StrongAlgorithm>("checksum") {
        options = options.with_algorithm(algorithm);
    }
    options
}

fn required_path(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn parse_args<I, S>(arguments: I) -> Result<ParsedArgs, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let matches = clap_command().try_get_matches_from(arguments)?;
    let mut verbosity = matches.get_count("verbose");

    let command = match matches.subcommand() {
        Some(("signature", sub)) => {
            verbosity = verbosity.max(sub.get_count("verbose"));
            ParsedCommand::Signature {
                basis: required_path(sub, "basis"),
                options: checksum_options(sub),
            }
        }
        Some(("delta", sub)) => {
            verbosity = verbosity.max(sub.get_count("verbose"));
            ParsedCommand::Delta {
                basis: required_path(sub, "basis"),
                target: required_path(sub, "target"),
                options: checksum_options(sub),
                timeout: sub.get_one::<u64>("timeout").map(|&secs| Duration::from_secs(secs)),
            }
        }
        _ => {
            return Err(clap_command().error(
                clap::error::ErrorKind::MissingSubcommand,
                "a subcommand is required",
            ));
        }
    };

    Ok(ParsedArgs { verbosity, command })
}

/// Installs the global subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbosity: u8) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn open(path: &Path) -> Result<BufReader<File>, CommandError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|error| CommandError::io(format!("failed to open {}", path.display()), error))
}

fn output_error(error: io::Error) -> CommandError {
    CommandError::io("failed to write output", error)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

fn run_signature<Out: Write>(
    basis: &Path,
    options: &ChecksumOptions,
    stdout: &mut Out,
) -> Result<(), CommandError> {
    let reader = open(basis)?;
    let checksums = generate_block_checksums(reader, options)
        .map_err(|error| CommandError::io(format!("failed reading {}", basis.display()), error))?;

    info!(
        target: "delta::cli",
        blocks = checksums.len(),
        block_size = options.block_len(),
        algorithm = %options.algorithm(),
        "basis checksums computed"
    );

    for checksum in &checksums {
        writeln!(
            stdout,
            "{} {:08x} {}",
            checksum.index(),
            checksum.weak(),
            hex(checksum.strong())
        )
        .map_err(output_error)?;
    }
    Ok(())
}

fn write_operation<Out: Write>(stdout: &mut Out, operation: &BlockOperation) -> io::Result<()> {
    match operation.operation() {
        Operation::Reuse { block, .. } => writeln!(stdout, "{} reuse {block}", operation.index()),
        Operation::Literal(bytes) => writeln!(stdout, "{} literal {}", operation.index(), bytes.len()),
    }
}

fn run_delta<Out: Write>(
    basis: &Path,
    target: &Path,
    options: ChecksumOptions,
    timeout: Option<Duration>,
    stdout: &mut Out,
) -> Result<(), CommandError> {
    let basis_reader = open(basis)?;
    let target_reader = open(target)?;

    let cancel = timeout.map_or_else(CancellationToken::never, CancellationToken::with_timeout);
    let producer = spawn_checksum_producer(basis_reader, options, PRODUCER_CAPACITY)
        .map_err(|error| CommandError::io("failed to start checksum producer", error))?;
    let (receiver, producer_handle) = producer.into_parts();

    let stream = sync(
        target_reader,
        options.algorithm(),
        receiver,
        cancel,
        ScanConfig::from(&options),
    )
    .map_err(|error| CommandError::io("failed to start delta scanner", error))?;

    if producer_handle.join().is_err() {
        return Err(CommandError::io(
            "checksum producer failed",
            io::Error::other("producer thread panicked"),
        ));
    }

    let mut summary = DeltaSummary::default();
    for item in stream {
        let operation = item?;
        write_operation(stdout, &operation).map_err(output_error)?;
        summary.push(operation);
    }

    debug!(
        target: "delta::cli",
        operations = summary.operations().len(),
        "delta stream closed"
    );
    writeln!(
        stdout,
        "total {} bytes: {} blocks reused ({} bytes), {} literal bytes",
        summary.total_bytes(),
        summary.reused_blocks(),
        summary.copy_bytes(),
        summary.literal_bytes()
    )
    .map_err(output_error)
}

fn execute<Out: Write>(parsed: ParsedArgs, stdout: &mut Out) -> Result<(), CommandError> {
    match parsed.command {
        ParsedCommand::Signature { basis, options } => run_signature(&basis, &options, stdout),
        ParsedCommand::Delta {
            basis,
            target,
            options,
            timeout,
        } => run_delta(&basis, &target, options, timeout, stdout),
    }
}

fn write_error<Err: Write>(stderr: &mut Err, error: &CommandError) {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    let _ = writeln!(stderr, "{PROGRAM_NAME}: {message}");
}

/// Parses `arguments`, runs the selected subcommand and returns its exit status.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let parsed = match parse_args(arguments) {
        Ok(parsed) => parsed,
        Err(error) => {
            let rendered = error.render();
            return if error.use_stderr() {
                let _ = write!(stderr, "{rendered}");
                EXIT_USAGE
            } else {
                let _ = write!(stdout, "{rendered}");
                EXIT_OK
            };
        }
    };

    init_tracing(parsed.verbosity);

    match execute(parsed, stdout) {
        Ok(()) => EXIT_OK,
        Err(error) => {
            write_error(stderr, &error);
            error.exit_status()
        }
    }
}

/// Maps a status returned by [`run`] onto a process exit code.
pub fn exit_code_from(status: i32) -> ExitCode {
    u8::try_from(status).map_or(ExitCode::FAILURE, ExitCode::from)
}

/// Runs the front end and converts the status into an [`ExitCode`].
#[must_use]
pub fn run_with<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    exit_code_from(run(args, stdout, stderr))
}
