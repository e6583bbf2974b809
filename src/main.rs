use aont::cli::{
    format_size, join_files, list_order, parse_size, reject_split_options, resolve_reverse_args,
    reverse_files, show_info, split_file, transform_file, ReverseOptions, SplitOptions,
    TransformOptions, STDIO,
};
use aont::error::AontError;
use aont::naming::expand_all;
use aont::params::{HashAlgorithm, KeySize, Params};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Version info from build.rs
const VERSION: &str = env!("AONT_VERSION");
const BUILD: &str = env!("AONT_BUILD");
const PROFILE: &str = env!("AONT_PROFILE");
const GIT_HASH: &str = env!("AONT_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "aont")]
#[command(author, about = "All-or-nothing transform with multi-part splitting", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of parts to produce
    #[arg(short = 'n', long, global = true)]
    number: Option<usize>,

    /// Size of each part (k, m, g, t, p suffixes allowed)
    #[arg(short = 's', long, global = true, value_parser = parse_size_arg)]
    size: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a file, optionally into several parts
    #[command(alias = "t")]
    Transform {
        /// Hash used to mangle the key
        #[arg(long, default_value = "sha256", value_parser = parse_hash)]
        hash: HashAlgorithm,

        /// AES key size in bits (128, 192 or 256)
        #[arg(long, default_value = "256", value_parser = parse_key_size)]
        key_bits: KeySize,

        /// Input file, `-` or absent for stdin
        input: Option<String>,

        /// Output file or part template (`*` or `{}` is the part number)
        output: Option<String>,
    },

    /// Reverse a transform; the last argument is the output when more than one is given
    #[command(alias = "r")]
    Reverse {
        /// Hash used to mangle the key
        #[arg(long, default_value = "sha256", value_parser = parse_hash)]
        hash: HashAlgorithm,

        /// AES key size in bits (128, 192 or 256)
        #[arg(long, default_value = "256", value_parser = parse_key_size)]
        key_bits: KeySize,

        /// Input files or wildcard patterns, then the output
        #[arg(required = true)]
        args: Vec<String>,
    },

    /// Split a file verbatim into parts
    Split {
        /// Input file, `-` for stdin
        input: String,

        /// Part template (`*` or `{}` is the part number)
        template: String,
    },

    /// Concatenate parts verbatim
    Join {
        /// Input files or wildcard patterns, then the output
        #[arg(required = true, num_args = 2..)]
        args: Vec<String>,
    },

    /// Show the order in which parts would be joined
    #[command(alias = "v")]
    List {
        /// Files or wildcard patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Show the layout of a transformed stream
    #[command(alias = "i")]
    Info {
        /// Hash used to mangle the key
        #[arg(long, default_value = "sha256", value_parser = parse_hash)]
        hash: HashAlgorithm,

        /// AES key size in bits (128, 192 or 256)
        #[arg(long, default_value = "256", value_parser = parse_key_size)]
        key_bits: KeySize,

        /// Print JSON
        #[arg(long)]
        json: bool,

        /// Files or wildcard patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },
}

fn parse_hash(s: &str) -> Result<HashAlgorithm, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_key_size(s: &str) -> Result<KeySize, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_size_arg(s: &str) -> Result<u64, String> {
    parse_size(s).map_err(|e| format!("{}", e))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli, command: Commands) -> Result<(), AontError> {
    let (number, size) = (cli.number, cli.size);

    match command {
        Commands::Transform {
            hash,
            key_bits,
            input,
            output,
        } => {
            let options = TransformOptions {
                number: number.unwrap_or(0),
                size: size.unwrap_or(0),
                params: Params::new(key_bits, hash),
            };
            let input = input.unwrap_or_else(|| STDIO.to_string());
            let report = transform_file(&input, output.as_deref(), &options)?;
            for path in &report.outputs {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }

        Commands::Reverse {
            hash,
            key_bits,
            args,
        } => {
            reject_split_options("reverse", number, size)?;
            let (inputs, output) = resolve_reverse_args(&args)?;
            let options = ReverseOptions {
                params: Params::new(key_bits, hash),
            };
            let summary = reverse_files(&inputs, &output, &options)?;
            if output != STDIO {
                println!(
                    "Restored {} from {} part(s) to {}",
                    format_size(summary.plaintext_bytes),
                    inputs.len(),
                    output
                );
            }
            Ok(())
        }

        Commands::Split { input, template } => {
            let options = SplitOptions {
                number: number.unwrap_or(0),
                size: size.unwrap_or(0),
            };
            for path in split_file(&input, &template, &options)? {
                println!("{}", path.display());
            }
            Ok(())
        }

        Commands::Join { mut args } => {
            reject_split_options("join", number, size)?;
            let output = args.pop().unwrap_or_default();
            let inputs = expand_all(&args)?;
            let bytes = join_files(&inputs, &output)?;
            if output != STDIO {
                println!("Joined {} part(s), {}", inputs.len(), format_size(bytes));
            }
            Ok(())
        }

        Commands::List { patterns } => {
            reject_split_options("list", number, size)?;
            for path in list_order(&patterns)? {
                println!("{}", path.display());
            }
            Ok(())
        }

        Commands::Info {
            hash,
            key_bits,
            json,
            patterns,
        } => {
            reject_split_options("info", number, size)?;
            let inputs = expand_all(&patterns)?;
            let info = show_info(&inputs, &Params::new(key_bits, hash), json)?;
            print!("{}", info);
            if json {
                println!();
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    if cli.version {
        println!("aont {}", get_version());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    let command = match cli.command.take() {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    match run(cli, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
