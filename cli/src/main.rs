use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use brine_layout::{compile, decode_to_json, encode_json, Diagnostic};
use brine_layout_compiler::{compile_layout_to_c, Layout, LayoutOptions};
use brine_layout_compiler::error::LayoutError;

#[derive(Parser)]
#[command(name = "blayout")]
#[command(about = "Elaborate record schemas into binary layouts, encode/decode buffers, or generate C headers", long_about = None)]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON schema file
    #[arg(short, long)]
    schema: PathBuf,

    /// Encode/decode scalars big-endian
    #[arg(long)]
    big_endian: bool,

    /// Lay records out without padding
    #[arg(long)]
    packed: bool,

    #[arg(long, default_value_t = brine_layout_compiler::DEFAULT_MAX_ARRAY_ELEMENTS)]
    max_array_elements: usize,

    #[arg(long, default_value_t = brine_layout_compiler::DEFAULT_MAX_STRUCT_SIZE)]
    max_struct_size: usize,

    #[arg(long, default_value_t = brine_layout_compiler::DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting_depth: usize,
}

impl LayoutArgs {
    fn options(&self) -> LayoutOptions {
        LayoutOptions {
            big_endian:         self.big_endian,
            packed:             self.packed,
            max_array_elements: self.max_array_elements,
            max_struct_size:    self.max_struct_size,
            max_nesting_depth:  self.max_nesting_depth,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the elaborated layout table as JSON
    Dump,

    /// Encode a JSON value file into a binary buffer
    Encode {
        /// Record type to encode
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output binary file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decode a binary buffer to JSON
    Decode {
        /// Record type to decode
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Input binary file
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a C header with matching struct definitions
    GenC {
        /// Output `.h` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Output files are never written below these directories.
const PROTECTED_DIRS: &[&str] = &["/etc", "/bin", "/sbin", "/usr/bin", "/usr/sbin", "/boot", "/sys", "/proc"];

/// Makes `path` absolute and lexically resolves `.` and `..`.
fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Refuses empty paths and paths inside system directories.
fn validate_output_path(path: &Path, purpose: &str) -> Result<PathBuf, LayoutError> {
    let refuse = |message: String| LayoutError::Io(io::Error::new(io::ErrorKind::PermissionDenied, message));
    if path.as_os_str().is_empty() {
        return Err(refuse(format!("Invalid path for {}: empty string not allowed", purpose)));
    }
    let absolute = absolute_path(path).map_err(LayoutError::Io)?;
    if PROTECTED_DIRS.iter().any(|dir| absolute.starts_with(dir)) {
        return Err(refuse(format!(
            "Refusing to write {} to system directory: {}",
            purpose,
            absolute.display()
        )));
    }
    Ok(absolute)
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic);
    }
}

fn load_layout(path: &Path, options: &LayoutOptions) -> Result<Layout, LayoutError> {
    let text = fs::read_to_string(path).map_err(LayoutError::Io)?;
    let report = compile(&text, options)?;
    print_diagnostics(&report.diagnostics);
    Ok(report.into_value())
}

fn write_or_print(output: Option<&PathBuf>, purpose: &str, text: &str) -> Result<(), LayoutError> {
    match output {
        Some(path) => {
            let path = validate_output_path(path, purpose)?;
            fs::write(&path, text).map_err(LayoutError::Io)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() -> Result<(), LayoutError> {
    env_logger::init();
    let cli = Cli::parse();

    let options = cli.layout.options();
    let layout = load_layout(&cli.layout.schema, &options)?;

    match &cli.command {
        Commands::Dump => {
            let json = serde_json::to_string_pretty(&layout)?;
            println!("{}", json);
            Ok(())
        }

        Commands::Encode { type_name, input, output } => {
            let output = validate_output_path(output, "encoded buffer")?;
            let text = fs::read_to_string(input).map_err(LayoutError::Io)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let report = encode_json(&layout, type_name, &value)?;
            print_diagnostics(&report.diagnostics);
            fs::write(&output, &report.value).map_err(LayoutError::Io)?;
            println!(
                "Encoded {} → {} ({} bytes)",
                input.display(),
                output.display(),
                report.value.len()
            );
            Ok(())
        }

        Commands::Decode { type_name, input, output } => {
            let data = fs::read(input).map_err(LayoutError::Io)?;
            let json = decode_to_json(&layout, type_name, &data)?;
            write_or_print(output.as_ref(), "decoded JSON", &json)
        }

        Commands::GenC { output } => {
            let header = compile_layout_to_c(&layout);
            write_or_print(output.as_ref(), "C header", &header)
        }
    }
}
