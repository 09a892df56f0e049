//! UCFG command-line tool for checking and formatting UCFG documents.
//!
//! Usage: ucfg [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -i, --indent <N>       Indent width (1, 2, 3, 4 or 8) [default: UCFG_INDENT or 2]
//!   -w, --write            Rewrite the input file in canonical form
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if file is valid (exit 0 if valid, 1 if invalid)
//!   --status               Print the parser status before the output
//!   -h, --help             Print help
//!   -V, --version          Print version

use libucfg::{Formatter, Indent, Parser};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Get the default indent from the UCFG_INDENT env var, if it names a valid width.
fn default_indent() -> Indent {
    std::env::var("UCFG_INDENT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .and_then(|n| Indent::try_from(n).ok())
        .unwrap_or_default()
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("UCFG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// What to do with each input.
#[derive(Clone, Copy)]
struct Options<'a> {
    indent: Indent,
    write_back: bool,
    output_file: Option<&'a str>,
    check_only: bool,
    show_status: bool,
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    let mut indent = default_indent();
    let mut write_back = false;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut show_status = false;
    let mut input_path: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("ucfg {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-i" | "--indent" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --indent requires a width argument");
                    process::exit(1);
                }
                indent = match args[i].parse::<usize>().map(Indent::try_from) {
                    Ok(Ok(indent)) => indent,
                    _ => {
                        eprintln!("Error: Unsupported indent: {} (use 1, 2, 3, 4 or 8)", args[i]);
                        process::exit(1);
                    }
                };
            }
            "-w" | "--write" => {
                write_back = true;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "--status" => {
                show_status = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            _ => {
                if input_path.is_some() {
                    eprintln!("Error: Multiple input paths not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
        }
        i += 1;
    }

    if write_back && output_file.is_some() {
        eprintln!("Error: --write and --output are mutually exclusive");
        process::exit(1);
    }
    if write_back && input_path.is_none() {
        eprintln!("Error: --write requires an input file");
        process::exit(1);
    }

    let options = Options {
        indent,
        write_back,
        output_file,
        check_only,
        show_status,
    };

    if let Some(path) = input_path {
        if Path::new(path).is_dir() {
            if output_file.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, options));
        }
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&input, input_path, options));
}

/// Process every `.ucfg` file in a directory, returning the exit code.
fn process_directory(dir_path: &str, options: Options) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path, e);
            return 1;
        }
    };

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "ucfg").unwrap_or(false))
        .collect();
    paths.sort();
    debug!(dir = dir_path, files = paths.len(), "processing directory");

    let mut had_errors = false;
    for path in paths {
        let path_str = path.to_string_lossy();
        let input = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path_str, e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(&path_str), options) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

fn process_input(input: &str, input_file: Option<&str>, options: Options) -> i32 {
    let filename = input_file.map(|p| {
        Path::new(p)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.to_string())
    });

    let mut parser = match &filename {
        Some(name) => Parser::with_filename(input, name),
        None => Parser::new(input),
    };
    let result = parser.parse();

    let mut output = String::new();
    if options.show_status {
        let status = parser.status();
        output.push_str(&format!(
            "Status: {}\nLine: {}\nColumn: {}\nPosition: {}\n\n",
            status.kind, status.line, status.column, status.position
        ));
    }

    let root = match result {
        Ok(root) => root,
        Err(e) => {
            if options.show_status {
                print!("{}", output);
            }
            match (input_file, &filename) {
                (Some(_), Some(name)) => e.write_report(name, input, io::stderr()),
                _ => eprintln!("Parse error: {}", e),
            }
            return 1;
        }
    };

    if options.check_only {
        if let Some(path) = input_file {
            println!("{}: ok", path);
        } else {
            println!("ok");
        }
        return 0;
    }

    match Formatter::with_indent(&root, options.indent).stringify() {
        Ok(text) => output.push_str(&text),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    }
    output.push('\n');

    if options.write_back {
        if let Some(path) = input_file {
            return write_file(path, &output);
        }
    }
    if let Some(path) = options.output_file {
        return write_file(path, &output);
    }
    print!("{}", output);
    0
}

fn write_file(path: &str, content: &str) -> i32 {
    match fs::write(path, content) {
        Ok(()) => {
            debug!(path, bytes = content.len(), "wrote output");
            0
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", path, e);
            1
        }
    }
}

fn print_help() {
    println!(
        "ucfg - UCFG command-line tool

USAGE:
    ucfg [OPTIONS] [FILE|DIR]

ARGS:
    [FILE|DIR]    Input file or directory (reads from stdin if not provided)
                  When a directory is given, processes all .ucfg files in it

OPTIONS:
    -i, --indent <N>       Indent width: 1, 2, 3, 4 or 8
                           [default: $UCFG_INDENT, or 2]

    -w, --write            Rewrite the input file in canonical form

    -o, --output <FILE>    Write output to specified file (not valid with directory input)

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    --status               Print the parser status (Status, Line, Column, Position)
                           followed by a blank line and the canonical output

    -h, --help             Print help

    -V, --version          Print version

ENVIRONMENT:
    UCFG_INDENT            Default indent width
    UCFG_LOG               Log filter, e.g. debug or libucfg=trace [default: warn]

EXAMPLES:
    # Reformat a file to canonical form
    ucfg nginx.ucfg

    # Reformat in place with four-space indentation
    ucfg -i 4 -w nginx.ucfg

    # Check every .ucfg file in a directory
    ucfg --check conf.d/

    # Read from stdin
    cat nginx.ucfg | ucfg --status"
    );
}
