//! vetter CLI - parallel static analysis driver
//!
//! Usage: vetter <command> [arguments]

mod check_cmd;
mod checkers_cmd;
mod convert_cmd;

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use vetter::{AnalyzerKind, OutputFormat};

fn print_usage() {
    eprintln!("vetter - Parallel static analysis driver for C/C++");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  vetter <command> [arguments]");
    eprintln!("  vetter --help");
    eprintln!();
    eprintln!("  vetter check --commands <FILE> --workspace <DIR> [--name <NAME>] [--jobs <N>]");
    eprintln!("               [--analyzer <clang-tidy|clangsa>] [--tidy-binary <PATH>] [--sa-binary <PATH>]");
    eprintln!("               [--skip <FILE>] [--enable <CHECK>]... [--disable <CHECK>]... [--keep-tmp]");
    eprintln!("  vetter convert --input <FILE> [--report <FILE>]");
    eprintln!("  vetter checkers [--binary <PATH>]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check     Analyze every entry of a compilation database");
    eprintln!("  convert   Convert a clang-tidy output dump into a diagnostic document");
    eprintln!("  checkers  List the checkers the installed clang-tidy supports");
    eprintln!();
    eprintln!("Global arguments:");
    eprintln!("  --output <FORMAT>   Output format: human (default) or json");
    eprintln!();
    eprintln!("Check arguments:");
    eprintln!("  --commands <FILE>   Path to compile_commands.json");
    eprintln!("  --workspace <DIR>   Directory the report directory is created under");
    eprintln!("  --name <NAME>       Run name used in the report directory prefix (default: analysis)");
    eprintln!("  --jobs <N>          Number of parallel analyzer jobs (default: all cores)");
    eprintln!("  --analyzer <KIND>   Analyzer family: clang-tidy (default) or clangsa");
    eprintln!("  --tidy-binary <PATH> clang-tidy binary (default: clang-tidy from PATH)");
    eprintln!("  --sa-binary <PATH>  Clang Static Analyzer binary (default: clang from PATH)");
    eprintln!("  --skip <FILE>       Skip file: one glob per line, -glob skips, +glob keeps");
    eprintln!("  --enable <CHECK>    Enable checkers matching this prefix (repeatable)");
    eprintln!("  --disable <CHECK>   Disable checkers matching this prefix (repeatable)");
    eprintln!("  --keep-tmp          Keep the report directory and per-invocation artifacts");
    eprintln!();
    eprintln!("Convert arguments:");
    eprintln!("  --input <FILE>      clang-tidy output dump to parse");
    eprintln!("  --report <FILE>     Write the diagnostic document here instead of stdout");
    eprintln!();
    eprintln!("Checkers arguments:");
    eprintln!("  --binary <PATH>     clang-tidy binary (default: clang-tidy from PATH)");
}

enum Command {
    Check {
        commands: PathBuf,
        workspace: PathBuf,
        name: String,
        jobs: Option<usize>,
        analyzer: AnalyzerKind,
        tidy_binary: Option<PathBuf>,
        sa_binary: Option<PathBuf>,
        skip: Option<PathBuf>,
        enable: Vec<String>,
        disable: Vec<String>,
        keep_tmp: bool,
        output_format: OutputFormat,
    },
    Convert {
        input: PathBuf,
        report: Option<PathBuf>,
        output_format: OutputFormat,
    },
    Checkers {
        binary: Option<PathBuf>,
        output_format: OutputFormat,
    },
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = &args[1];

    if command == "--version" || command == "-V" {
        println!("{}", vetter::version::version());
        std::process::exit(0);
    }

    if command == "--help" || command == "-h" {
        print_usage();
        std::process::exit(0);
    }

    match command.as_str() {
        "check" => {
            let mut commands: Option<PathBuf> = None;
            let mut workspace: Option<PathBuf> = None;
            let mut name = "analysis".to_string();
            let mut jobs: Option<usize> = None;
            let mut analyzer = AnalyzerKind::ClangTidy;
            let mut tidy_binary: Option<PathBuf> = None;
            let mut sa_binary: Option<PathBuf> = None;
            let mut skip: Option<PathBuf> = None;
            let mut enable: Vec<String> = Vec::new();
            let mut disable: Vec<String> = Vec::new();
            let mut keep_tmp = false;
            let mut output_format = OutputFormat::Human;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--commands" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--commands requires an argument"));
                        }
                        commands = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--workspace" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--workspace requires an argument"));
                        }
                        workspace = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--name" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--name requires an argument"));
                        }
                        name = args[i + 1].clone();
                        i += 2;
                    }
                    "--jobs" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--jobs requires an argument"));
                        }
                        jobs = Some(args[i + 1].parse()?);
                        i += 2;
                    }
                    "--analyzer" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--analyzer requires an argument"));
                        }
                        analyzer = AnalyzerKind::parse(&args[i + 1]).ok_or_else(|| {
                            anyhow::anyhow!(
                                "Invalid analyzer: {}. Must be clang-tidy or clangsa",
                                args[i + 1]
                            )
                        })?;
                        i += 2;
                    }
                    "--tidy-binary" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--tidy-binary requires an argument"));
                        }
                        tidy_binary = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--sa-binary" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--sa-binary requires an argument"));
                        }
                        sa_binary = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--skip" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--skip requires an argument"));
                        }
                        skip = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--enable" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--enable requires an argument"));
                        }
                        enable.push(args[i + 1].clone());
                        i += 2;
                    }
                    "--disable" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--disable requires an argument"));
                        }
                        disable.push(args[i + 1].clone());
                        i += 2;
                    }
                    "--keep-tmp" => {
                        keep_tmp = true;
                        i += 1;
                    }
                    "--output" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--output requires an argument"));
                        }
                        output_format = OutputFormat::from_str(&args[i + 1]).ok_or_else(|| {
                            anyhow::anyhow!(
                                "Invalid output format: {}. Must be human or json",
                                args[i + 1]
                            )
                        })?;
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            let commands = commands.ok_or_else(|| anyhow::anyhow!("--commands is required"))?;
            let workspace =
                workspace.ok_or_else(|| anyhow::anyhow!("--workspace is required"))?;

            Ok(Command::Check {
                commands,
                workspace,
                name,
                jobs,
                analyzer,
                tidy_binary,
                sa_binary,
                skip,
                enable,
                disable,
                keep_tmp,
                output_format,
            })
        }
        "convert" => {
            let mut input: Option<PathBuf> = None;
            let mut report: Option<PathBuf> = None;
            let mut output_format = OutputFormat::Human;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--input" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--input requires an argument"));
                        }
                        input = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--report" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--report requires an argument"));
                        }
                        report = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--output" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--output requires an argument"));
                        }
                        output_format = OutputFormat::from_str(&args[i + 1]).ok_or_else(|| {
                            anyhow::anyhow!(
                                "Invalid output format: {}. Must be human or json",
                                args[i + 1]
                            )
                        })?;
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            let input = input.ok_or_else(|| anyhow::anyhow!("--input is required"))?;

            Ok(Command::Convert {
                input,
                report,
                output_format,
            })
        }
        "checkers" => {
            let mut binary: Option<PathBuf> = None;
            let mut output_format = OutputFormat::Human;

            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--binary" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--binary requires an argument"));
                        }
                        binary = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    }
                    "--output" => {
                        if i + 1 >= args.len() {
                            return Err(anyhow::anyhow!("--output requires an argument"));
                        }
                        output_format = OutputFormat::from_str(&args[i + 1]).ok_or_else(|| {
                            anyhow::anyhow!(
                                "Invalid output format: {}. Must be human or json",
                                args[i + 1]
                            )
                        })?;
                        i += 2;
                    }
                    _ => {
                        return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                    }
                }
            }

            Ok(Command::Checkers {
                binary,
                output_format,
            })
        }
        _ => Err(anyhow::anyhow!("Unknown command: {}", command)),
    }
}

fn main() -> ExitCode {
    match parse_args() {
        Ok(Command::Check {
            commands,
            workspace,
            name,
            jobs,
            analyzer,
            tidy_binary,
            sa_binary,
            skip,
            enable,
            disable,
            keep_tmp,
            output_format,
        }) => {
            if let Err(e) = check_cmd::run_check(check_cmd::CheckOptions {
                commands,
                workspace,
                name,
                jobs,
                analyzer,
                tidy_binary,
                sa_binary,
                skip,
                enable,
                disable,
                keep_tmp,
                output_format,
            }) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Convert {
            input,
            report,
            output_format,
        }) => {
            if let Err(e) = convert_cmd::run_convert(input, report, output_format) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Ok(Command::Checkers {
            binary,
            output_format,
        }) => {
            if let Err(e) = checkers_cmd::run_checkers(binary, output_format) {
                eprintln!("Error: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            ExitCode::from(1)
        }
    }
}
