use std::fs;
use std::process::ExitCode;

use clap::Parser;
use inkwell::context::Context;
use log::debug;
use miette::{miette, IntoDiagnostic, NamedSource, Report, WrapErr};

use mila::{codegen, parsing, Lexer};

mod cli;

fn main() -> ExitCode {
    env_logger::init();
    let args = cli::Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &cli::Args) -> miette::Result<()> {
    let source = fs::read_to_string(&args.input_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot read {}", args.input_file.display()))?;
    let input_file = args.input_file.display().to_string();

    if args.lex {
        debug!("dumping tokens of {input_file}");
        for token in Lexer::new(&source) {
            let token = token.map_err(|error| attach(error, &input_file, &source))?;
            println!("{}", token.token.describe());
        }
        return Ok(());
    }

    let program = parsing::parse(&source).map_err(|error| attach(error, &input_file, &source))?;
    debug!(
        "parsed program `{}` with {} globals",
        program.name,
        program.globals.len()
    );

    if args.parse {
        return program.pretty_print().into_diagnostic();
    }

    let output = args.output.as_ref().expect("clap enforces a mode");
    let context = Context::create();
    let module =
        codegen::compile(&context, &program).map_err(|error| attach(error, &input_file, &source))?;
    debug!("emitting IR to {}", output.display());

    if output.as_os_str() == "-" {
        print!("{}", module.print_to_string().to_string());
    } else {
        module
            .print_to_file(output)
            .map_err(|error| miette!("Cannot write IR to {}: {error}", output.display()))?;
    }

    Ok(())
}

/// Attach the source text so the reporter can render labeled spans
fn attach(
    error: impl miette::Diagnostic + Send + Sync + 'static,
    name: &str,
    source: &str,
) -> Report {
    Report::new(error).with_source_code(NamedSource::new(name, source.to_string()))
}
