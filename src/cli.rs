use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Compiler for the Mila language
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
#[command(group = ArgGroup::new("mode").required(true))]
pub struct Args {
    /// Source code input file
    pub input_file: PathBuf,

    /// Print the token stream, one token per line
    #[arg(short = 'l', long = "lex", group = "mode")]
    pub lex: bool,

    /// Print the parsed AST as a tree
    #[arg(short = 'p', long = "parse", group = "mode")]
    pub parse: bool,

    /// Compile and write the textual IR to this file (`-` for stdout)
    #[arg(short = 'o', long = "output", group = "mode", value_name = "OUT_FILE")]
    pub output: Option<PathBuf>,
}
