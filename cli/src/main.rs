mod generate;
mod solve;
mod verify;

use env_logger::{Builder, Target};
use log::LevelFilter;

use clap::{ArgAction, Parser, Subcommand};

use crate::generate::Generate;
use crate::solve::Solve;
use crate::verify::Verify;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    #[arg(short, long, action = ArgAction::Count, default_value_t = 2)]
    verbose: u8,
    #[arg(
        long,
        help = "If set, logs will not include a timestamp",
        action = ArgAction::SetTrue
    )]
    no_time: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    Solve(Solve),
    Generate(Generate),
    Verify(Verify),
}

impl Cmd {
    fn run(self) -> i32 {
        match self {
            Self::Solve(solve) => solve.run(),
            Self::Generate(gen) => gen.run(),
            Self::Verify(verify) => verify.run(),
        }
    }
}

fn main() {
    let args = Cli::parse();
    let mut builder = Builder::new();
    builder
        .filter(
            None,
            match args.verbose {
                0 => LevelFilter::Error,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            },
        )
        .default_format()
        .target(Target::Stdout);

    if args.no_time {
        builder.format_timestamp(None);
    }
    builder.init();
    std::process::exit(args.cmd.run())
}
