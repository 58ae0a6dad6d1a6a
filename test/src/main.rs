mod e2e_tests;

use anyhow::Result;
use clap::Parser;
use quill_tracing::{init_tracing_subscriber, TracingSubscriberOptions};

#[derive(Parser)]
struct Cli {
    /// If specified, only run tests matching this regex
    #[clap(value_parser)]
    filter_regex: Option<regex::Regex>,

    /// If specified, skip tests matching this regex
    #[clap(long = "skip")]
    skip_regex: Option<regex::Regex>,

    /// Print the analysed AST of every compiled module
    #[clap(long)]
    print_ast: bool,

    /// Log each pass as it runs
    #[clap(long)]
    print_passes: bool,

    /// Use verbose output, `-vv` for trace output
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub include: Option<regex::Regex>,
    pub exclude: Option<regex::Regex>,
}

impl FilterConfig {
    fn admits(&self, name: &str) -> bool {
        self.include.as_ref().map_or(true, |regex| regex.is_match(name))
            && !self.exclude.as_ref().map_or(false, |regex| regex.is_match(name))
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub print_ast: bool,
    pub print_passes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_subscriber(TracingSubscriberOptions {
        verbosity: Some(cli.verbose),
        ..Default::default()
    });

    let filter_config = FilterConfig {
        include: cli.filter_regex,
        exclude: cli.skip_regex,
    };
    let run_config = RunConfig {
        print_ast: cli.print_ast,
        print_passes: cli.print_passes,
    };
    e2e_tests::run(&filter_config, &run_config)
}
