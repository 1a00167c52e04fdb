extern crate chrono;
extern crate env_logger;
extern crate failure;
extern crate gitea_github_sync;
#[macro_use]
extern crate log;
extern crate shellexpand;
extern crate structopt;

use std::env;
use std::io::{self, Write};
use std::process;

use chrono::Local;
use env_logger::Builder;
use failure::{Error, ResultExt};
use gitea_github_sync::driver::display_error;
use gitea_github_sync::report::print_repositories;
use gitea_github_sync::{Config, Destination, Driver, Source};
use log::LevelFilter;
use structopt::StructOpt;

fn main() {
    let args = Args::from_args();

    let outcome = if args.example_config {
        generate_example(&mut io::stdout())
    } else {
        run(&args)
    };

    if let Err(e) = outcome {
        display_error(&mut io::stderr(), &e).ok();

        if log_enabled!(log::Level::Debug) {
            debug!("{}", e.backtrace());
        }

        process::exit(1);
    }
}

fn generate_example<W: Write>(out: &mut W) -> Result<(), Error> {
    let example = Config::example();

    writeln!(out, "{}", example.as_toml()?)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), Error> {
    let cmd = match args.cmd {
        Some(ref cmd) => cmd,
        None => {
            return Err(failure::err_msg(
                "No command given, run with --help to see what's available",
            ))
        }
    };

    initialize_logging(args.verbosity)?;
    let cfg = load_config(&args.config_file)?;

    if log_enabled!(log::Level::Debug) {
        for line in format!("{:#?}", cfg).lines() {
            debug!("{}", line);
        }
    }

    let driver = Driver::with_config(cfg)?;
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    execute(cmd, &driver, &mut stdout)
}

fn execute<S, D, W>(cmd: &Command, driver: &Driver<S, D>, out: &mut W) -> Result<(), Error>
where
    S: Source,
    D: Destination,
    W: Write,
{
    match *cmd {
        Command::ListSource { stats } => {
            let repos = driver.source_repositories()?;
            print_repositories(out, &repos, stats)?;
        }
        Command::ListDestination { stats } => {
            let repos = driver.destination_repositories()?;
            print_repositories(out, &repos, stats)?;
        }
        Command::Migrate { ref full_repo_name } => {
            let repo = driver.migrate_one(full_repo_name)?;
            writeln!(out, "Migration of {} started", repo)?;
        }
        Command::Sync => {
            driver.sync(out)?;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
#[structopt(about = "Mirror the GitHub repositories missing from a Gitea instance.")]
struct Args {
    #[structopt(short = "c", long = "config", default_value = "~/.config/gitea-github-sync/config.toml",
                help = "The configuration file to use.")]
    config_file: String,
    #[structopt(short = "v", long = "verbose", parse(from_occurrences),
                help = "Verbose output (repeat for more verbosity)")]
    verbosity: u64,
    #[structopt(long = "example-config",
                help = "Generate an example config and immediately exit.")]
    example_config: bool,
    #[structopt(subcommand)]
    cmd: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, StructOpt)]
enum Command {
    /// List the repositories on GitHub.
    #[structopt(name = "list-source")]
    ListSource {
        #[structopt(long = "stats", help = "Show how many repos have each visibility.")]
        stats: bool,
    },
    /// List the repositories on Gitea.
    #[structopt(name = "list-destination")]
    ListDestination {
        #[structopt(long = "stats", help = "Show how many repos have each visibility.")]
        stats: bool,
    },
    /// Mirror a single GitHub repository into Gitea.
    #[structopt(name = "migrate")]
    Migrate {
        #[structopt(help = "The repository's full name (e.g. \"owner/repo\").")]
        full_repo_name: String,
    },
    /// Mirror every GitHub repository which isn't on Gitea yet.
    #[structopt(name = "sync")]
    Sync,
}

fn load_config(location: &str) -> Result<Config, Error> {
    let path = shellexpand::full(location)
        .with_context(|_| format!("Unable to expand {:?}", location))?;

    let cfg = Config::from_file(&*path).context("Couldn't load the config")?;
    Ok(cfg)
}

/// Each `-v` turns up logging for this crate. `RUST_LOG` can override it.
fn log_level(verbosity: u64) -> Option<LevelFilter> {
    match verbosity {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn initialize_logging(verbosity: u64) -> Result<(), Error> {
    let mut builder = Builder::new();

    if let Some(level) = log_level(verbosity) {
        builder.filter_module("gitea_github_sync", level);
    }

    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.format(|out, record| {
        let location = match record.line() {
            Some(line) => format!("{}#{}", record.target(), line),
            None => record.target().to_string(),
        };

        writeln!(
            out,
            "{} [{:5}] ({}): {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            location,
            record.args()
        )
    });

    builder.try_init().context("Unable to initialize logging")?;

    Ok(())
}
