use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process;

use colored::*;
use pinghosts::{
    config::PingConfig,
    network::ProbeMethod,
    output::{OutputConfig, OutputFormat, OutputManager},
    scanner::ProbePool,
    utils::{file_input::hosts_from_file, Logger},
    PoolError,
};

/// Exit status used when the operator interrupts a run
const EXIT_INTERRUPTED: i32 = 130;

fn build_cli() -> Command {
    Command::new("pinghosts")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ping every host listed in a file and report which ones are up")
        .after_help(
            "example hosts.txt file:\n    localhost\n    127.0.0.1\n    myhostname.mydomain",
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("File with list of IPs/hostnames, one per line (default: hosts.txt)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("display")
                .short('d')
                .long("display")
                .help("Display the loaded host list before pinging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .short('c')
                .long("csv")
                .help("CSV output to screen (host,status)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .help("Output format: text, csv or json")
                .conflicts_with("csv"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .help("Maximum number of hosts pinged at the same time (default: 30)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("method")
                .short('m')
                .long("method")
                .value_name("METHOD")
                .help("Probe method: system (ping binary) or icmp (raw socket, needs privileges)"),
        )
        .arg(
            Arg::new("ordered")
                .long("ordered")
                .help("Report hosts in file order instead of completion order")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Read settings from this TOML file instead of ~/.pinghosts.toml")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v, -vv)")
                .action(ArgAction::Count),
        )
}

/// Merge config file settings with command line overrides
fn resolve_config(matches: &ArgMatches) -> anyhow::Result<PingConfig> {
    let base = match matches.get_one::<PathBuf>("config") {
        Some(path) => PingConfig::from_toml_file(path)?,
        None => PingConfig::load_default_config(),
    };

    apply_overrides(matches, base)
}

fn apply_overrides(matches: &ArgMatches, mut config: PingConfig) -> anyhow::Result<PingConfig> {
    if let Some(file) = matches.get_one::<PathBuf>("file") {
        config = config.with_hosts_file(file.clone());
    }

    if let Some(threads) = matches.get_one::<usize>("threads") {
        config = config.with_max_concurrency(*threads);
    }

    if let Some(method) = matches.get_one::<String>("method") {
        let method: ProbeMethod = method.parse().map_err(anyhow::Error::msg)?;
        config = config.with_method(method);
    }

    if matches.get_flag("ordered") {
        config = config.with_preserve_order(true);
    }

    config.validate()?;
    Ok(config)
}

/// Raw ICMP without privileges reports every host down, so say why up front
fn privilege_hint(config: &PingConfig) -> Option<String> {
    if config.method.requires_raw_socket() {
        Some(format!(
            "{} probes need raw socket privileges (root or CAP_NET_RAW); without them every host is reported down",
            config.method
        ))
    } else {
        None
    }
}

fn resolve_output(matches: &ArgMatches) -> anyhow::Result<OutputConfig> {
    let format = if matches.get_flag("csv") {
        OutputFormat::Csv
    } else if let Some(format) = matches.get_one::<String>("output") {
        format.parse::<OutputFormat>().map_err(anyhow::Error::msg)?
    } else {
        OutputFormat::Text
    };

    Ok(OutputConfig {
        format,
        colored: !matches.get_flag("no-color"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = build_cli();
    let matches = cli.clone().get_matches();

    Logger::init(Logger::level_for_verbosity(matches.get_count("verbose")));

    let config = resolve_config(&matches)?;
    let output_config = resolve_output(&matches)?;

    if let Some(hint) = privilege_hint(&config) {
        log::warn!("{}", hint);
    }

    let hosts = match hosts_from_file(&config.hosts_file, &config) {
        Ok(hosts) => hosts,
        Err(e) => {
            eprintln!("{} {:#}", "[!]".bright_red(), e);
            let _ = cli.print_help();
            process::exit(1);
        }
    };

    if matches.get_flag("display") {
        println!("{:?}", hosts);
    }

    let pool = ProbePool::from_config(&config)?;
    let cancel = pool.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut results = match pool.run(hosts).await {
        Ok(results) => results,
        Err(PoolError::Interrupted) => process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{} {}", "[!]".bright_red(), e);
            process::exit(1);
        }
    };

    if config.preserve_order {
        results.sort_by_input_order();
    }

    OutputManager::new(output_config).print_results(&results)?;
    Ok(())
}
