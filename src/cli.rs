use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::internal::config::{
    ConfigLoader, ConfigSource, LoggingSettings, SourceScope, ENV_PREFIX, VERSION,
};
use crate::internal::logger::{initialize_with, FacadeOptions, Level};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Emit {
        level: Level,
        name: Option<String>,
        message: String,
    },
    ShowConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub extra_configs: Vec<PathBuf>,
    pub command: CliCommand,
}

pub fn build_cli() -> Command {
    Command::new("sitelog")
        .version(VERSION)
        .about("Emit records through the sitelog facade and inspect its configuration")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .action(ArgAction::Append)
                .help("Extra config file, applied after the system and user files (repeatable)")
        )
        .subcommand(
            Command::new("emit")
                .about("Initialize the facade and emit one record")
                .arg(
                    Arg::new("level")
                        .long("level")
                        .short('l')
                        .value_parser(["debug", "info", "warning", "error"])
                        .default_value("info")
                        .help("Record level")
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .help("Identity to attribute the record to")
                )
                .arg(
                    Arg::new("message")
                        .required(true)
                        .num_args(1..)
                        .help("Message text; several words are joined by spaces")
                )
        )
        .subcommand(
            Command::new("show-config")
                .about("Print the merged configuration and the logging settings it yields")
        )
}

pub fn parse_options(matches: &ArgMatches) -> anyhow::Result<CliOptions> {
    let (name, sub) = matches
        .subcommand()
        .context("a subcommand is required")?;

    // `--config` is global and may appear on either side of the subcommand.
    let mut extra_configs: Vec<PathBuf> = Vec::new();
    for level in [matches, sub] {
        for value in level.get_many::<String>("config").into_iter().flatten() {
            let path = PathBuf::from(value);
            if !extra_configs.contains(&path) {
                extra_configs.push(path);
            }
        }
    }

    let command = match name {
        "emit" => {
            let level_name = sub
                .get_one::<String>("level")
                .map(String::as_str)
                .unwrap_or("info");
            let level: Level = level_name.parse()?;
            let message = sub
                .get_many::<String>("message")
                .context("message is required")?
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");

            CliCommand::Emit {
                level,
                name: sub.get_one::<String>("name").cloned(),
                message,
            }
        }
        "show-config" => CliCommand::ShowConfig,
        other => anyhow::bail!("unknown subcommand: {}", other),
    };

    Ok(CliOptions {
        extra_configs,
        command,
    })
}

/// Default sources followed by the `--config` files.
pub fn config_sources(options: &CliOptions) -> Vec<ConfigSource> {
    let mut sources = ConfigLoader::default_sources();
    sources.extend(
        options
            .extra_configs
            .iter()
            .map(|path| ConfigSource::new(SourceScope::Extra, path.clone())),
    );
    sources
}

pub fn run(options: CliOptions) -> anyhow::Result<()> {
    let sources = config_sources(&options);

    match options.command {
        CliCommand::Emit {
            level,
            name,
            message,
        } => {
            let facade = initialize_with(FacadeOptions::default().with_sources(sources));
            match name {
                Some(name) => facade.named(name).log(level, format_args!("{}", message)),
                None => facade.emit(
                    level,
                    crate::Origin::Site(&crate::callsite!()),
                    format_args!("{}", message),
                ),
            }

            if facade.write_failures() > 0 {
                anyhow::bail!("failed to write the record to the configured output");
            }
        }
        CliCommand::ShowConfig => {
            let effective = ConfigLoader::new(sources).load();
            let (settings, key_errors) = LoggingSettings::extract(&effective, Some(ENV_PREFIX))
                .context("failed to extract logging settings")?;

            println!(
                "{}",
                serde_json::to_string_pretty(effective.values())
                    .context("failed to render merged configuration")?
            );
            println!("log_level: {}", settings.log_level);
            println!("log_output: {:?}", settings.log_output);
            for issue in effective.issues() {
                eprintln!("warning: {}", issue);
            }
            for key_error in &key_errors {
                eprintln!("warning: {}", key_error);
            }
        }
    }

    Ok(())
}
