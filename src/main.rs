use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use traywatch::commands;

fn value_command(name: &'static str, about: &'static str, value_help: &'static str) -> Command {
    Command::new(name).about(about).arg(
        Arg::new("value")
            .help(value_help)
            .required(true)
            .index(1),
    )
}

fn tray_target_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("printer")
                .help("Printer id, or a '<printer>::<tray>' key")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("tray")
                .help("Tray label or number (optional when the printer has one open tray)")
                .index(2),
        )
}

fn build_cli() -> Command {
    Command::new("traywatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Printer fleet supply and empty-tray monitor")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .value_name("URL")
                .help("Monitor page URL (overrides the configured one)")
                .global(true),
        )
        .arg(
            Arg::new("toner-threshold")
                .long("toner-threshold")
                .value_name("PERCENT")
                .help("Alert when a toner is at or below this level")
                .value_parser(clap::value_parser!(u32).range(1..=100))
                .global(true),
        )
        .arg(
            Arg::new("fuser-threshold")
                .long("fuser-threshold")
                .value_name("PERCENT")
                .help("Alert when the fuser is at or below this level")
                .value_parser(clap::value_parser!(u32).range(1..=100))
                .global(true),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .value_name("MINUTES")
                .help("Minutes between automatic scans")
                .value_parser(clap::value_parser!(u32).range(1..))
                .global(true),
        )
        .arg(
            Arg::new("state")
                .long("state")
                .value_name("PATH")
                .help("Tray state file (overrides the configured location)")
                .global(true),
        )
        .subcommand(
            Command::new("scan")
                .about("Fetch the monitor page once and reconcile tray state")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the scan report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Scan repeatedly at the configured interval until Ctrl+C"),
        )
        .subcommand(
            Command::new("trays")
                .about("List trays currently believed empty")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print open trays as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(tray_target_args(
            Command::new("resolve")
                .about("Manually mark an empty tray as filled")
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        ))
        .subcommand(tray_target_args(
            Command::new("note")
                .about("Print a ticket work note for an empty tray")
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .value_name("MODE")
                        .help("Note template")
                        .value_parser(["detected", "refilled"])
                        .default_value("detected"),
                ),
        ))
        .subcommand(
            Command::new("history")
                .about("Show recent empty/filled events")
                .arg(
                    Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .value_name("COUNT")
                        .help("Number of most recent events to show")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print events as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export the event history to CSV")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Output file (default: tray_history_<timestamp>.csv)"),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Set configuration values (use 'traywatch set --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(value_command("url", "Set the monitor page URL", "http(s) URL"))
                .subcommand(value_command(
                    "toner-threshold",
                    "Set the toner alert threshold",
                    "Percent, 1-100",
                ))
                .subcommand(value_command(
                    "fuser-threshold",
                    "Set the fuser alert threshold",
                    "Percent, 1-100",
                ))
                .subcommand(value_command(
                    "interval",
                    "Set minutes between automatic scans",
                    "Minutes, at least 1",
                ))
                .subcommand(value_command(
                    "max-events",
                    "Set how many history events are kept",
                    "Event count, at least 1",
                ))
                .subcommand(value_command(
                    "state-path",
                    "Set the tray state file location",
                    "File path",
                )),
        )
        .subcommand(
            Command::new("get")
                .about("Show configuration values (all when no key is given)")
                .subcommand(Command::new("url").about("Show the monitor page URL"))
                .subcommand(Command::new("toner-threshold").about("Show the toner alert threshold"))
                .subcommand(Command::new("fuser-threshold").about("Show the fuser alert threshold"))
                .subcommand(Command::new("interval").about("Show the scan interval"))
                .subcommand(Command::new("max-events").about("Show the history size"))
                .subcommand(Command::new("state-path").about("Show the tray state file location")),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn main() -> Result<()> {
    traywatch::init_logging();

    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("scan", sub_matches)) => commands::scan::execute(sub_matches)?,
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches)?,
        Some(("trays", sub_matches)) => commands::trays::handle_list(sub_matches)?,
        Some(("resolve", sub_matches)) => commands::trays::handle_resolve(sub_matches)?,
        Some(("note", sub_matches)) => commands::trays::handle_note(sub_matches)?,
        Some(("history", sub_matches)) => commands::history::handle_list(sub_matches)?,
        Some(("export", sub_matches)) => commands::history::handle_export(sub_matches)?,
        Some(("set", sub_matches)) => commands::config::handle_set(sub_matches)?,
        Some(("get", sub_matches)) => commands::config::handle_get(sub_matches)?,
        Some(("version", _)) => commands::version()?,
        _ => {
            println!("Use 'traywatch --help' for more information.");
        }
    }

    Ok(())
}
