// src/cli.rs
use std::env;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    config::Config,
    core::time::msk,
    error::{Error, Result},
    progress::Progress,
    runner,
    store::FileStore,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Fetch,
    ReportFull,
    ReportDelta,
    Help,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Help, Command::Fetch, Command::ReportFull, Command::ReportDelta];

    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Fetch => "schedule:fetch",
            Command::ReportFull => "schedule:report:full",
            Command::ReportDelta => "schedule:report:delta",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Help => "prints this list",
            Command::Fetch => "fetches the calendar, updates the store and announces changes",
            Command::ReportFull => "sends every joinable upcoming game",
            Command::ReportDelta => "sends joinable upcoming games not announced yet",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub command: Command,
    /// Log messages instead of sending them.
    pub dry_run: bool,
}

pub fn parse_args<I>(args: I) -> Result<Params>
where
    I: IntoIterator<Item = String>,
{
    let mut params = Params { command: Command::Help, dry_run: false };
    let mut command: Option<Command> = None;
    for a in args {
        match a.as_str() {
            "--dry-run" => params.dry_run = true,
            "-h" | "--help" => command = Some(Command::Help),
            other if command.is_none() => {
                command = Some(
                    Command::ALL
                        .into_iter()
                        .find(|c| c.name() == other)
                        .ok_or_else(|| Error::Config(format!("command '{other}' not found")))?,
                );
            }
            other => return Err(Error::Config(format!("unexpected argument: {other}"))),
        }
    }
    params.command = command.unwrap_or(Command::Help);
    Ok(params)
}

pub fn usage() -> String {
    let mut out = s!("Usage: rolecon_scrape [--dry-run] <command>\n");
    for c in Command::ALL {
        out.push_str(&format!("\t{} - {}\n", c.name(), c.description()));
    }
    out
}

/// Progress lines go to the log.
#[derive(Default)]
struct LogProgress {
    total: usize,
    done: usize,
    failed: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        info!(total, "fetching session pages");
    }
    fn log(&mut self, msg: &str) {
        info!("{msg}");
    }
    fn item_done(&mut self, _url: &str) {
        self.done += 1;
    }
    fn item_failed(&mut self, url: &str) {
        self.failed += 1;
        warn!(url, "page failed");
    }
    fn finish(&mut self) {
        info!(done = self.done, failed = self.failed, total = self.total, "fetch finished");
    }
}

pub fn run() -> Result<()> {
    run_with(env::args().skip(1))
}

pub fn run_with<I>(args: I) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let params = parse_args(args)?;
    if params.command == Command::Help {
        print!("{}", usage());
        return Ok(());
    }

    let cfg = Config::from_env()?;
    crate::log::init(cfg.debug);
    info!(command = params.command.name(), "command found");

    let now = Utc::now().with_timezone(&msk());
    let dispatcher = runner::dispatcher(&cfg, params.dry_run)?;
    let mut store = FileStore::open(&cfg.store_path)?;

    match params.command {
        Command::Fetch => {
            runner::fetch_and_reconcile(&cfg, &mut store, dispatcher, now, &mut LogProgress::default())?;
        }
        Command::ReportFull => {
            let destinations = runner::destinations(&cfg, dispatcher.as_ref())?;
            runner::report_full(&store, dispatcher.as_ref(), &destinations, cfg.digest_sort, now)?;
        }
        Command::ReportDelta => {
            let destinations = runner::destinations(&cfg, dispatcher.as_ref())?;
            runner::report_delta(&mut store, dispatcher.as_ref(), &destinations, cfg.digest_sort, now)?;
        }
        Command::Help => {}
    }

    info!("command finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands_and_flags() {
        assert_eq!(parse_args(args(&[])).unwrap().command, Command::Help);
        assert_eq!(parse_args(args(&["schedule:fetch"])).unwrap().command, Command::Fetch);
        let p = parse_args(args(&["--dry-run", "schedule:report:delta"])).unwrap();
        assert_eq!(p, Params { command: Command::ReportDelta, dry_run: true });
        assert_eq!(parse_args(args(&["schedule:report:full", "-h"])).unwrap().command, Command::Help);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(args(&["schedule:purge"])).is_err());
        assert!(parse_args(args(&["schedule:fetch", "extra"])).is_err());
    }

    #[test]
    fn usage_lists_every_command() {
        let u = usage();
        for c in Command::ALL {
            assert!(u.contains(c.name()));
        }
    }
}
