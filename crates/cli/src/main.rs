use std::env;
use std::fs::File;
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hist_cli::cli_args::Args;
use hist_cli::history_selection::{
    confirm_command_should_run, print_executing_command, prompt_for_history_choice, RunChoice,
    SelectionChoice, SelectionOptions, Theme,
};
use hist_cli::signals::TerminationFlags;
use hist_core::config;
use hist_core::error::{Error, Result};
use hist_core::execution::{ExitOutcome, Executor, ShellExecutor};
use hist_core::frecency::{unix_now, FrecencyStore};
use hist_core::history::{Candidates, HistoryStore};
use hist_core::matcher::build_matcher;
use hist_core::ranking::Ranker;
use log::{debug, error, info};

/// Reads the history files and folds in the usage recorded by `hist`.
fn load_candidates(history_paths: &[PathBuf], frecency: &FrecencyStore) -> Candidates {
    let mut store = HistoryStore::load(history_paths);
    store.apply_frecency(frecency);
    store.candidates()
}

/// Logs go to `--log-file` when given, since anything written to stderr
/// would land inside the drawn region.
fn init_logging(args: &Args) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    if let Some(log_file) = &args.log_file {
        let path = shellexpand::tilde(log_file).to_string();
        let file = File::create(&path)
            .map_err(|e| Error::io_error("log".to_string(), path.clone(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Runs `command` unless this is a dry run or the user declines.
///
/// Returns `None` when nothing was run.
fn run_command(
    args: &Args,
    executor: &mut impl Executor,
    command: &str,
) -> Result<Option<ExitOutcome>> {
    if args.dry_run {
        println!("{command}");
        return Ok(None);
    }

    if args.confirm
        && confirm_command_should_run(command, &mut stdin().lock(), &mut stdout())? == RunChoice::No
    {
        info!("Declined to run `{command}`");
        return Ok(None);
    }

    print_executing_command(command, &mut stdout())?;
    executor.execute(command).map(Some)
}

fn exit_code_for(outcome: &ExitOutcome) -> ExitCode {
    match outcome.code {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from),
        None => ExitCode::FAILURE,
    }
}

fn execute(args: &Args) -> Result<ExitCode> {
    let frecency_path = config::get_frecency_path(&args.frecency_path);
    debug!("Frecency path: `{frecency_path}`");
    let mut frecency = FrecencyStore::load(&frecency_path)?;

    let histfile = env::var("HISTFILE").ok();
    let history_paths = config::get_history_paths(&args.history_files, histfile.as_deref());
    debug!("History files: {history_paths:?}");

    let options = SelectionOptions {
        viewport_height: args.height,
        background_rank: args.background_rank,
        theme: Theme::with_highlight(args.highlight_color.as_deref())?,
    };

    let matcher = build_matcher(args.matcher, args.case_sensitive);
    let mut ranker = Ranker::new(matcher, load_candidates(&history_paths, &frecency));
    let signals = TerminationFlags::register()?;
    let mut executor = ShellExecutor::new(config::get_shell(&args.shell));
    let mut exit_code = ExitCode::SUCCESS;

    loop {
        let choice = {
            let frecency = &frecency;
            let mut reload = || load_candidates(&history_paths, frecency);
            prompt_for_history_choice(&mut ranker, &options, &signals, &mut reload)?
        };

        // The terminal has been handed back by now
        let SelectionChoice::Run(command) = choice else {
            break;
        };

        match run_command(args, &mut executor, &command) {
            Ok(Some(outcome)) => {
                frecency.record(&command, unix_now());
                if !outcome.success() {
                    match outcome.code {
                        Some(code) => eprintln!("`{command}` exited with status {code}"),
                        None => eprintln!("`{command}` was terminated by a signal"),
                    }
                }
                exit_code = exit_code_for(&outcome);
            }
            Ok(None) => {}
            Err(e @ Error::SubProcess { .. }) => {
                error!("{e}");
                eprintln!("{e}");
                exit_code = ExitCode::FAILURE;
            }
            Err(e) => return Err(e),
        }
        signals.clear_interrupt();

        if !args.keep_open || signals.terminated() {
            break;
        }
        ranker = ranker.with_candidates(load_candidates(&history_paths, &frecency));
    }

    if args.skip_frecency_save {
        info!("Skipping frecency save was specified. Not writing usage.");
    } else {
        frecency.save(&frecency_path)?;
    }

    Ok(exit_code)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match execute(&args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
