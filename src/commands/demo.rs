use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use uuid::Uuid;

use super::{load_config, EXECUTION_ERROR, SUCCESS};
use crate::cli::DemoArgs;
use crate::logic::config::DemoConfig;
use crate::logic::features::StreamingExtractor;
use crate::logic::setup;
use crate::logic::stream::{
    Consumer, ControlChannel, ControlState, Debouncer, DemoRunner, InputSource, Journal, NullInput,
    RenderStyle, Renderer, ReplayOptions, ReplaySource, RunOutcome, RunSummary, TerminalInput,
};

/// Where this run's journal went, for the closing summary
struct JournalTarget {
    dir: PathBuf,
    run_id: Uuid,
}

pub fn execute(args: DemoArgs) -> i32 {
    match run(args) {
        Ok((summary, journal)) => {
            print_summary(&summary);
            if let Some(target) = journal {
                print_journal(&target);
            }
            if summary.outcome == RunOutcome::Interrupted {
                println!("Interrupted, stopped cleanly.");
            }
            SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXECUTION_ERROR
        }
    }
}

fn apply_flags(config: &mut DemoConfig, args: &DemoArgs) {
    if let Some(pace) = args.pace_ms {
        config.pace_ms = pace;
    }
    if let Some(poll) = args.poll_ms {
        config.poll_ms = poll;
    }
    if let Some(capacity) = args.queue_capacity {
        config.queue_capacity = capacity;
    }
    if let Some(p) = args.attack_drop {
        config.attack_drop_probability = p;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_shuffle {
        config.shuffle = false;
    }
    if let Some(mode) = args.mode {
        config.display_mode = mode.into();
    }
    if args.no_color {
        config.color = false;
    }
    if args.journal || args.journal_dir.is_some() {
        config.journal.enabled = true;
    }
    if let Some(dir) = &args.journal_dir {
        config.journal.dir = Some(dir.clone());
    }
}

fn run(args: DemoArgs) -> anyhow::Result<(RunSummary, Option<JournalTarget>)> {
    let mut config = load_config(&args.source)?;
    apply_flags(&mut config, &args);

    // Precondition: keyboard control needs a terminal. Checked before
    // anything is loaded so the failure is immediate.
    let input: Box<dyn InputSource> = if args.no_input {
        Box::new(NullInput)
    } else {
        Box::new(TerminalInput::acquire()?)
    };

    let prepared = setup::prepare(&config).context("startup check failed")?;

    let control = Arc::new(ControlState::new(config.poll_interval(), config.display_mode));
    if args.start_paused {
        control.set_paused(true);
        log::info!("Starting paused, press space to begin");
    }
    if args.no_input {
        let handler = Arc::clone(&control);
        ctrlc::set_handler(move || handler.request_interrupt())
            .context("cannot install Ctrl+C handler")?;
    }

    let style = RenderStyle {
        color: config.color,
        newline: if args.no_input { "\n" } else { "\r\n" },
    };
    let mut consumer = Consumer::new(
        StreamingExtractor::new(prepared.artifacts),
        prepared.classifiers,
        Renderer::new(io::stdout(), style),
    );
    let mut journal_target = None;
    if config.journal.enabled {
        let dir = config.journal_dir();
        let journal = Journal::open(&dir)
            .with_context(|| format!("cannot open journal in {}", dir.display()))?
            .with_max_size(config.journal_max_bytes());
        journal_target = Some(JournalTarget { dir, run_id: journal.run_id() });
        consumer = consumer.with_journal(journal);
    }

    let replay = ReplaySource::new(
        prepared.records,
        ReplayOptions {
            pace: config.pace(),
            shuffle: config.shuffle,
            seed: config.seed,
            attack_drop_probability: config.attack_drop_probability,
        },
    );

    log::info!(
        "Starting replay (pace {} ms, mode {}, queue {})",
        config.pace_ms, config.display_mode, config.queue_capacity
    );
    let runner = DemoRunner::new(
        control,
        replay,
        ControlChannel::new(
            input,
            Debouncer::new(config.debounce()).with_repeat_delay(config.repeat_delay()),
        ),
        consumer,
        config.queue_capacity,
    );

    let summary = runner.run()?;
    log::info!("Run finished: {:?} in {:.1?}", summary.outcome, summary.elapsed);
    Ok((summary, journal_target))
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "Processed {} records ({} shown, {} attack rows dropped, {} hidden by mode) in {:.1?}",
        summary.consumer.processed,
        summary.consumer.rendered,
        summary.replay.dropped_attack,
        summary.replay.hidden_by_mode,
        summary.elapsed
    );
    for predictor in &summary.consumer.predictors {
        match predictor.accuracy.accuracy() {
            Some(acc) => println!(
                "  {:<10} accuracy {:.2}% ({} of {} misclassified)",
                predictor.name,
                acc * 100.0,
                predictor.accuracy.misclassified_count,
                predictor.accuracy.total_count
            ),
            None => println!("  {:<10} no ground truth", predictor.name),
        }
    }
}

fn print_journal(target: &JournalTarget) {
    match Journal::run_files(&target.dir, target.run_id) {
        Ok(files) => {
            println!("Journal run {}:", target.run_id);
            for file in files {
                println!("  {}", file.display());
            }
        }
        Err(e) => log::warn!("Cannot list journal files in {}: {}", target.dir.display(), e),
    }
}
