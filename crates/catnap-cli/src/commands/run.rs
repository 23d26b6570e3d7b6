//! The interactive timer loop.
//!
//! Everything runs on one current-thread runtime: stdin commands and the
//! periodic poll are multiplexed with `select!`, so session transitions
//! always run to completion before the next one starts.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use catnap_core::{CoreError, DisplayCoordinator, Event, RawConfig, Session, Settings};

#[derive(Args)]
pub struct RunArgs {
    /// Work duration in seconds
    #[arg(long)]
    work: Option<u64>,
    /// Short break duration in seconds
    #[arg(long)]
    short_break: Option<u64>,
    /// Long break duration in seconds
    #[arg(long)]
    long_break: Option<u64>,
    /// Work cycles between long breaks
    #[arg(long)]
    cycles: Option<u32>,
    /// Image shown during breaks
    #[arg(long)]
    cat_image: Option<PathBuf>,
    /// Print events as JSON lines instead of messages
    #[arg(long)]
    json: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = RawConfig::load_or_default().resolve();
    apply_overrides(&mut settings, &args);
    let session = Session::new(settings, DisplayCoordinator::new());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(event_loop(session, args.json))
}

fn apply_overrides(settings: &mut Settings, args: &RunArgs) {
    if let Some(secs) = args.work {
        settings.work_secs = positive(secs, "work", settings.work_secs);
    }
    if let Some(secs) = args.short_break {
        settings.short_break_secs = positive(secs, "short-break", settings.short_break_secs);
    }
    if let Some(secs) = args.long_break {
        settings.long_break_secs = positive(secs, "long-break", settings.long_break_secs);
    }
    if let Some(cycles) = args.cycles {
        settings.cycles_before_long_break =
            positive(u64::from(cycles), "cycles", u64::from(settings.cycles_before_long_break))
                as u32;
    }
    if let Some(path) = &args.cat_image {
        settings.cat_image_path = Some(path.clone());
    }
}

fn positive(value: u64, name: &str, fallback: u64) -> u64 {
    if value > 0 {
        value
    } else {
        log::warn!("--{name} must be positive, keeping {fallback}");
        fallback
    }
}

async fn event_loop(mut session: Session, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !json {
        println!("catnap interactive timer. Type 'help' for commands.");
    }
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(250));
    poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                for event in session.poll() {
                    emit(&event, json);
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !dispatch(&mut session, line.trim(), json) {
                            break;
                        }
                    }
                    // stdin closed.
                    None => break,
                }
            }
        }
    }
    emit(&session.stop(), json);
    Ok(())
}

/// Handle one input line. Returns false when the loop should exit.
fn dispatch(session: &mut Session, input: &str, json: bool) -> bool {
    let mut parts = input.split_whitespace();
    match parts.next() {
        None => {}
        Some("start") => emit(&session.start(), json),
        Some("stop") => emit(&session.stop(), json),
        Some("break") => report(session.request_break(), json),
        Some("delay") => {
            // A non-numeric amount becomes NaN so the resolver can clamp
            // and report it.
            let secs = parts.next().map(|raw| raw.parse::<f64>().unwrap_or(f64::NAN));
            report(session.delay_break(secs), json);
        }
        Some("stopbreak" | "stop-break") => report(session.stop_break(), json),
        Some("status") => {
            let status = session.status();
            if json {
                match serde_json::to_string(&status) {
                    Ok(line) => println!("{line}"),
                    Err(e) => log::warn!("cannot encode status: {e}"),
                }
            } else {
                println!("{status}");
            }
        }
        Some("help") => print_help(),
        Some("quit" | "exit" | "q") => return false,
        Some(other) => println!("Unknown command '{other}', try 'help'."),
    }
    true
}

fn report(result: Result<Event, CoreError>, json: bool) {
    match result {
        Ok(event) => emit(&event, json),
        Err(e) => println!("{e}"),
    }
}

fn emit(event: &Event, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => log::warn!("cannot encode event: {e}"),
        }
    } else {
        println!("{}", render(event));
    }
}

fn render(event: &Event) -> String {
    match event {
        Event::WorkStarted { cycle, .. } => format!("Pomodoro work #{cycle} started!"),
        Event::BreakStarted {
            break_type,
            duration_secs,
            ..
        } => format!(
            "Time for a {} break! ({} min)",
            break_type.label(),
            duration_secs / 60
        ),
        Event::BreakDelayed { delay_secs, .. } => format!("Break delayed {delay_secs}s."),
        Event::Stopped { .. } => "Pomodoro stopped.".to_string(),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start            reset and begin work cycle #1");
    println!("  stop             stop timers and clear the notification");
    println!("  break            begin a short or long break now");
    println!("  delay [secs]     postpone the current break");
    println!("  stopbreak        end the current break, back to work");
    println!("  status           one-line session status");
    println!("  quit             stop and exit");
}
