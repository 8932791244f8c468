//! Interactive loopback call: reads `start`, `call`, `end`, `status`,
//! `help` and `quit` from stdin and echoes the call trace.

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use looprtc::{
    call::{CallController, CallError, CallStatus, LogRenderSink},
    cli::Command,
    config::{CallConfig, Config},
    log::{clock, log_sink::LogSink, logger::Logger},
};

const DEFAULT_CONFIG: &str = "looprtc.conf";
const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Lets the logger worker catch up before the trace is echoed.
const ECHO_GRACE: Duration = Duration::from_millis(20);

fn main() -> ExitCode {
    clock::process_start();
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("Error loading config: {e}. Using empty config.");
            Config::empty()
        }),
        None => Config::load(DEFAULT_CONFIG).unwrap_or_else(|_| Config::empty()),
    };

    let call_config = match CallConfig::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let backend = match call_config.capture.build_backend() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let logger = Logger::start(4096, 512, 1, &config);
    let sink: Arc<dyn LogSink> = Arc::new(logger.handle());
    let renderer = Arc::new(LogRenderSink::new(sink.clone()));
    let connect_timeout = call_config.connect_timeout;
    let mut ctl = CallController::new(call_config, backend, renderer, sink);

    println!("looprtc: log file {}", logger.file_path().display());
    println!("{}", Command::HELP);

    let stdin = io::stdin();
    prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            prompt();
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Start) => {
                let started = ctl.start_media();
                report(&ctl, started);
            }
            Ok(Command::Call) => {
                let placed = ctl.place_call();
                let ok = placed.is_ok();
                report(&ctl, placed);
                if ok {
                    wait_for_connection(&mut ctl, &logger, connect_timeout);
                }
            }
            Ok(Command::End) => {
                let ended = ctl.end_call();
                report(&ctl, ended);
            }
            Ok(Command::Status) => print_status(&ctl),
            Ok(Command::Help) => println!("{}", Command::HELP),
            Ok(Command::Quit) => break,
            Err(e) => println!("{e}"),
        }
        echo_trace(&logger);
        prompt();
    }

    if ctl.control_state().end {
        let _ = ctl.end_call();
    }
    echo_trace(&logger);
    ExitCode::SUCCESS
}

/// Polls until both sides connect or `timeout` passes.
fn wait_for_connection(ctl: &mut CallController, logger: &Logger, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while ctl.status() == CallStatus::Negotiating && Instant::now() < deadline {
        ctl.poll();
        drain_trace(logger);
        thread::sleep(POLL_INTERVAL);
    }
    if ctl.status() == CallStatus::Negotiating {
        println!(
            "Call did not connect within {} ms; use 'end' to hang up",
            timeout.as_millis()
        );
    }
}

fn report(ctl: &CallController, result: Result<(), CallError>) {
    match result {
        Ok(()) => println!("status: {}", ctl.status()),
        Err(CallError::InvalidCallState { op, .. }) => {
            println!("'{op}' is disabled: {}", ctl.control_state());
        }
        Err(e) => println!("error: {e}"),
    }
}

fn print_status(ctl: &CallController) {
    println!("status:   {}", ctl.status());
    println!("controls: {}", ctl.control_state());
    println!("live tracks: {}", ctl.live_track_count());
    if let Some(setup) = ctl.session().and_then(|s| s.setup_time()) {
        println!("setup time: {:.3} ms", setup.as_secs_f64() * 1000.0);
    }
}

fn echo_trace(logger: &Logger) {
    thread::sleep(ECHO_GRACE);
    drain_trace(logger);
}

fn drain_trace(logger: &Logger) {
    while let Some(line) = logger.try_recv_ui() {
        println!("  {line}");
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
