use checkin_scorer::scoring::{
    apply_filters, Analyzer, EmotionCapability, FilterResult, MLHandle, NeutralSentiment,
};
use checkin_scorer::utils::{
    log_dimmed, log_generic_error, log_ml_disabled, log_ml_step, log_newline, CheckInAssessment,
};
use std::env;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const MODEL_WAIT: Duration = Duration::from_secs(600);
const MODEL_POLL: Duration = Duration::from_millis(250);

fn print_usage() {
    eprintln!("Usage: score-checkin <text> [--no-ml]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <text>     Check-in text to score");
    eprintln!("  --no-ml    Skip the emotion and sentiment models (neutral fallback)");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let no_ml = args.iter().any(|a| a == "--no-ml");

    let text_args: Vec<&str> = args
        .iter()
        .skip(1)
        .filter(|a| *a != "--no-ml")
        .map(|a| a.as_str())
        .collect();

    if text_args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let text = text_args.join(" ");
    let mut assessment = CheckInAssessment::new(&text);

    let filter_result = apply_filters(&text);
    assessment.set_filter_result(filter_result.clone());
    if let FilterResult::Reject(_) = filter_result {
        assessment.print();
        process::exit(2);
    }

    let analyzer = if no_ml {
        log_ml_disabled();
        Analyzer::offline()
    } else {
        match load_models() {
            Some(handle) => Analyzer::new(
                EmotionCapability::Available(Arc::new(handle.clone())),
                Arc::new(handle),
            ),
            None => Analyzer::new(EmotionCapability::Unavailable, Arc::new(NeutralSentiment)),
        }
    };
    log_newline();

    match analyzer.analyze(&text) {
        Ok(analysis) => {
            assessment.set_analysis(analysis);
            assessment.print();
        }
        Err(e) => {
            log_generic_error("[ERROR]", &e.to_string());
            process::exit(1);
        }
    }
}

fn load_models() -> Option<MLHandle> {
    log_ml_step("Loading models...");
    log_dimmed("\u{2514}\u{2500}\u{2500} This may take a while on first run");

    let handle = match MLHandle::spawn() {
        Ok(handle) => handle,
        Err(e) => {
            log_generic_error("[ERROR]", &format!("Failed to start model worker: {e}"));
            return None;
        }
    };

    let start = Instant::now();
    while !handle.is_ready() {
        if handle.has_failed() {
            log_generic_error("[ERROR]", "Models failed to load, scoring without them");
            return None;
        }
        if start.elapsed() > MODEL_WAIT {
            log_generic_error("[ERROR]", "Models did not load in time, scoring without them");
            return None;
        }
        thread::sleep(MODEL_POLL);
    }
    Some(handle)
}
