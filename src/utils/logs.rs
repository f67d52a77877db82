use console::{measure_text_width, Style};
use tracing::warn;

use crate::scoring::{CheckInAnalysis, Filter, FilterResult};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const ASSESSMENT_PREVIEW_CHARS: usize = 60;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

fn tree_connector(index: usize, count: usize) -> String {
    if index + 1 == count {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn ml_prefix() -> String {
    yellow().apply_to("[ML]").to_string()
}

fn db_prefix() -> String {
    cyan().apply_to("[DB]").to_string()
}

fn checkin_prefix() -> String {
    magenta().apply_to("[CHECKIN]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{:.2}", dim().apply_to(sign), value.abs())
}

pub fn log_startup_config(port: u16, database_url: &str, ml_enabled: bool, transcriber: Option<&str>) {
    println!(
        "{} starting checkin-scorer on {}...",
        init_prefix(),
        cyan().apply_to(format!("0.0.0.0:{port}")),
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("database", 1),
        dim().apply_to(database_url)
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("models", 1),
        if ml_enabled {
            green().apply_to("enabled")
        } else {
            yellow().apply_to("disabled")
        }
    );
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("transcription", 1),
        match transcriber {
            Some(endpoint) => green().apply_to(endpoint.to_string()),
            None => yellow().apply_to("not configured".to_string()),
        }
    );
}

pub fn log_settings_reloaded() {
    println!("{} settings reloaded", init_prefix());
}

pub fn log_settings_error(path: &str, error: &str) {
    warn!("ignoring malformed settings file {path}: {error}");
}

pub fn log_server_starting(port: u16) {
    println!(
        "{} listening on {}",
        init_prefix(),
        cyan().apply_to(format!("http://0.0.0.0:{port}"))
    );
}

pub fn log_db_status(message: &str) {
    println!("{} {}", db_prefix(), message);
}

pub fn log_db_ready(migrations_applied: usize) {
    println!(
        "{} ready ({} migrations applied)",
        db_prefix(),
        bold().apply_to(migrations_applied)
    );
}

pub fn log_db_error(error: &str) {
    println!("{} {}", db_prefix(), red().apply_to(error));
}

pub fn log_ml_step(message: &str) {
    println!("{} {}", ml_prefix(), message);
}

pub fn log_ml_model_loaded(name: &str, seconds: f32) {
    println!(
        "{} {} loaded in {}",
        ml_prefix(),
        bold().apply_to(name),
        dim().apply_to(format!("{seconds:.1}s"))
    );
}

pub fn log_ml_ready() {
    println!("{} models ready!", ml_prefix());
}

pub fn log_ml_disabled() {
    println!(
        "{} models {}, using neutral emotions and sentiment",
        ml_prefix(),
        yellow().apply_to("disabled")
    );
}

pub fn log_ml_error(error: &str) {
    println!("{} {}", ml_prefix(), red().apply_to(error));
}

/// Oracle failures never reach the caller, so this is their only trace.
pub fn log_oracle_fallback(oracle: &str, error: &anyhow::Error) {
    warn!(oracle, "oracle failed, using neutral fallback: {error:#}");
}

pub fn log_check_in_saved(owner: &str, id: i32, mood: u8, stress: u8) {
    println!(
        "{} {} #{} for {} (mood {}, stress {})",
        checkin_prefix(),
        green().apply_to("saved"),
        bold().apply_to(id),
        dim().apply_to(owner),
        bold().apply_to(mood),
        bold().apply_to(stress)
    );
}

pub fn log_check_in_rejected(owner: &str, filter: &Filter) {
    println!(
        "{} {} for {} ({})",
        checkin_prefix(),
        yellow().apply_to("rejected"),
        dim().apply_to(owner),
        filter
    );
}

pub fn log_check_in_error(owner: &str, error: &str) {
    println!(
        "{} {} for {}: {}",
        checkin_prefix(),
        red().apply_to("failed"),
        dim().apply_to(owner),
        error
    );
}

pub fn log_newline() {
    println!();
}

pub fn log_dimmed(message: &str) {
    println!("{}", dim().apply_to(message));
}

pub fn log_generic_error(prefix: &str, error: &str) {
    eprintln!("{} {}", red().bold().apply_to(prefix), error);
}

/// Tree-formatted report of one check-in, as printed by the CLI scorer.
#[derive(Debug, Clone, Default)]
pub struct CheckInAssessment {
    pub text_preview: String,
    pub char_count: usize,
    pub filter_result: Option<FilterResult>,
    pub analysis: Option<CheckInAnalysis>,
}

impl CheckInAssessment {
    pub fn new(text: &str) -> Self {
        let trimmed = text.trim();
        let preview = if trimmed.chars().count() > ASSESSMENT_PREVIEW_CHARS {
            format!(
                "{}...",
                trimmed
                    .chars()
                    .take(ASSESSMENT_PREVIEW_CHARS - 3)
                    .collect::<String>()
            )
        } else {
            trimmed.to_string()
        };
        Self {
            text_preview: preview.replace('\n', " "),
            char_count: trimmed.chars().count(),
            ..Default::default()
        }
    }

    pub fn set_filter_result(&mut self, result: FilterResult) {
        self.filter_result = Some(result);
    }

    pub fn set_analysis(&mut self, analysis: CheckInAnalysis) {
        self.analysis = Some(analysis);
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!(
            "{} \"{}\"",
            magenta().apply_to(bold().apply_to("[CHECK-IN ASSESSMENT]")),
            dim().apply_to(&self.text_preview)
        ));

        if let Some(ref filter_result) = self.filter_result {
            lines.push(String::new());
            lines.push(format!("{}", bold().apply_to("FILTERS")));

            let filter_str = match filter_result {
                FilterResult::Pass => format!("{}", green().apply_to("pass")),
                FilterResult::Reject(f) => format!("{} ({})", red().apply_to("reject"), f),
            };
            lines.push(format!("{}{} {}", tree_branch(), pad_label("status", 1), filter_str));
            lines.push(format!(
                "{}{} {}",
                tree_end(),
                pad_label("length", 1),
                dim().apply_to(format!("{} chars", self.char_count))
            ));

            if let FilterResult::Reject(f) = filter_result {
                lines.push(String::new());
                lines.push(format!("{}", bold().apply_to("RESULT")));
                lines.push(format!(
                    "{}{} {}",
                    tree_end(),
                    pad_label("message", 1),
                    yellow().apply_to(f.message())
                ));
            }
        }

        if let Some(ref analysis) = self.analysis {
            self.push_analysis(&mut lines, analysis);
        }

        lines
    }

    fn push_analysis(&self, lines: &mut Vec<String>, analysis: &CheckInAnalysis) {
        let mood_kw = &analysis.mood.keyword_matches;
        let stress_kw = &analysis.stress.keyword_matches;

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("KEYWORDS")));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("mood risk", 1),
            dim().apply_to(format!(
                "high {} / medium {} / low {}",
                mood_kw.high, mood_kw.medium, mood_kw.low
            ))
        ));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("stress", 1),
            dim().apply_to(format!(
                "high {} / medium {} / low {}",
                stress_kw.high, stress_kw.medium, stress_kw.low
            ))
        ));
        let positive_style = if mood_kw.positive > 0 { green() } else { dim() };
        lines.push(format!(
            "{}{} {}",
            tree_end(),
            pad_label("positive", 1),
            positive_style.apply_to(mood_kw.positive)
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("EMOTIONS")));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("source", 1),
            dim().apply_to(analysis.emotion_source)
        ));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("dominant", 1),
            cyan().apply_to(analysis.dominant_emotion)
        ));
        lines.push(format!("{}{}", tree_end(), pad_label("scores", 1)));
        let emotions: Vec<_> = analysis.emotions.iter().collect();
        for (i, (emotion, score)) in emotions.iter().enumerate() {
            lines.push(format!(
                "    {}{} {}",
                tree_connector(i, emotions.len()),
                pad_label(&emotion.to_string(), 2),
                dim().apply_to(format!("{score:.1}"))
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("FEELINGS")));
        let feelings: Vec<_> = analysis.secondary_feelings.iter().collect();
        for (i, (feeling, intensity)) in feelings.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                tree_connector(i, feelings.len()),
                pad_label(&feeling.to_string(), 1),
                dim().apply_to(format!("{intensity:.1}"))
            ));
        }

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("SCORES")));
        lines.push(format!(
            "{}{} {}",
            tree_branch(),
            pad_label("polarity", 1),
            format_signed(analysis.polarity)
        ));
        let mood_style = match analysis.mood.label_class {
            "great-mood" | "positive-mood" => green(),
            "neutral-mood" => yellow(),
            _ => red(),
        };
        lines.push(format!(
            "{}{} {} {}",
            tree_branch(),
            pad_label("mood", 1),
            bold().apply_to(analysis.mood.score),
            mood_style.apply_to(analysis.mood.level)
        ));
        lines.push(format!(
            "{}{}",
            tree_indent(),
            dim().apply_to(analysis.mood.explanation)
        ));
        let stress_style = match analysis.stress.label_class {
            "safe" => green(),
            "moderate-risk" => yellow(),
            _ => red(),
        };
        lines.push(format!(
            "{}{} {} {}",
            tree_end(),
            pad_label("stress", 1),
            bold().apply_to(analysis.stress.score),
            stress_style.apply_to(analysis.stress.level)
        ));
        lines.push(format!(
            "    {}",
            dim().apply_to(analysis.stress.explanation)
        ));

        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RECOMMENDATIONS")));
        let count = analysis.recommendations.len();
        for (i, recommendation) in analysis.recommendations.iter().enumerate() {
            lines.push(format!("{}{}", tree_connector(i, count), recommendation));
        }
    }

    pub fn print(&self) {
        println!("{}\n", self.lines().join("\n"));
    }
}
