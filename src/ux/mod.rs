use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::time::Duration;

use crate::enhance::{ActionReport, PromptWorkspace};
use crate::export::SavedPaths;
use crate::feedback::FeedbackEntry;
use crate::prompt::{usage_instructions, GeneratedPrompt};
use crate::wire::BusinessSuggestions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

/// A toast: short title plus one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: Level::Success, title: title.into(), description: description.into() }
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: Level::Info, title: title.into(), description: description.into() }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level: Level::Error, title: title.into(), description: description.into() }
    }
}

pub fn notify(n: &Notification) {
    let title = match n.level {
        Level::Success => n.title.green().bold(),
        Level::Info => n.title.cyan().bold(),
        Level::Error => n.title.red().bold(),
    };
    println!("\n{}  {}", title, n.description);
}

/// Show an action's notification, plus a re-run hint for failures that a
/// second attempt may fix.
pub fn report<T>(r: &ActionReport<T>) {
    notify(&r.notification);
    if let Some(hint) = r.outcome.as_ref().err().and_then(|e| e.retry_hint()) {
        println!("{}", hint.dimmed());
    }
}

/// Busy indicator shown while a request is outstanding.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn step_header(title: &str, step: usize, total: usize, percent: u32) {
    println!(
        "\n{}  {}",
        format!("Step {step} of {total}").bold(),
        format!("{percent}% Complete").dimmed()
    );
    println!("{}", title.bold());
}

/// Read one line. `None` on end of input.
pub fn ask(label: &str, placeholder: &str) -> Option<String> {
    if !placeholder.is_empty() {
        println!("{}", placeholder.dimmed());
    }
    print!("{label} ");
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().lock().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}

/// Numbered checkbox list; the user answers with comma-separated numbers.
pub fn choose_many(options: &[&str], selected: &dyn Fn(&str) -> bool) -> Option<Vec<String>> {
    for (i, o) in options.iter().enumerate() {
        let mark = if selected(o) { "[x]".green() } else { "[ ]".normal() };
        println!("{:>3}. {} {}", i + 1, mark, o);
    }
    let line = ask(">", "Enter numbers separated by commas (blank keeps the current selection)")?;
    if line.is_empty() {
        return Some(options.iter().filter(|o| selected(o)).map(|o| o.to_string()).collect());
    }
    Some(
        line.split(',')
            .filter_map(|t| t.trim().parse::<usize>().ok())
            .filter_map(|n| options.get(n.wrapping_sub(1)))
            .map(|o| o.to_string())
            .collect(),
    )
}

/// Numbered radio list. Returns the chosen index.
pub fn choose_one(options: &[&str], current: Option<usize>) -> Option<Option<usize>> {
    for (i, o) in options.iter().enumerate() {
        let mark = if current == Some(i) { "(o)".green() } else { "( )".normal() };
        println!("{:>3}. {} {}", i + 1, mark, o);
    }
    let line = ask(">", "")?;
    Some(
        line.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=options.len()).contains(n))
            .map(|n| n - 1)
            .or(current),
    )
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

pub fn show_prompt(prompt: &GeneratedPrompt) {
    println!("\n{}", "=== YOUR AI PROMPT ===".bold());
    println!("{}\n", prompt.body);
    let (purpose, outcome) = usage_instructions(prompt);
    println!("{} {}", "How to use:".blue().bold(), purpose);
    println!("{} {}", "Expected outcome:".blue().bold(), outcome);
}

pub fn show_workspace(ws: &PromptWorkspace) {
    if let Some(e) = ws.enhanced() {
        println!("\n{} ({})", "=== AI-ENHANCED PROMPT ===".magenta().bold(), e.kind.label());
        println!("{}\n", e.body);
        if !ws.is_showing_enhanced() {
            println!("{}", "The original prompt is still the active one.".dimmed());
        } else {
            println!("{}", "The enhanced prompt replaced the original, which is kept for export.".dimmed());
        }
    }
}

pub fn show_suggestions(s: &BusinessSuggestions) {
    println!("\n{}", "AI Suggestions for Your Website".green().bold());
    if !s.explanation.is_empty() {
        println!("{}", s.explanation.dimmed());
    }
    println!("{} {}", "Suggested Pages:".bold(), s.suggested_pages.join(", "));
    println!("{} {}", "Suggested Features:".bold(), s.suggested_features.join(", "));
    println!("{} {}", "Suggested Design Style:".bold(), s.suggested_design_style);
}

pub fn show_usage(remaining: u32, limit: u32) {
    let bar = format!("{}{}", "#".repeat(remaining as usize), ".".repeat(limit.saturating_sub(remaining) as usize));
    println!("{} {remaining}/{limit} AI requests left today  [{}]", "Usage:".bold(), bar);
}

pub fn show_feedback(entries: &[FeedbackEntry]) {
    if entries.is_empty() {
        println!("(no feedback yet)");
        return;
    }
    for e in entries {
        let tag = format!("[{}]", e.kind.as_str().to_uppercase());
        let tag = match e.kind.as_str() {
            "review" => tag.green().bold(),
            "issue" => tag.red().bold(),
            "suggestion" => tag.yellow().bold(),
            _ => tag.normal(),
        };
        println!(
            "{} {} <{}>  {}",
            tag,
            e.name.bold(),
            e.email,
            e.created_at.format("%b %e, %Y %H:%M").to_string().dimmed()
        );
        println!("{}\n", indent(&e.message, 2));
    }
}

pub fn show_saved(saved: &SavedPaths) {
    if let Some(o) = &saved.original {
        println!("Original kept at {}", o.display());
    }
    if let Some(e) = &saved.enhanced {
        println!("Enhanced version kept at {}", e.display());
    }
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
