use crate::output::is_quiet;
use crate::ui::Icons;
use owo_colors::{OwoColorize, Style};
use std::sync::OnceLock;

static COLORED: OnceLock<bool> = OnceLock::new();

/// Terminal styling roles; all plain when stdout is not a terminal
#[derive(Debug, Clone, Copy)]
enum Tone {
    Header,
    Success,
    Error,
    Warn,
    Info,
    Dim,
}

impl Tone {
    fn style(self) -> Style {
        if !*COLORED.get_or_init(|| console::Term::stdout().is_term()) {
            return Style::new();
        }
        match self {
            Tone::Header => Style::new().cyan().bold(),
            Tone::Success => Style::new().green().bold(),
            Tone::Error => Style::new().red().bold(),
            Tone::Warn => Style::new().yellow().bold(),
            Tone::Info => Style::new().magenta(),
            Tone::Dim => Style::new().white().dimmed(),
        }
    }
}

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(Tone::Header.style()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(Tone::Success.style()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(Tone::Error.style()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(Tone::Warn.style()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(Tone::Info.style()),
        label.style(Tone::Dim.style()),
        value
    );
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", title.style(Tone::Header.style()));
}

pub fn dim(text: &str) -> String {
    text.style(Tone::Dim.style()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_keeps_text() {
        assert!(dim("No URLs yet").contains("No URLs yet"));
        assert!(dim("").is_empty() || dim("").contains('\u{1b}'));
    }
}
