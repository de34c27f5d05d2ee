//! Supporting helpers: message prefixes, colorization and text layout.
//!
//! All coloring goes through [`Style`] so a single flag turns it off.

use owo_colors::OwoColorize;

pub fn error_prefix() -> String {
    "error:".red().bold().to_string()
}

pub fn note_prefix() -> String {
    "note:".cyan().bold().to_string()
}

/// Whether colors should be used when nothing else says otherwise.
pub fn default_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    pub color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn underline(&self, text: &str) -> String {
        if self.color {
            text.underline().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn blue(&self, text: &str) -> String {
        if self.color {
            text.blue().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    /// Summary label such as ` PASS `, white bold on a colored background.
    pub fn badge(&self, label: &str, background: Badge) -> String {
        let text = format!(" {} ", label);
        if !self.color {
            return text;
        }
        let bold = text.white().bold().to_string();
        match background {
            Badge::Skip => bold.on_truecolor(0x0C, 0xAA, 0xEE).to_string(),
            Badge::Pass => bold.on_green().to_string(),
            Badge::Fail => bold.on_red().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Badge {
    Skip,
    Pass,
    Fail,
}

/// Integer with `,` thousands separators.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Indent every line of `text` by `offset` spaces, optionally prefixing
/// right-aligned 1-based line numbers.
pub fn indent_lines(style: &Style, offset: usize, text: &str, line_numbers: bool) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let width = lines.len().to_string().len();
    let pad = " ".repeat(offset);
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let number = if line_numbers {
                format!("{} ", style.blue(&format!("{:>width$}", index + 1, width = width)))
            } else {
                String::new()
            };
            format!("{}{}{}", pad, number, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
