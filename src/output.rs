//! # Console Output
//!
//! User-facing progress lines for a deployment run. Color and symbol use
//! respect the usual terminal conventions:
//!
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Without color, symbols fall back to bracketed ASCII tags so logs stay
//! greppable.

use std::env;

use console::style;

use crate::config::PipelineVariant;
use crate::pipeline::DeployOutcome;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Detect color support from the environment and terminal.
    pub fn from_env() -> Self {
        Self {
            use_color: Self::detect_color_support(),
        }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Prints pipeline progress to stdout and diagnostics to stderr.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: OutputConfig,
    quiet: bool,
}

impl Reporter {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            quiet: false,
        }
    }

    /// A reporter that prints nothing.
    pub fn silent() -> Self {
        Self {
            config: OutputConfig { use_color: false },
            quiet: true,
        }
    }

    fn line(&self, text: String) {
        if !self.quiet {
            println!("{}", text);
        }
    }

    pub fn banner(&self, variant: PipelineVariant) {
        let title = format!("PAGES DEPLOY ({})", variant);
        let rule = "=".repeat(50);
        if self.config.use_color {
            self.line(format!("\n{}", style(&rule).cyan().bold()));
            self.line(format!("{}", style(format!("{:^50}", title)).cyan().bold()));
            self.line(format!("{}\n", style(&rule).cyan().bold()));
        } else {
            self.line(format!("\n{}\n{:^50}\n{}\n", rule, title, rule));
        }
    }

    pub fn header(&self, title: &str) {
        let text = format!("--- {} ---", title);
        if self.config.use_color {
            self.line(format!("\n{}", style(text).cyan().bold()));
        } else {
            self.line(format!("\n{}", text));
        }
    }

    pub fn success(&self, message: &str) {
        let symbol = emoji(&self.config, "✓", "[OK]");
        self.line(format!("{} {}", self.paint(symbol, Tone::Good), message));
    }

    pub fn info(&self, message: &str) {
        let symbol = emoji(&self.config, "ℹ", "[INFO]");
        self.line(format!("{} {}", self.paint(symbol, Tone::Info), message));
    }

    pub fn warning(&self, message: &str) {
        let symbol = emoji(&self.config, "⚠", "[WARN]");
        self.line(format!("{} {}", self.paint(symbol, Tone::Warn), message));
    }

    /// Errors go to stderr so they survive stdout redirection.
    pub fn error(&self, message: &str) {
        if self.quiet {
            return;
        }
        let symbol = emoji(&self.config, "✗", "[ERR]");
        eprintln!("{} {}", self.paint(symbol, Tone::Bad), message);
    }

    /// Closing block: the public URL on success, the failed stage otherwise.
    pub fn summary(&self, outcome: &DeployOutcome) {
        if outcome.succeeded {
            self.header("DONE");
            self.success(&outcome.message);
            if let Some(url) = &outcome.public_url {
                self.line(format!("\n  {} {}", emoji(&self.config, "🌐", "URL:"), url));
                self.line(format!(
                    "  {} Allow 1-2 minutes for the pages service to update",
                    emoji(&self.config, "⏱", "NOTE:")
                ));
            }
            if !outcome.warnings.is_empty() {
                self.line(String::new());
                self.info(&format!("Completed with {} warning(s):", outcome.warnings.len()));
                for warning in &outcome.warnings {
                    self.warning(warning);
                }
            }
        } else {
            self.error(&format!("Deployment stopped at {}: {}", outcome.stage, outcome.message));
        }
    }

    fn paint(&self, symbol: &str, tone: Tone) -> String {
        if !self.config.use_color {
            return symbol.to_string();
        }
        let styled = style(symbol);
        match tone {
            Tone::Good => styled.green(),
            Tone::Info => styled.blue(),
            Tone::Warn => styled.yellow(),
            Tone::Bad => styled.red(),
        }
        .to_string()
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Info,
    Warn,
    Bad,
}
