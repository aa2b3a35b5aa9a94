//! Terminal styling shared by prompts and progress output.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with Prism's colors. Everything renders to stderr.
pub fn prism_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Hint shown after a missing or rejected API key.
pub fn print_key_hint() {
    let yellow = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!(
        "  {}",
        yellow.apply_to("The fal.ai API key is missing or was rejected.")
    );
    eprintln!(
        "  {}",
        dim.apply_to("Run `prism key set` to save a key, or export FAL_KEY.")
    );
}
