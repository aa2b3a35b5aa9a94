//! The `prism models` command: lists the model and size catalog.

use clap::Args;
use console::Style;
use prism_core::catalog::{self, DEFAULT_MODEL, DEFAULT_SIZE, IMAGE_SIZES, MODELS};

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// List image size presets instead of models
    #[arg(long)]
    pub sizes: bool,
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs) -> anyhow::Result<()> {
    if args.sizes {
        print!("{}", format_sizes());
    } else {
        print!("{}", format_models());
    }
    Ok(())
}

fn format_models() -> String {
    let bold = Style::new().bold();
    let dim = Style::new().dim();
    let width = MODELS.iter().map(|m| m.id.len()).max().unwrap_or(0);

    let mut out = String::new();
    for model in MODELS {
        let marker = if model.id == DEFAULT_MODEL { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<width$}  {}\n",
            model.id,
            bold.apply_to(model.name),
        ));
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            "",
            dim.apply_to(model.description)
        ));
    }
    out.push_str(&format!(
        "\n{} models (* = default). Prompt counts: {:?}\n",
        MODELS.len(),
        catalog::PROMPT_COUNT_CHOICES
    ));
    out
}

fn format_sizes() -> String {
    let width = IMAGE_SIZES.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for size in IMAGE_SIZES {
        let marker = if size.id == DEFAULT_SIZE { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<width$}  {:<16}  {}\n",
            size.id,
            size.name,
            size.dimensions()
        ));
    }
    out
}
