//! The `prism generate` command: one image per prompt, in parallel.

use super::key::{self, ConfigFileCredentialStore};
use super::theme;
use clap::Args;
use console::Style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use prism_core::catalog::PROMPT_COUNT_CHOICES;
use prism_core::{
    import, BatchStats, Config, Credential, CredentialStore, EntryOutcome, EntryUpdate,
    GenerationEvent, GenerationState, ImageExporter, JobSpec, Orchestrator, OutputFormat,
    OutputWriter, PromptSet, ResultRecord,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prompts to generate, one image each
    pub prompts: Vec<String>,

    /// Import prompts from a CSV file (every non-blank cell is a prompt)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Model for every prompt (see `prism models`)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Image size preset for every prompt (see `prism models --sizes`)
    #[arg(short, long)]
    pub size: Option<String>,

    /// Number of prompt slots (1, 2, 3, 4, 5, 6, 9 or 12); prompts repeat to fill them
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Save images locally (defaults to the configured output directory)
    #[arg(short, long, value_name = "DIR", num_args = 0..=1)]
    pub download: Option<Option<PathBuf>>,

    /// Write result records to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Result record format: json or jsonl
    #[arg(short, long)]
    pub format: Option<String>,

    /// Maximum jobs in flight at once
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// API key for this run only (not saved)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.generation.parallel = parallel;
    }

    let format_name = args.format.as_deref().unwrap_or(&config.output.format);
    let Some(format) = OutputFormat::parse(format_name) else {
        anyhow::bail!("Unknown output format: {format_name} (expected json or jsonl)");
    };

    let prompts = collect_prompts(&args)?;
    let model = args
        .model
        .as_deref()
        .unwrap_or(&config.generation.default_model);
    let size = args
        .size
        .as_deref()
        .unwrap_or(&config.generation.default_size);
    let mut set = build_prompt_set(prompts, model, size, args.count)?;

    let credential = resolve_credential(args.api_key.as_deref())?;
    let jobs: HashMap<usize, JobSpec> = set
        .pending_jobs()
        .into_iter()
        .map(|spec| (spec.index, spec))
        .collect();

    tracing::info!(
        "Generating {} image(s) with {} at {}",
        jobs.len(),
        model,
        size
    );

    let orchestrator = Orchestrator::from_config(&config);
    let progress = EntryProgress::new(&set)?;
    let outcomes = orchestrator
        .generate_set(&mut set, credential.as_ref(), |event, set| {
            progress.update(event, set)
        })
        .await;

    let mut records: Vec<ResultRecord> = outcomes
        .iter()
        .filter_map(|outcome| {
            jobs.get(&outcome.index).map(|spec| {
                ResultRecord::from_outcome(outcome, &spec.prompt, &spec.model_id, &spec.image_size_id)
            })
        })
        .collect();

    if let Some(dir) = &args.download {
        let dir = dir.clone().unwrap_or_else(|| config.output_dir());
        download_all(&ImageExporter::new(dir), &mut records).await;
    }

    write_records(&records, format, config.output.pretty, args.output.as_ref())?;
    let summary = report(&outcomes);
    if should_reprompt(&outcomes, console::Term::stderr().is_term(), credential.is_some()) {
        reprompt_for_key()?;
    }
    summary
}

/// Positional prompts followed by any CSV-imported ones.
fn collect_prompts(args: &GenerateArgs) -> anyhow::Result<Vec<String>> {
    let mut prompts: Vec<String> = args
        .prompts
        .iter()
        .filter(|p| !p.trim().is_empty())
        .cloned()
        .collect();
    if let Some(path) = &args.csv {
        prompts.extend(import::read_prompts_from_path(path)?);
    }
    if prompts.is_empty() {
        anyhow::bail!("No prompts given. Pass prompts as arguments or use --csv FILE.");
    }
    Ok(prompts)
}

fn build_prompt_set(
    prompts: Vec<String>,
    model: &str,
    size: &str,
    count: Option<usize>,
) -> anyhow::Result<PromptSet> {
    let mut set = PromptSet::new(model, size)?;
    match count {
        None => {
            set.load_prompts(prompts);
        }
        Some(count) => {
            if !PROMPT_COUNT_CHOICES.contains(&count) {
                anyhow::bail!("--count must be one of {:?}", PROMPT_COUNT_CHOICES);
            }
            if prompts.len() > count {
                tracing::warn!(
                    "{} prompt(s) given but only {count} slot(s); extra prompts ignored",
                    prompts.len()
                );
            }
            set.resize(count);
            for (index, prompt) in prompts.iter().cycle().take(count).enumerate() {
                set.set_text(index, prompt.as_str())?;
            }
        }
    }
    Ok(set)
}

/// `--api-key`, then the saved/environment key, then an interactive prompt.
fn resolve_credential(flag: Option<&str>) -> anyhow::Result<Option<Credential>> {
    if let Some(key) = flag {
        let Some(credential) = Credential::new(key) else {
            anyhow::bail!("--api-key cannot be empty");
        };
        return Ok(Some(credential));
    }

    let store = ConfigFileCredentialStore::new(Config::default_path());
    if let Some(credential) = store.get() {
        return Ok(Some(credential));
    }

    if console::Term::stderr().is_term() {
        eprintln!("No fal.ai API key configured.");
        return key::prompt_and_offer_save(&store);
    }
    Ok(None)
}

/// Ask again only when a key was used and rejected on a terminal. With no
/// key at all the user has already declined the first prompt.
fn should_reprompt(outcomes: &[EntryOutcome], interactive: bool, had_credential: bool) -> bool {
    interactive
        && had_credential
        && outcomes
            .iter()
            .any(|o| o.result.as_ref().is_err_and(|e| e.needs_credential()))
}

/// Take a replacement key after a rejection. Nothing is retried.
fn reprompt_for_key() -> anyhow::Result<()> {
    let store = ConfigFileCredentialStore::new(Config::default_path());
    if key::prompt_and_offer_save(&store)?.is_some() {
        let dim = Style::new().for_stderr().dim();
        eprintln!(
            "  {}",
            dim.apply_to("Run the command again to generate with the new key (or pass --api-key).")
        );
    }
    Ok(())
}

/// One spinner per non-blank entry.
struct EntryProgress {
    bars: HashMap<usize, ProgressBar>,
}

impl EntryProgress {
    fn new(set: &PromptSet) -> anyhow::Result<Self> {
        let multi = MultiProgress::new();
        let style = ProgressStyle::with_template("{spinner:.magenta} {prefix:.bold} {msg}")?;
        let bars = set
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_blank())
            .map(|(index, entry)| {
                let bar = multi.add(ProgressBar::new_spinner());
                bar.set_style(style.clone());
                bar.set_prefix(format!("[{}] {}", index + 1, snippet(&entry.text, 40)));
                bar.set_message(GenerationState::Idle.message().to_string());
                bar.enable_steady_tick(Duration::from_millis(100));
                (index, bar)
            })
            .collect();
        Ok(Self { bars })
    }

    fn update(&self, event: &GenerationEvent, set: &PromptSet) {
        let (Some(bar), Some(entry)) = (self.bars.get(&event.index), set.get(event.index)) else {
            return;
        };
        let EntryUpdate::State(state) = &event.update else {
            return;
        };
        match state {
            GenerationState::Complete => {
                let url = entry
                    .result
                    .as_ref()
                    .map(|r| r.image_url.as_str())
                    .unwrap_or_default();
                bar.finish_with_message(format!(
                    "{} {}",
                    Style::new().green().apply_to("✓"),
                    url
                ));
            }
            GenerationState::Error(message) => {
                bar.abandon_with_message(format!(
                    "{} {}",
                    Style::new().red().apply_to("✗"),
                    message
                ));
            }
            other => bar.set_message(other.message().to_string()),
        }
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars - 1).collect();
        format!("{cut}…")
    }
}

async fn download_all(exporter: &ImageExporter, records: &mut [ResultRecord]) {
    for record in records.iter_mut() {
        let Some(url) = record.image_url.as_deref() else {
            continue;
        };
        match exporter.save(url).await {
            Ok(path) => record.saved_path = Some(path),
            Err(e) => tracing::warn!("Prompt {}: {e}", record.prompt_number),
        }
    }
}

fn write_records(
    records: &[ResultRecord],
    format: OutputFormat,
    pretty: bool,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format, pretty);
    writer.write_all(records)?;
    writer.flush()?;
    if let Some(path) = output {
        tracing::info!("Wrote {} record(s) to {:?}", writer.items_written(), path);
    }
    Ok(())
}

fn report(outcomes: &[EntryOutcome]) -> anyhow::Result<()> {
    let stats = BatchStats::from_outcomes(outcomes);
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "{}",
        dim.apply_to(format!(
            "{} submitted, {} succeeded, {} failed",
            stats.submitted, stats.succeeded, stats.failed
        ))
    );

    let needs_key = outcomes
        .iter()
        .any(|o| o.result.as_ref().is_err_and(|e| e.needs_credential()));
    if needs_key {
        theme::print_key_hint();
    }

    if stats.submitted > 0 && stats.succeeded == 0 {
        anyhow::bail!("All {} generation(s) failed", stats.failed);
    }
    Ok(())
}
