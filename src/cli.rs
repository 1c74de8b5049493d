use crate::batch::{BatchReport, DiagramJob, render_batch};
use crate::config::{Config, DiagramSet, load_config, parse_diagram_set};
use crate::layout_dump::write_layout_dump;
use crate::writer::{FsWriter, MemoryWriter};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bitlane", version, about = "Render bit-field register layouts to SVG")]
pub struct Args {
    /// Diagram set (.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output directory for the rendered documents
    #[arg(short = 'o', long = "output", default_value = ".")]
    pub output: PathBuf,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Also write a JSON layout dump per diagram into this directory
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,

    /// Only render diagrams with these output names
    #[arg(long = "only")]
    pub only: Vec<String>,

    /// Validate and render without writing anything (layout dumps included)
    #[arg(long = "check")]
    pub check: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    execute(Args::parse())
}

fn execute(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let input = read_input(&args.input)?;
    let set = parse_diagram_set(&input)
        .with_context(|| format!("parsing diagram set {}", args.input.display()))?;
    let jobs = select_jobs(set, &args.only, args.output_format)?;

    if let Some(dir) = &args.dump_layout {
        if args.check {
            tracing::warn!(dir = %dir.display(), "--check writes nothing; skipping layout dump");
        } else {
            dump_layouts(&jobs, &config, dir)?;
        }
    }

    let report = if args.check {
        render_batch(&jobs, &config, &mut MemoryWriter::default())
    } else {
        let mut writer = FsWriter::new(&args.output).with_render_config(config.render.clone());
        render_batch(&jobs, &config, &mut writer)
    };
    summarize(&report)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn select_jobs(set: DiagramSet, only: &[String], format: OutputFormat) -> Result<Vec<DiagramJob>> {
    for name in only {
        if !set.jobs.iter().any(|job| &job.identity == name) {
            anyhow::bail!("no diagram named {name:?} in the input");
        }
    }
    Ok(set
        .jobs
        .into_iter()
        .filter(|job| only.is_empty() || only.contains(&job.identity))
        .map(|mut job| {
            job.identity = output_identity(&job.identity, format);
            job
        })
        .collect())
}

fn output_identity(identity: &str, format: OutputFormat) -> String {
    let ext = match format {
        OutputFormat::Svg => "svg",
        OutputFormat::Png => "png",
    };
    Path::new(identity)
        .with_extension(ext)
        .to_string_lossy()
        .into_owned()
}

fn dump_layouts(jobs: &[DiagramJob], config: &Config, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for job in jobs {
        // Render errors are reported by the batch run.
        let Ok(layout) = job.layout(config) else {
            continue;
        };
        let name = Path::new(&job.identity).with_extension("layout.json");
        let file_name = name.file_name().unwrap_or(name.as_os_str());
        write_layout_dump(&dir.join(file_name), &layout)?;
    }
    Ok(())
}

fn summarize(report: &BatchReport) -> Result<()> {
    if report.is_success() {
        tracing::info!(count = report.written.len(), "all diagrams rendered");
        return Ok(());
    }
    let names: Vec<&str> = report.failed.iter().map(|(id, _)| id.as_str()).collect();
    Err(anyhow::anyhow!(
        "{} of {} diagrams failed: {}",
        report.failed.len(),
        report.failed.len() + report.written.len(),
        names.join(", ")
    ))
}
