use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rigbake::{
    ConvertConfig, Converter, Document, Element, ImageExporter, KurboFlattener, ManifestExporter,
    NamingPolicy, PrerenderedExporter, SkeletonEncoder, SpineJsonEncoder,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rigbake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert the selection (or named symbols) into skeleton JSON files.
    Convert(ConvertArgs),
    /// Print the label ranges of a symbol's timeline.
    Labels(LabelsArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input scene document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory for skeleton files and the image manifest.
    #[arg(long)]
    out_dir: PathBuf,

    /// Conversion config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Merge the whole selection into one skeleton.
    #[arg(long, default_value_t = false)]
    merge: bool,

    /// Convert these library symbols instead of the document selection.
    #[arg(long = "item")]
    items: Vec<String>,

    /// Read image sizes from files already rendered under this directory.
    #[arg(long)]
    prerendered: Option<PathBuf>,

    /// Pixels per source unit of exported images.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Write compact JSON.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(Parser, Debug)]
struct LabelsArgs {
    /// Input scene document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Library symbol to inspect.
    #[arg(long)]
    item: String,

    /// Conversion config JSON (for the default label name).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::Labels(args) => cmd_labels(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConvertConfig> {
    match path {
        Some(p) => ConvertConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(ConvertConfig::default()),
    }
}

fn load_document(path: &Path) -> anyhow::Result<Document> {
    let doc =
        Document::from_path(path).with_context(|| format!("load scene '{}'", path.display()))?;
    doc.validate()
        .with_context(|| format!("validate scene '{}'", path.display()))?;
    Ok(doc)
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if args.merge {
        config.merge_skeletons = true;
    }
    let doc = load_document(&args.in_path)?;

    let targets: Vec<Element> = if args.items.is_empty() {
        doc.selection.clone()
    } else {
        args.items
            .iter()
            .map(|name| Element::instance(name.as_str(), name.as_str()))
            .collect()
    };
    if targets.is_empty() {
        anyhow::bail!("nothing to convert: the document selection is empty and no --item given");
    }

    let naming = NamingPolicy::new(config.primitive_prefix.clone());
    let flattener = KurboFlattener;
    let mut exporter: Box<dyn ImageExporter> = match &args.prerendered {
        Some(root) => Box::new(PrerenderedExporter::new(root, args.scale)?),
        None => Box::new(ManifestExporter::new(args.scale)?),
    };
    let mut converter = Converter::new(&config, &naming, &flattener, exporter.as_mut());
    let report = rigbake::convert_selection(&mut converter, &doc, &targets);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let encoder = SpineJsonEncoder {
        pretty: !args.compact,
        ..SpineJsonEncoder::default()
    };
    for converted in &report.skeletons {
        let bytes = encoder
            .encode(&converted.skeleton)
            .with_context(|| format!("encode skeleton '{}'", converted.skeleton.name))?;
        let out = args.out_dir.join(format!(
            "{}.{}",
            converted.skeleton.name,
            encoder.extension()
        ));
        std::fs::write(&out, bytes).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    let manifest = serde_json::json!({
        "images": report.manifest().collect::<Vec<_>>(),
        "diagnostics": report.diagnostics().collect::<Vec<_>>(),
    });
    let out = args.out_dir.join("manifest.json");
    std::fs::write(&out, serde_json::to_vec_pretty(&manifest)?)
        .with_context(|| format!("write '{}'", out.display()))?;

    for failure in &report.failures {
        eprintln!("failed {}: {}", failure.item, failure.error);
    }
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} item(s) failed",
            report.failures.len(),
            targets.len()
        );
    }
    Ok(())
}

fn cmd_labels(args: LabelsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let doc = load_document(&args.in_path)?;
    let timeline = doc
        .symbol(&args.item)
        .with_context(|| format!("unknown symbol '{}'", args.item))?;
    for label in rigbake::derive_labels(timeline, &config.default_label) {
        println!("{}\t{}\t{}", label.name, label.start, label.end);
    }
    Ok(())
}
