use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

use merkled_core::config::SealConfig;
use merkled_core::progress::Progress;
use merkled_core::seal::{
    read_manifest, seal_directory, verify_directory, write_manifest, SealOptions,
};
use merkled_core::{Manifest, ManifestMetadata, VerificationResult};

mod logging;

use logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "merkled",
    version,
    about = "Seal a folder with a Merkle root and verify it later",
    after_help = "Exit status: 0 valid, 2 verification or inspection found problems, 1 error."
)]
struct Cli {
    /// TOML file with [exclude], [hashing] and [walk] settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level or filter directive; MERKLED_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Args, Clone, Default)]
struct WalkArgs {
    /// Extra glob patterns to leave out (matched against the relative path)
    #[arg(long)]
    exclude: Vec<String>,
    /// Keep dotfiles and files inside dot-directories
    #[arg(long)]
    include_hidden: bool,
    /// Hashing worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,
    #[arg(long)]
    follow_symlinks: bool,
    /// Log hashing progress every few seconds
    #[arg(long)]
    progress: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Hash a folder and write its integrity manifest
    Seal {
        dir: PathBuf,
        #[arg(long, short, default_value = "integrity-manifest.json")]
        output: PathBuf,
        #[arg(long)]
        case_number: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        investigator: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Re-hash a folder and compare it with a manifest
    Verify {
        manifest: PathBuf,
        dir: PathBuf,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Summarise a manifest without touching any files
    Inspect { manifest: PathBuf },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format)?;
    let cfg = match &cli.config {
        Some(p) => SealConfig::load(p).with_context(|| format!("load config {}", p.display()))?,
        None => SealConfig::default(),
    };
    tracing::debug!(?cfg, "configuration");
    match cli.cmd {
        Cmd::Seal { dir, output, case_number, description, investigator, organization, walk } => {
            let metadata = ManifestMetadata { case_number, description, investigator, organization };
            seal(&cfg, &walk, &dir, &output, metadata)?;
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Verify { manifest, dir, json, walk } => verify(&cfg, &walk, &manifest, &dir, json),
        Cmd::Inspect { manifest } => inspect(&manifest),
    }
}

/// Exit status for a completed run that found the folder or manifest invalid.
const EXIT_INVALID: u8 = 2;

fn options(cfg: &SealConfig, walk: &WalkArgs, dir: &Path, manifest: &Path) -> Result<SealOptions> {
    let mut cfg = cfg.clone();
    if let Some(rel) = path_inside(dir, manifest) {
        tracing::debug!(path = %rel, "manifest lives inside the sealed folder; leaving it out");
        cfg.exclude.paths.push(rel);
    }
    cfg.exclude.globs.extend(walk.exclude.iter().cloned());
    if walk.include_hidden {
        cfg.exclude.hidden = false;
    }
    if walk.threads.is_some() {
        cfg.hashing.threads = walk.threads;
    }
    if walk.follow_symlinks {
        cfg.walk.follow_symlinks = true;
    }
    Ok(SealOptions::from_config(&cfg, Progress::new(walk.progress))?)
}

/// Slash-delimited path of `file` relative to `dir`, if it sits inside it.
/// `file` need not exist yet.
fn path_inside(dir: &Path, file: &Path) -> Option<String> {
    let dir = dir.canonicalize().ok()?;
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file = parent.canonicalize().ok()?.join(file.file_name()?);
    let rel = file.strip_prefix(&dir).ok()?;
    let parts = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn seal(
    cfg: &SealConfig,
    walk: &WalkArgs,
    dir: &Path,
    output: &Path,
    metadata: ManifestMetadata,
) -> Result<()> {
    let opts = options(cfg, walk, dir, output)?;
    let metadata = (!metadata.is_empty()).then_some(metadata);
    let manifest =
        seal_directory(dir, &opts, metadata).with_context(|| format!("seal {}", dir.display()))?;
    write_manifest(output, &manifest).with_context(|| format!("write {}", output.display()))?;
    eprintln!(
        "Sealed {} file(s), {} -> {}",
        manifest.total_files,
        format_bytes(manifest.total_size),
        output.display()
    );
    println!("{}", manifest.merkle_root);
    Ok(())
}

fn verify(
    cfg: &SealConfig,
    walk: &WalkArgs,
    manifest_path: &Path,
    dir: &Path,
    json: bool,
) -> Result<ExitCode> {
    let manifest =
        read_manifest(manifest_path).with_context(|| format!("read {}", manifest_path.display()))?;
    let opts = options(cfg, walk, dir, manifest_path)?;
    let res = verify_directory(dir, &manifest, &opts)
        .with_context(|| format!("verify {}", dir.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        print_result(&res);
    }
    Ok(if res.is_valid { ExitCode::SUCCESS } else { ExitCode::from(EXIT_INVALID) })
}

fn print_result(res: &VerificationResult) {
    eprintln!(
        "Files matched {}/{}; Merkle={}",
        res.files_matched,
        res.files_total,
        if res.merkle_root_match { "OK" } else { "MISMATCH" }
    );
    for p in &res.tampered_files {
        println!("tampered: {p}");
    }
    for p in &res.missing_files {
        println!("missing:  {p}");
    }
    for p in &res.extra_files {
        println!("extra:    {p}");
    }
    if res.is_valid {
        println!("OK");
    } else {
        println!("BAD");
    }
}

fn inspect(manifest_path: &Path) -> Result<ExitCode> {
    let m = read_manifest(manifest_path)
        .with_context(|| format!("read {}", manifest_path.display()))?;
    print_summary(&m);
    let problems = m.consistency_errors();
    for p in &problems {
        println!("Problem: {p}");
    }
    Ok(if problems.is_empty() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_INVALID) })
}

fn print_summary(m: &Manifest) {
    println!("Version:      {}", m.version);
    println!("Generated:    {}", m.timestamp);
    println!("Total files:  {}", m.total_files);
    println!("Total size:   {}", format_bytes(m.total_size));
    if let Some(md) = &m.metadata {
        let fields = [
            ("Case number:", &md.case_number),
            ("Description:", &md.description),
            ("Investigator:", &md.investigator),
            ("Organization:", &md.organization),
        ];
        for (label, v) in fields {
            if let Some(v) = v {
                println!("{label:<14}{v}");
            }
        }
    }
    println!("Merkle root:  {}", m.merkle_root);
    println!();
    for f in &m.files {
        let hex = f.hash.to_hex();
        println!("  {:<48} {:>10}  {}...", f.relative_path, format_bytes(f.size), &hex[..32]);
    }
}

/// 1024 -> "1 KB", 1536 -> "1.5 KB".
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
