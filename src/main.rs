mod config;
mod error;
mod git;
mod reconcile;
mod registry;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use config::Settings;
use error::SyncError;
use git::SystemGit;
use reconcile::{InstallOutcome, UpdateOutcome};
use registry::Registry;

#[derive(Parser)]
#[command(
    name = "plugsync",
    about = "Reconcile declared git plugin sources against a local plugin directory"
)]
struct Cli {
    /// Plugin directory (overrides the configured value).
    #[arg(long, global = true)]
    plugins_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the registry and probe every declared source.
    Check,
    /// Install declared plugins without probing first.
    Install,
    /// Probe all sources, then install the reachable ones after confirmation.
    Sync,
    /// List plugins installed in the plugin directory.
    List,
    /// Update one installed plugin, or all of them.
    Update {
        /// Plugin name as reported by `list`. Omit to update everything.
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging to file (never stdout)
    let log_dir = directories::ProjectDirs::from("", "", "plugsync")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "plugsync.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter("plugsync=info")
        .init();

    tracing::info!("plugsync starting");

    let cli = Cli::parse();
    let settings = Settings::load()?;
    let plugins_dir = cli.plugins_dir.unwrap_or_else(|| settings.plugins_dir());
    let git = SystemGit;

    match cli.command {
        Commands::Check => check(&git, &settings),
        Commands::Install => install(&git, &settings, &plugins_dir),
        Commands::Sync => sync(&git, &settings, &plugins_dir),
        Commands::List => list(&git, &plugins_dir),
        Commands::Update { name } => update(&git, &plugins_dir, name.as_deref()),
    }
}

fn check(git: &SystemGit, settings: &Settings) -> Result<()> {
    let registry = load_and_report(settings)?;
    if registry.specs.is_empty() {
        println!("no plugins declared");
        return Ok(());
    }

    let partition = probe_with_progress(git, &registry.specs);

    println!();
    let total = registry.specs.len();
    println!(
        "{}/{total} sources reachable, {}/{total} unreachable",
        partition.ok.len(),
        partition.failed.len()
    );
    Ok(())
}

fn install(git: &SystemGit, settings: &Settings, plugins_dir: &Path) -> Result<()> {
    let registry = load_and_report(settings)?;
    if registry.specs.is_empty() {
        println!("no plugins declared");
        return Ok(());
    }

    ensure_plugins_dir(plugins_dir)?;
    run_install(git, &registry.specs, plugins_dir);
    Ok(())
}

fn sync(git: &SystemGit, settings: &Settings, plugins_dir: &Path) -> Result<()> {
    let registry = load_and_report(settings)?;
    if registry.specs.is_empty() {
        println!("no plugins declared");
        return Ok(());
    }

    let partition = probe_with_progress(git, &registry.specs);
    let total = registry.specs.len();

    println!();
    if !partition.failed.is_empty() {
        println!(
            "{}/{total} sources are unreachable and will not be installed",
            partition.failed.len()
        );
    }
    if partition.ok.is_empty() {
        println!("nothing to install");
        return Ok(());
    }
    println!("{}/{total} sources are ready to install", partition.ok.len());

    if !confirm("proceed")? {
        return Ok(());
    }

    ensure_plugins_dir(plugins_dir)?;
    run_install(git, &partition.ok, plugins_dir);
    Ok(())
}

fn probe_with_progress(git: &SystemGit, specs: &[registry::PluginSpec]) -> reconcile::Partition {
    let total = specs.len();
    println!("checking {total} declared sources");
    reconcile::check_all(git, specs, |index, spec, reachable| {
        let verdict = if reachable { "ok" } else { "unreachable" };
        println!(
            "({}/{total}) {} ({}) ... {verdict}",
            index + 1,
            spec.name,
            spec.source_url
        );
    })
}

fn run_install(git: &SystemGit, specs: &[registry::PluginSpec], plugins_dir: &Path) {
    let total = specs.len();
    let counters = reconcile::install_all(git, specs, plugins_dir, |index, spec, outcome| {
        let verdict = match outcome {
            InstallOutcome::Installed => "ok".to_string(),
            InstallOutcome::SkippedExisting => "skipped (already present)".to_string(),
            InstallOutcome::Failed(err) => format!("failed: {err}"),
        };
        println!(
            "({}/{total}) installing {} from {} ... {verdict}",
            index + 1,
            spec.name,
            spec.source_url
        );
    });

    println!();
    println!(
        "installed {}, skipped {}, failed {}",
        counters.installed_ok, counters.skipped_existing, counters.install_failed
    );
}

fn list(git: &SystemGit, plugins_dir: &Path) -> Result<()> {
    let plugins = reconcile::scan_installed(git, plugins_dir)?;
    if plugins.is_empty() {
        println!("no plugins installed in {}", plugins_dir.display());
        return Ok(());
    }

    for plugin in &plugins {
        println!("{} ({})", plugin.name, plugin.source_url);
    }
    Ok(())
}

fn update(git: &SystemGit, plugins_dir: &Path, name: Option<&str>) -> Result<()> {
    let mut plugins = reconcile::scan_installed(git, plugins_dir)?;
    if plugins.is_empty() {
        println!("no plugins installed in {}", plugins_dir.display());
        return Ok(());
    }

    if let Some(name) = name {
        plugins.retain(|plugin| plugin.name == name);
        if plugins.is_empty() {
            bail!("no installed plugin named {name}");
        }
    }

    let total = plugins.len();
    reconcile::update_all(git, &plugins, |index, plugin, outcome| {
        let verdict = match outcome {
            UpdateOutcome::UpToDate => "up to date".to_string(),
            UpdateOutcome::Updated => "updated".to_string(),
            UpdateOutcome::Failed(err) => format!("failed: {err}"),
        };
        println!("({}/{total}) {} ... {verdict}", index + 1, plugin.name);
    });
    Ok(())
}

fn load_and_report(settings: &Settings) -> Result<Registry> {
    let registry = registry::load_registry(&settings.registry_path())?;
    for bad in &registry.malformed {
        eprintln!(
            "registry line {}: no usable plugin name: {}",
            bad.line, bad.source_url
        );
    }
    Ok(registry)
}

fn ensure_plugins_dir(path: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(path).map_err(|source| SyncError::PluginDirCreate {
        path: path.to_path_buf(),
        source,
    })
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/n] ? ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
