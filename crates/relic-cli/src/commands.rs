use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use relic_content::{DirectoryIdResolver, HttpFetcher, InternalIdResolver, NullIdResolver};
use relic_foxml::DecoderContext;
use relic_migrate::{DirectoryObjectSource, FailurePolicy, MigrationConfig, Migrator};
use relic_timeline::{ObjectReference, ObjectReferenceBuilder};
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Migrate(args) => cmd_migrate(config_path, args),
        Command::Inspect(args) => cmd_inspect(config_path, args, cli.format),
        Command::Config(args) => cmd_config(config_path, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MigrationConfig> {
    match path {
        Some(path) => MigrationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(MigrationConfig::default()),
    }
}

fn cmd_migrate(config_path: Option<&Path>, args: MigrateArgs) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(source) = args.source {
        config.source_dir = source;
    }
    if let Some(target) = args.target {
        config.storage_root = target;
    }
    if let Some(store) = args.datastream_store {
        config.datastream_store = Some(store);
    }
    if let Some(pids) = args.pid_list {
        config.pid_list = Some(pids);
    }
    if args.continue_on_error {
        config.failure_policy = FailurePolicy::Continue;
    }

    debug!(config = ?config, "effective configuration");
    let migrator = Migrator::from_config(&config)?;
    let source = DirectoryObjectSource::scan(&config.source_dir)?;
    println!(
        "Migrating {} documents from {} into {}",
        source.len().to_string().bold(),
        config.source_dir.display(),
        config.storage_root.display().to_string().cyan()
    );

    let report = migrator.run(&source)?;
    println!(
        "{} Migrated {} objects ({} versions, {} binaries, {} bytes)",
        "✓".green().bold(),
        report.migrated.to_string().bold(),
        report.versions,
        report.binaries,
        report.bytes_written
    );
    if report.skipped > 0 {
        println!("  Skipped: {}", report.skipped.to_string().yellow());
    }
    if !report.is_clean() {
        println!("  {} {}", "Failed:".red().bold(), report.failures.len());
        for failure in &report.failures {
            println!("    {} ({}): {}", failure.pid.yellow(), failure.document, failure.message);
        }
        anyhow::bail!("{} of {} objects failed", report.failures.len(), report.documents);
    }
    Ok(())
}

fn cmd_inspect(config_path: Option<&Path>, args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let resolver: Arc<dyn InternalIdResolver> = match &config.datastream_store {
        Some(dir) => Arc::new(DirectoryIdResolver::build(dir)?),
        None => Arc::new(NullIdResolver),
    };
    let context = DecoderContext::new(resolver, Arc::new(HttpFetcher::new()?), config.decoder_config());

    debug!(file = %args.file.display(), "inspecting document");
    let file = File::open(&args.file).with_context(|| format!("opening {}", args.file.display()))?;
    let mut builder = ObjectReferenceBuilder::new();
    context.decoder(BufReader::new(file)).decode(&mut builder)?;
    let reference = builder
        .take()
        .context("decoder finished without a complete object")?;

    match format {
        OutputFormat::Text => print_reference(&reference),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reference_json(&reference))?),
    }
    Ok(())
}

fn print_reference(reference: &ObjectReference) {
    println!("Object {}", reference.pid().yellow().bold());
    for property in reference.properties().iter() {
        let name = property.name.rsplit(['#', '/']).next().unwrap_or(&property.name);
        println!("  {} = {}", name.dimmed(), property.value);
    }

    println!("\nDatastreams:");
    for dsid in reference.datastream_ids() {
        let versions = reference.versions(dsid);
        if let Some(first) = versions.first() {
            let info = first.datastream();
            println!(
                "  {} [{}] {} ({} versions)",
                dsid.bold(),
                info.control_group().code(),
                info.state(),
                versions.len()
            );
        }
    }

    let timeline = reference.timeline();
    println!("\nTimeline ({} versions):", timeline.len());
    for entry in &timeline {
        let changed: Vec<String> = entry
            .changed()
            .iter()
            .map(|v| format!("{}/{}", v.datastream().id(), v.id()))
            .collect();
        println!(
            "  {}  {}  {}",
            format!("v{}", entry.index() + 1).cyan(),
            entry.version_date(),
            changed.join(", ")
        );
    }
}

fn reference_json(reference: &ObjectReference) -> serde_json::Value {
    let properties: Vec<_> = reference
        .properties()
        .iter()
        .map(|p| json!({ "name": p.name, "value": p.value }))
        .collect();
    let datastreams: Vec<_> = reference
        .datastream_ids()
        .map(|dsid| {
            let versions: Vec<_> = reference
                .versions(dsid)
                .iter()
                .map(|v| {
                    json!({
                        "id": v.id(),
                        "created": v.created(),
                        "mimeType": v.mime_type(),
                        "size": v.size(),
                        "content": v.content().describe(),
                    })
                })
                .collect();
            json!({ "id": dsid, "versions": versions })
        })
        .collect();
    let timeline: Vec<_> = reference
        .timeline()
        .iter()
        .map(|entry| {
            let changed: Vec<_> = entry
                .changed()
                .iter()
                .map(|v| json!({ "datastream": v.datastream().id(), "version": v.id() }))
                .collect();
            json!({
                "index": entry.index(),
                "date": entry.version_date(),
                "changed": changed,
            })
        })
        .collect();
    json!({
        "pid": reference.pid(),
        "properties": properties,
        "datastreams": datastreams,
        "timeline": timeline,
    })
}

fn cmd_config(config_path: Option<&Path>, args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    if args.check {
        println!("{} Configuration is valid", "✓".green().bold());
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
