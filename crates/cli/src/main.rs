//! protoc-gen-proto23 CLI
//!
//! protoc plugin that re-emits proto3 schemas as proto2 (or proto3) source
//! with package and import paths rewritten. Run without a subcommand it acts
//! as a protoc plugin; the subcommands work offline on descriptor sets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use prost::Message;
use protoc_gen_proto23_common::{MessageNode, RewriteRules, SchemaFile};
use protoc_gen_proto23_generator::ProtoTranslator;
use protoc_gen_proto23_parser::PluginRequest;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
const LOG_ENV: &str = "PROTO23_LOG";

#[derive(Parser)]
#[command(name = "protoc-gen-proto23")]
#[command(
    version,
    about = "Rewrite proto3 schemas as proto2 source (protoc plugin)",
    long_about = None,
    after_help = "PLUGIN USAGE:\n  \
        protoc --proto23_out=rules.yaml:./out foo.proto"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate files from a FileDescriptorSet without protoc
    #[command(after_help = "EXAMPLES:\n  \
        # Build a descriptor set with comments\n  \
        protoc --include_imports --include_source_info -o schema.pb foo.proto\n\n  \
        # Translate every file in the set\n  \
        protoc-gen-proto23 convert \\\n    \
        --descriptor-set schema.pb \\\n    \
        --config rules.yaml \\\n    \
        --output ./out\n\n  \
        # Translate selected files only\n  \
        protoc-gen-proto23 convert \\\n    \
        --descriptor-set schema.pb \\\n    \
        --config rules.yaml \\\n    \
        --output ./out \\\n    \
        --file a/b/foo.proto")]
    Convert {
        /// Path to a binary FileDescriptorSet
        #[arg(short, long)]
        descriptor_set: PathBuf,

        /// Rewrite rule YAML file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Files to translate (all files in the set if omitted)
        #[arg(short, long = "file")]
        files: Vec<String>,
    },

    /// Display the schema tree parsed from a FileDescriptorSet
    Inspect {
        /// Path to a binary FileDescriptorSet
        #[arg(short, long)]
        descriptor_set: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a rewrite rule file
    CheckConfig {
        /// Rewrite rule YAML file
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        None => plugin_command()?,
        Some(Commands::Convert {
            descriptor_set,
            config,
            output,
            files,
        }) => {
            convert_command(
                descriptor_set.as_path(),
                config.as_path(),
                output.as_path(),
                &files,
                cli.verbose,
            )?;
        }
        Some(Commands::Inspect {
            descriptor_set,
            json,
        }) => {
            inspect_command(descriptor_set.as_path(), json, cli.verbose)?;
        }
        Some(Commands::CheckConfig { config }) => {
            check_config_command(config.as_path())?;
        }
    }

    Ok(())
}

/// Log to stderr; stdout carries the plugin response
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// protoc plugin mode: request on stdin, response on stdout
fn plugin_command() -> Result<()> {
    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;

    let request = PluginRequest::decode(&input).context("Failed to decode plugin request")?;

    let config = request.parameter().filter(|p| !p.is_empty()).context(
        "Missing plugin parameter: pass the rule file as --proto23_out=<rules.yaml>:<dir>",
    )?;
    let rules = RewriteRules::load(Path::new(config))
        .with_context(|| format!("Failed to load rewrite rules from {}", config))?;

    let files = request.parse().context("Failed to parse request files")?;
    let output = ProtoTranslator::new(&rules)?
        .run(&files)
        .context("Translation failed")?;

    info!(files = output.files.len(), "writing plugin response");

    let response = output.into_response().encode_to_vec();
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response)
        .context("Failed to write CodeGeneratorResponse to stdout")?;
    stdout.flush()?;

    Ok(())
}

fn convert_command(
    descriptor_set: &Path,
    config: &Path,
    output: &Path,
    files: &[String],
    verbose: bool,
) -> Result<()> {
    println!(
        "{} Translating descriptor set: {}",
        "→".cyan(),
        descriptor_set.display()
    );

    let rules = RewriteRules::load(config)
        .with_context(|| format!("Failed to load rewrite rules from {}", config.display()))?;

    if verbose {
        println!("  Config: {}", config.display());
        println!("  Target syntax: {}", rules.target_syntax);
        println!("  Output: {}", output.display());
    }

    let request = PluginRequest::from_descriptor_set_file(descriptor_set, files)
        .context("Failed to load FileDescriptorSet")?;
    let parsed = request.parse().context("Failed to parse FileDescriptorSet")?;

    println!(
        "{} Parsed {} files ({} selected)",
        "✓".green(),
        parsed.len(),
        request.files_to_generate().len()
    );

    let translated = ProtoTranslator::new(&rules)?
        .run(&parsed)
        .context("Translation failed")?;

    for file in &translated.files {
        let path = output.join(&file.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&path, &file.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        if verbose {
            println!("  Wrote: {}", path.display());
        }
    }

    println!(
        "\n{} Wrote {} files to {}",
        "✓".green().bold(),
        translated.files.len(),
        output.display().to_string().yellow()
    );

    Ok(())
}

fn inspect_command(descriptor_set: &Path, json: bool, verbose: bool) -> Result<()> {
    let request = PluginRequest::from_descriptor_set_file(descriptor_set, &[])
        .context("Failed to load FileDescriptorSet")?;
    let files = request.parse().context("Failed to parse FileDescriptorSet")?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&files).context("Failed to serialize schema tree")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", "Schema files:".bold());
    for file in &files {
        println!(
            "  • {} ({}, package {})",
            file.name.cyan(),
            file.syntax,
            if file.package.is_empty() {
                "<none>".dimmed().to_string()
            } else {
                file.package.yellow().to_string()
            }
        );
        println!("    Imports: {}", file.imports.len());
        println!("    Messages: {}", count_messages(&file.messages));
        println!("    Enums: {}", count_enums(file));
        println!("    Services: {}", file.services.len());

        if verbose {
            for service in &file.services {
                for method in &service.methods {
                    println!(
                        "      rpc {}.{} ({} options)",
                        service.name,
                        method.name,
                        method.options.len()
                    );
                }
            }
        }
    }

    Ok(())
}

fn check_config_command(config: &Path) -> Result<()> {
    let rules = RewriteRules::load(config)
        .with_context(|| format!("Invalid rewrite rules in {}", config.display()))?;

    println!("{}", "✓ Configuration is valid".green().bold());
    println!("  Target syntax: {}", rules.target_syntax.to_string().yellow());
    println!("  Delete validate import: {}", rules.delete_validate);

    println!("\n{}", "Package rules:".bold());
    for (from, to) in &rules.package_replace {
        println!("  {} → {}", from.cyan(), to);
    }

    println!("\n{}", "Import rules:".bold());
    for (from, to) in &rules.import_replace {
        println!("  {} → {}", from.cyan(), to);
    }

    Ok(())
}

/// Count messages including nested ones
fn count_messages(messages: &[MessageNode]) -> usize {
    messages
        .iter()
        .map(|m| 1 + count_messages(&m.messages))
        .sum()
}

/// Count top-level and nested enums of a file
fn count_enums(file: &SchemaFile) -> usize {
    fn nested(messages: &[MessageNode]) -> usize {
        messages
            .iter()
            .map(|m| m.enums.len() + nested(&m.messages))
            .sum()
    }

    file.enums.len() + nested(&file.messages)
}
