//! Weft - tile-based template builder.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use weft::log;
use weft::{DefinitionFile, DirectoryTileSource, MemoryCache, TemplateBuilder};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let file = DefinitionFile::from_path(&cli.definitions)
        .with_context(|| format!("failed to load {}", cli.definitions.display()))?;

    match cli.command {
        Commands::Check => check(file),
        Commands::Build { output } => build(file, &output),
    }
}

/// Assemble a builder from a parsed definition file.
fn make_builder(file: DefinitionFile) -> TemplateBuilder {
    let mut builder = TemplateBuilder::new(Arc::new(MemoryCache::new()));

    for (origin, dir) in file.sources {
        let source = DirectoryTileSource::new(&dir);
        log!("tiles"; "{origin}: {} tiles under {}", source.tile_names().len(), dir.display());
        builder.add_tile_source(origin, source);
    }
    builder.add_definitions(file.templates);
    builder
}

/// Resolve the build chain without building anything.
fn check(file: DefinitionFile) -> Result<()> {
    let builder = make_builder(file);
    let order = builder.build_order()?;
    log!("check"; "{} templates, build chain:", order.len());
    for name in order {
        log!("check"; "  {name}");
    }
    Ok(())
}

/// Build every concrete template and write the compiled documents.
fn build(file: DefinitionFile, output: &Path) -> Result<()> {
    let builder = make_builder(file);
    let templates = builder.build()?;

    fs::create_dir_all(output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let mut written = 0usize;
    for template in &templates {
        // marker templates have nothing to write
        let Some(content) = template.content() else {
            log!("build"; "{} has no content, skipped", template.name());
            continue;
        };
        let path = output.join(format!("{}.xml", template.name()));
        fs::write(&path, content.as_slice())
            .with_context(|| format!("failed to write {}", path.display()))?;
        log!("build"; "compiled {}", template.name());
        written += 1;
    }

    log!("build"; "wrote {written} of {} templates to {}", templates.len(), output.display());
    Ok(())
}
