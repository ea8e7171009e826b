//! Presets command implementation

use anyhow::Result;

use alongtrack_core::config::CliConfigOverrides;
use alongtrack_core::presets::PresetCatalog;

use super::CommandContext;
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{PresetInfo, PresetRow, PresetsOutput};

pub fn execute(context: &CommandContext, output: &OutputWriter) -> Result<()> {
    let config = load_config(
        context.config_file.as_deref(),
        CliConfigOverrides {
            presets_file: context.presets_file.clone(),
            ..Default::default()
        },
    )?;
    let presets_file = config.presets_file.value;
    let catalog = PresetCatalog::load_or_empty(&presets_file).map_err(errors::from_core)?;

    let presets: Vec<PresetInfo> = catalog
        .iter()
        .map(|(name, preset)| PresetInfo {
            name: name.to_string(),
            include: preset.include.clone(),
            exclude: preset.exclude.clone(),
        })
        .collect();

    if output.is_json() {
        return output.result(PresetsOutput {
            presets_file: presets_file.display().to_string(),
            presets,
        });
    }

    output.section("Presets");
    output.kv("File", presets_file.display());
    if presets.is_empty() {
        output.warning(format!("No presets found in {}", presets_file.display()));
        return Ok(());
    }
    output.table(presets.iter().map(PresetRow::from).collect());
    output.info("Apply with: alongtrack run <track.gpx> --preset <name>");
    Ok(())
}
