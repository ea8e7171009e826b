//! Config command implementation

use anyhow::Result;

use alongtrack_core::config::CliConfigOverrides;

use super::CommandContext;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::ConfigEntry;

pub fn execute(context: &CommandContext, output: &OutputWriter) -> Result<()> {
    let config = load_config(
        context.config_file.as_deref(),
        CliConfigOverrides {
            presets_file: context.presets_file.clone(),
            ..Default::default()
        },
    )?;

    let entries: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();

    if output.is_json() {
        return output.result(entries);
    }

    output.section("Effective Settings");
    output.table(entries);

    if let Err(e) = config.resolve() {
        output.warning(format!("These settings are not usable: {}", e));
    }
    Ok(())
}
