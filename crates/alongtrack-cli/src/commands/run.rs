//! Run command implementation

use anyhow::{Context, Result};
use std::sync::Arc;

use alongtrack_core::config::{CliConfigOverrides, Settings};
use alongtrack_core::formats;
use alongtrack_core::models::FilterSet;
use alongtrack_core::ports::TrackDecoder;
use alongtrack_core::presets::{resolve_filters, FilterRequest, PresetCatalog};
use alongtrack_geo::{QueryWindower, TrackModel};
use alongtrack_overpass::{ReqwestTransport, RetryPolicy, RetryingFetcher};
use alongtrack_pipeline::{
    GeoJsonExporter, LeafletMapRenderer, OutputNames, Pipeline, PipelineConfig, PipelineRequest,
};

use super::CommandContext;
use crate::cli::RunArgs;
use crate::config_loader::load_config;
use crate::dry_run::{display_planned_actions, ActionType, PlannedAction};
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{PoiRow, RunOutput, RunPlan};
use crate::progress::BarProgress;

pub async fn execute(
    args: RunArgs,
    context: &CommandContext,
    output: &OutputWriter,
    dry_run: bool,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        project_name: args.project_name.clone(),
        output_path: args.output_path.clone(),
        presets_file: context.presets_file.clone(),
        radius_km: args.radius_km,
        step_km: args.step_km,
        batch_km: args.batch_km,
        retries: args.retries,
    };
    let settings = load_config(context.config_file.as_deref(), overrides)?
        .resolve()
        .map_err(errors::from_core)?;

    if !args.gpx.exists() {
        return Err(errors::track_not_found(&args.gpx).into());
    }
    let supported = args
        .gpx
        .file_name()
        .and_then(|name| name.to_str())
        .map(formats::is_supported)
        .unwrap_or(false);
    if !supported {
        return Err(errors::unsupported_track(&args.gpx).into());
    }

    let filters = resolve_run_filters(&settings, &args)?;

    if dry_run {
        return plan(&args, &settings, &filters, output);
    }

    let transport =
        ReqwestTransport::new(settings.overpass.request_timeout).context("Failed to build HTTP client")?;
    let fetcher = RetryingFetcher::new(
        Arc::new(transport),
        RetryPolicy::from_settings(&settings.overpass),
    );
    let pipeline = Pipeline::new(
        fetcher,
        Arc::new(GeoJsonExporter),
        Arc::new(LeafletMapRenderer),
        PipelineConfig {
            output_dir: settings.output_path.clone(),
            batch_km: settings.overpass.batch_km,
            map: settings.map.clone(),
        },
    );

    let request = PipelineRequest {
        project_name: settings.project_name.clone(),
        input_path: args.gpx.clone(),
        radius_km: settings.search.radius_km,
        step_km: settings.search.step_km,
        filters,
        outputs: OutputNames::for_project(&settings.project_name),
    };

    let progress = if output.is_json() {
        BarProgress::hidden()
    } else {
        BarProgress::new()
    };

    let result = match pipeline.run(&request, &progress).await {
        Ok(result) => {
            progress.finish_success("Processing complete");
            result
        }
        Err(e) => {
            progress.finish_error("Processing failed");
            return Err(errors::from_core(e));
        }
    };

    if output.is_json() {
        return output.result(RunOutput {
            project_name: settings.project_name.clone(),
            track_length_km: result.track_length_km,
            poi_count: result.rows.len(),
            geojson_file: result.table_path.display().to_string(),
            html_file: result.map_path.display().to_string(),
            pois: result.rows,
        });
    }

    output.section("Results");
    output.kv("Project", &settings.project_name);
    output.kv("Track length", format!("{:.1} km", result.track_length_km));
    output.kv("Points of interest", result.rows.len());
    if result.rows.is_empty() {
        output.warning("No points of interest found along the track");
    } else {
        output.table(result.rows.iter().map(PoiRow::from).collect());
    }
    output.success(format!("GeoJSON written to {}", result.table_path.display()));
    output.success(format!("Map written to {}", result.map_path.display()));
    Ok(())
}

/// Merge configured rules, presets and arguments into the run's filters
fn resolve_run_filters(settings: &Settings, args: &RunArgs) -> Result<FilterSet> {
    let catalog = PresetCatalog::load_or_empty(&settings.presets_file).map_err(errors::from_core)?;
    let presets = if args.presets.is_empty() {
        &settings.search.presets
    } else {
        &args.presets
    };

    let filters = resolve_filters(
        &catalog,
        &FilterRequest {
            base_include: &settings.search.include,
            base_exclude: &settings.search.exclude,
            presets,
            include: &args.include,
            exclude: &args.exclude,
        },
    )
    .map_err(errors::from_core)?;

    if filters.include.is_empty() {
        return Err(errors::no_include_filters().into());
    }
    Ok(filters)
}

/// Describe the queries and files of a run without sending or writing anything
fn plan(args: &RunArgs, settings: &Settings, filters: &FilterSet, output: &OutputWriter) -> Result<()> {
    let decoder = formats::decoder_for_path(&args.gpx)
        .ok_or_else(|| errors::unsupported_track(&args.gpx))?;
    let points = decoder.decode_file(&args.gpx).map_err(errors::from_core)?;
    let track = TrackModel::new(points).map_err(errors::from_core)?;

    let search = &settings.search;
    let windower = QueryWindower::new(search.step_km, search.radius_km, settings.overpass.batch_km)
        .map_err(errors::from_core)?;
    let windows = windower.windows(&track).map_err(errors::from_core)?.len();
    let batches = windower
        .batches(&track, &filters.include)
        .map_err(errors::from_core)?
        .len();

    let include: Vec<String> = filters.include.iter().map(|f| f.to_string()).collect();
    let exclude: Vec<String> = filters.exclude.iter().map(|f| f.to_string()).collect();

    let outputs = OutputNames::for_project(&settings.project_name);
    let table_path = settings.output_path.join(format!("{}.geojson", outputs.table_stem));
    let map_path = settings.output_path.join(format!("{}.html", outputs.map_stem));

    let actions = vec![
        PlannedAction::new(
            ActionType::QueryBatches,
            format!("Query Overpass in {} batches", batches),
        )
        .with_detail(format!(
            "{} query centers every {:.2} km along {:.1} km",
            windows,
            search.step_km,
            track.total_length_km()
        ))
        .with_detail(format!("Radius: {:.2} km", search.radius_km))
        .with_detail(format!("Include: {}", include.join(", ")))
        .with_detail(format!("Endpoints: {}", settings.overpass.endpoints.join(", "))),
        PlannedAction::new(
            ActionType::CreateDirectory,
            format!("Create {}", settings.output_path.display()),
        ),
        PlannedAction::new(ActionType::WriteFile, format!("Write {}", table_path.display())),
        PlannedAction::new(ActionType::WriteFile, format!("Write {}", map_path.display())),
    ];

    display_planned_actions(
        output,
        &actions,
        &RunPlan {
            track_length_km: track.total_length_km(),
            windows,
            batches,
            radius_km: search.radius_km,
            step_km: search.step_km,
            include,
            exclude,
        },
    )
}
