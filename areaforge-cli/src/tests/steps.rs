//! Behaviour-driven step definitions driving the assemble CLI scenarios.

use super::helpers::{ExtractFiles, LayerOverrides, merge_layers};
use super::*;
use crate::assemble::run_assemble;
use areaforge_data::AreaBuildSummary;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates assemble scenario state so each step takes a single world.
#[derive(Debug)]
struct AssembleWorld {
    files: ExtractFiles,
    cli_args: RefCell<Vec<String>>,
    config_layer: RefCell<Option<LayerOverrides>>,
    env_layer: RefCell<Option<LayerOverrides>>,
    config_result: RefCell<Option<Result<AssembleConfig, CliError>>>,
    run_result: RefCell<Option<Result<AreaBuildSummary, CliError>>>,
}

impl AssembleWorld {
    fn new() -> Self {
        Self {
            files: ExtractFiles::new(),
            cli_args: RefCell::new(Vec::new()),
            config_layer: RefCell::new(None),
            env_layer: RefCell::new(None),
            config_result: RefCell::new(None),
            run_result: RefCell::new(None),
        }
    }

    fn parse(&self) -> Result<AssembleArgs, CliError> {
        let mut invocation = vec!["areaforge".to_owned(), "assemble".to_owned()];
        invocation.extend(self.cli_args.borrow().iter().cloned());
        let cli = Cli::try_parse_from(invocation).map_err(CliError::ArgumentParsing)?;
        match cli.command {
            Command::Assemble(args) => Ok(args),
        }
    }

    fn config(&self) -> AssembleConfig {
        self.config_result
            .borrow()
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success")
            .clone()
    }
}

#[fixture]
fn world() -> AssembleWorld {
    AssembleWorld::new()
}

#[given("an empty extract exists on disk")]
fn extract_exists(#[from(world)] world: &AssembleWorld) {
    world.files.write_empty_extract();
    assert!(world.files.extract().is_file(), "extract should exist");
}

#[given("I pass the extract path with CLI flags")]
fn cli_provides_extract(#[from(world)] world: &AssembleWorld) {
    let output = world.files.path("cli/areas.geojson");
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_OSM_PBF}"),
        world.files.extract().as_str().to_owned(),
        format!("--{ARG_OUTPUT}"),
        output.into_string(),
    ]);
}

#[given("I omit all extract configuration")]
fn omit_configuration(#[from(world)] world: &AssembleWorld) {
    world.cli_args.borrow_mut().clear();
    world.config_layer.replace(None);
    world.env_layer.replace(None);
}

#[given("the worker count is provided via a config file")]
fn workers_via_config(#[from(world)] world: &AssembleWorld) {
    world.config_layer.replace(Some(LayerOverrides {
        output: Some(world.files.path("config/areas.geojson")),
        workers: Some(3),
    }));
}

#[given("the output path is overridden via environment variables")]
fn output_via_env(#[from(world)] world: &AssembleWorld) {
    world.env_layer.replace(Some(LayerOverrides {
        output: Some(world.files.path("env/areas.geojson")),
        workers: None,
    }));
}

#[when("I configure the assemble command")]
fn configure_assemble(#[from(world)] world: &AssembleWorld) {
    let file_layer = world.config_layer.borrow().clone();
    let env_layer = world.env_layer.borrow().clone();
    let outcome = world.parse().and_then(|args| {
        if file_layer.is_some() || env_layer.is_some() {
            merge_layers(args, file_layer, env_layer)
        } else {
            resolve_assemble_config(args)
        }
    });
    world.config_result.replace(Some(outcome));
}

#[when("I run the assemble command")]
fn run_assemble_command(#[from(world)] world: &AssembleWorld) {
    let config = world
        .parse()
        .and_then(resolve_assemble_config)
        .expect("configuration should resolve");
    let outcome = run_assemble(&config);
    world.config_result.replace(Some(Ok(config)));
    world.run_result.replace(Some(outcome));
}

#[then("the assemble plan uses the CLI-provided extract path")]
fn plan_uses_cli_path(#[from(world)] world: &AssembleWorld) {
    let config = world.config();
    assert_eq!(config.osm_pbf, world.files.extract());
    assert_eq!(config.output, world.files.path("cli/areas.geojson"));
}

#[then("the CLI reports that the \"osm-pbf\" flag is missing")]
fn reports_missing_extract(#[from(world)] world: &AssembleWorld) {
    let borrowed = world.config_result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_OSM_PBF),
        other => panic!("unexpected error {other:?}"),
    }
}

#[then("CLI and environment layers override configuration defaults")]
fn precedence_holds(#[from(world)] world: &AssembleWorld) {
    let config = world.config();
    assert_eq!(config.output, world.files.path("cli/areas.geojson"));
    assert_eq!(config.options.workers, 3);
}

#[then("an empty feature collection is written")]
fn empty_collection_written(#[from(world)] world: &AssembleWorld) {
    let borrowed = world.run_result.borrow();
    let summary = borrowed
        .as_ref()
        .expect("run recorded")
        .as_ref()
        .expect("run succeeded");
    assert_eq!(summary.built, 0);
    let written = std::fs::read_to_string(world.config().output).expect("output written");
    assert!(written.contains("\"features\":[]"), "unexpected output {written}");
}

macro_rules! register_assemble_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/assemble_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: AssembleWorld) {
            let _ = world;
        }
    };
}

register_assemble_scenario!(cli_flag_selection, "selecting the extract via CLI flags");
register_assemble_scenario!(rejecting_missing_args, "rejecting a missing extract flag");
register_assemble_scenario!(
    layering_cli_config_env,
    "layering CLI, config file, and environment values"
);
register_assemble_scenario!(assembling_empty_extract, "assembling an empty extract");
