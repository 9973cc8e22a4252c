//! `encap` command line
//!
//! Reads a project snapshot (resolved declarations plus module texts, as
//! JSON), encapsulates one or more fields of a module and either prints the
//! preview or writes the changed modules to a directory.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use encap_refactor::prelude::*;
use encap_refactor::CandidateFactory;
use encap_source::{
    DeclarationFinder as _, ProjectSnapshot, QualifiedModuleName, RewritingManager, SourceStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("encap")
        .version(encap_refactor::VERSION)
        .about("Encapsulate module fields behind properties")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs to stderr as JSON"),
        )
        .subcommand(target_args(
            Command::new("preview").about("Print the target module with every change applied"),
        ))
        .subcommand(
            target_args(Command::new("apply").about("Commit the changes and write the touched modules"))
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory receiving <Module>.bas for every written module"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the outcome as JSON"),
                ),
        )
        .subcommand(
            Command::new("candidates")
                .about("List the fields of a module with their proposed names")
                .arg(project_arg())
                .arg(config_arg())
                .arg(strategy_arg())
                .arg(
                    Arg::new("module")
                        .long("module")
                        .required(true)
                        .help("Module component name"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn project_arg() -> Arg {
    Arg::new("project")
        .long("project")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Project snapshot (JSON)")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Refactoring configuration (TOML)")
}

fn strategy_arg() -> Arg {
    Arg::new("strategy")
        .long("strategy")
        .value_parser(value_parser!(StrategyKind))
        .help("use-backing-fields or convert-fields-to-record-members")
}

fn target_args(command: Command) -> Command {
    command
        .arg(project_arg())
        .arg(config_arg())
        .arg(strategy_arg())
        .arg(
            Arg::new("target")
                .long("target")
                .required(true)
                .help("Field to encapsulate, as Module.field"),
        )
        .arg(
            Arg::new("also")
                .long("also")
                .action(ArgAction::Append)
                .help("Another field of the same module to encapsulate"),
        )
        .arg(
            Arg::new("property")
                .long("property")
                .help("Property name for the target"),
        )
        .arg(
            Arg::new("read-only")
                .long("read-only")
                .action(ArgAction::SetTrue)
                .help("Generate only a Property Get for the target"),
        )
        .arg(
            Arg::new("state-record")
                .long("state-record")
                .help("Field holding the state record to extend"),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Snapshot, rewriting manager and configuration for one invocation
struct Workspace {
    snapshot: ProjectSnapshot,
    manager: RewritingManager,
    config: EncapsulateConfig,
}

impl Workspace {
    fn load(args: &ArgMatches) -> Result<Self> {
        let path = args.get_one::<PathBuf>("project").context("--project is required")?;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let snapshot = ProjectSnapshot::from_json(&json)
            .with_context(|| format!("invalid project snapshot {}", path.display()))?;

        let mut config = match args.get_one::<PathBuf>("config") {
            Some(path) => EncapsulateConfig::load(path)?,
            None => EncapsulateConfig::default(),
        };
        if let Some(strategy) = args.get_one::<StrategyKind>("strategy") {
            config.default_strategy = *strategy;
        }

        let store = SourceStore::from_sources(
            snapshot
                .sources
                .iter()
                .map(|source| (source.module.clone(), source.text.clone())),
        );
        tracing::debug!(
            project = %path.display(),
            modules = snapshot.sources.len(),
            declarations = snapshot.declarations.len(),
            "snapshot loaded"
        );
        Ok(Self {
            snapshot,
            manager: RewritingManager::new(Arc::new(store)),
            config,
        })
    }

    fn refactoring(&self) -> EncapsulateFieldRefactoring<'_> {
        EncapsulateFieldRefactoring::new(&self.snapshot.declarations, &self.manager, self.config.clone())
    }
}

/// Initialize the model for `--target` and apply every interactive option
fn build_model<'a>(
    refactoring: &EncapsulateFieldRefactoring<'a>,
    args: &ArgMatches,
) -> Result<EncapsulationModel<'a>> {
    let spec = args.get_one::<String>("target").context("--target is required")?;
    let Some((component, field)) = spec.split_once('.') else {
        bail!("--target must be Module.field, got '{spec}'");
    };
    let target = refactoring.target_named(component, field)?;
    let also: Vec<TargetId> = args
        .get_many::<String>("also")
        .into_iter()
        .flatten()
        .map(|name| TargetId::field(target.module().clone(), name))
        .collect();
    let property = args.get_one::<String>("property").cloned();
    let state_record = args.get_one::<String>("state-record");
    let read_only = args.get_flag("read-only");

    let mut unknown = Vec::new();
    let model = refactoring.initialize_with(&target, |model| {
        if let Some(name) = state_record {
            if !model.select_state_record(name) {
                tracing::warn!(state_record = %name, "no such state record, using the synthesized one");
            }
        }
        for id in &also {
            if !model.set_encapsulate_flag(id, true) {
                unknown.push(id.to_string());
            }
        }
        if let Some(name) = property {
            model.set_property_identifier(&target, name);
        }
        if read_only {
            model.set_read_only(&target, true);
        }
    })?;
    if !unknown.is_empty() {
        bail!("not fields of {component}: {}", unknown.join(", "));
    }
    Ok(model)
}

fn preview(args: &ArgMatches) -> Result<String> {
    let workspace = Workspace::load(args)?;
    let refactoring = workspace.refactoring();
    let model = build_model(&refactoring, args)?;
    Ok(refactoring.preview(&model)?)
}

fn apply(args: &ArgMatches) -> Result<Vec<PathBuf>> {
    let workspace = Workspace::load(args)?;
    let out_dir = args.get_one::<PathBuf>("out-dir").context("--out-dir is required")?;
    let refactoring = workspace.refactoring();
    let model = build_model(&refactoring, args)?;
    let outcome = refactoring.refactor(&model)?;

    let written = write_modules(&workspace, &outcome.modules, out_dir)?;
    if args.get_flag("json") {
        let report = serde_json::json!({
            "session": outcome.session,
            "modules": outcome.modules,
            "files": written,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for path in &written {
            println!("wrote {}", path.display());
        }
    }
    Ok(written)
}

fn write_modules(
    workspace: &Workspace,
    modules: &[QualifiedModuleName],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(modules.len());
    for module in modules {
        let text = workspace
            .manager
            .store()
            .text(module)
            .with_context(|| format!("module {module} vanished from the store"))?;
        let path = out_dir.join(format!("{}.bas", module.component()));
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn candidates(args: &ArgMatches) -> Result<String> {
    let workspace = Workspace::load(args)?;
    let graph = &workspace.snapshot.declarations;
    let component = args.get_one::<String>("module").context("--module is required")?;
    let module = graph
        .module_named(component)
        .with_context(|| format!("unknown module '{component}'"))?
        .clone();

    let factory = CandidateFactory::new(graph, &workspace.config);
    let model = EncapsulationModel::new(
        graph,
        module.clone(),
        factory.candidates(&module),
        factory.state_records(&module)?,
        workspace.config.clone(),
    );

    let rows: Vec<serde_json::Value> = model
        .candidates()
        .iter()
        .map(|candidate| {
            serde_json::json!({
                "field": candidate.identifier_name(),
                "type": candidate.as_type_name(),
                "property": candidate.property_identifier(),
                "backing": candidate.backing_identifier(),
                "read_write": candidate.can_be_read_write(),
            })
        })
        .collect();
    if args.get_flag("json") {
        return Ok(serde_json::to_string_pretty(&rows)?);
    }
    Ok(model
        .candidates()
        .iter()
        .map(|candidate| {
            format!(
                "{:<24} {:<24} {}",
                candidate.identifier_name(),
                candidate.property_identifier(),
                candidate.backing_identifier()
            )
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("preview", args)) => print!("{}", preview(args)?),
        Some(("apply", args)) => {
            apply(args)?;
        }
        Some(("candidates", args)) => println!("{}", candidates(args)?),
        _ => bail!("unknown command"),
    }
    Ok(())
}
