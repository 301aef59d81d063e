//! Command dispatch

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{
    export_element, load_document, render_document, to_display_tree, write_document,
    ApplicationError, IoResultExt, LabeledTree,
};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_dir, global_config_path, local_config_path, Settings};
use crate::domain::{NodeId, SchemeKind, TreeArena};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let config_dir = cli
        .config_dir
        .clone()
        .or_else(|| std::env::current_dir().ok());

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => cmd_config(command, config_dir.as_deref()),
        Some(command) => {
            let settings = Settings::load(config_dir.as_deref())?;
            debug!(?settings, "effective settings");
            match command {
                Commands::Label {
                    file,
                    scheme,
                    output,
                } => cmd_label(&settings, file, *scheme, output.as_deref()),
                Commands::Tree { file, scheme } => cmd_tree(&settings, file, *scheme),
                Commands::Query {
                    file,
                    pattern,
                    scheme,
                } => cmd_query(&settings, file, pattern, *scheme),
                Commands::Insert {
                    file,
                    at,
                    subtree,
                    scheme,
                    output,
                } => cmd_insert(&settings, file, at, subtree, *scheme, output.as_deref()),
                Commands::Relate {
                    file,
                    first,
                    second,
                    scheme,
                } => cmd_relate(&settings, file, first, second, *scheme),
                Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
            }
        }
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

fn load_labeled(settings: &Settings, file: &Path, scheme: Option<SchemeKind>) -> CliResult<LabeledTree> {
    let element = load_document(file)?;
    let scheme = scheme.unwrap_or(settings.scheme);
    Ok(LabeledTree::with_builder(
        &element,
        scheme,
        settings.tree_builder(),
    )?)
}

fn emit(settings: &Settings, labeled: &LabeledTree, output: Option<&Path>) -> CliResult<()> {
    let element = export_element(labeled.tree(), &settings.label_attribute)
        .ok_or_else(|| CliError::InvalidArgs("document has no root element".into()))?;
    match output {
        Some(path) => {
            write_document(path, &element)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&render_document(&element)?),
    }
    Ok(())
}

/// Slash-separated tags from the root down to `id`.
fn node_path(tree: &TreeArena, id: NodeId) -> String {
    let mut chain = tree.ancestors(id);
    chain.reverse();
    chain.push(id);
    chain
        .into_iter()
        .filter_map(|n| tree.get_node(n).map(|node| node.tag().to_string()))
        .join("/")
}

fn first_match(labeled: &LabeledTree, pattern: &str) -> CliResult<NodeId> {
    labeled
        .find(pattern)
        .into_iter()
        .next()
        .ok_or_else(|| ApplicationError::NoMatch(pattern.to_string()).into())
}

#[instrument(skip(settings))]
fn cmd_label(
    settings: &Settings,
    file: &Path,
    scheme: Option<SchemeKind>,
    output: Option<&Path>,
) -> CliResult<()> {
    let labeled = load_labeled(settings, file, scheme)?;
    emit(settings, &labeled, output)
}

#[instrument(skip(settings))]
fn cmd_tree(settings: &Settings, file: &Path, scheme: Option<SchemeKind>) -> CliResult<()> {
    let labeled = load_labeled(settings, file, scheme)?;
    output::header(&format!("{} ({} nodes)", labeled.scheme(), labeled.tree().len()));
    output::info(&to_display_tree(labeled.tree()));
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_query(
    settings: &Settings,
    file: &Path,
    pattern: &str,
    scheme: Option<SchemeKind>,
) -> CliResult<()> {
    let labeled = load_labeled(settings, file, scheme)?;
    let found = labeled.find(pattern);
    if found.is_empty() {
        return Err(ApplicationError::NoMatch(pattern.to_string()).into());
    }
    for id in found {
        let label = labeled
            .label(id)
            .map(ToString::to_string)
            .unwrap_or_default();
        output::labeled(&label, &node_path(labeled.tree(), id));
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_insert(
    settings: &Settings,
    file: &Path,
    at: &str,
    subtree: &Path,
    scheme: Option<SchemeKind>,
    output: Option<&Path>,
) -> CliResult<()> {
    let mut labeled = load_labeled(settings, file, scheme)?;
    let element = load_document(subtree)?;
    let inserted = labeled.insert_at(at, &element)?;
    if let Some(label) = labeled.label(inserted) {
        debug!(label = %label, "inserted subtree root");
    }
    emit(settings, &labeled, output)
}

#[instrument(skip(settings))]
fn cmd_relate(
    settings: &Settings,
    file: &Path,
    first: &str,
    second: &str,
    scheme: Option<SchemeKind>,
) -> CliResult<()> {
    let labeled = load_labeled(settings, file, scheme)?;
    let a = first_match(&labeled, first)?;
    let b = first_match(&labeled, second)?;

    let yes_no = |v: Option<bool>| match v {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    };
    let order = match labeled.compare(a, b) {
        Some(Ordering::Less) => "first precedes second",
        Some(Ordering::Greater) => "second precedes first",
        Some(Ordering::Equal) => "same position",
        None => "not decidable from labels",
    };

    output::header(&labeled.scheme());
    for id in [a, b] {
        let label = labeled.label(id).map(ToString::to_string).unwrap_or_default();
        output::labeled(&label, &node_path(labeled.tree(), id));
    }
    output::detail(&format!("first contains second: {}", yes_no(labeled.is_ancestor(a, b))));
    output::detail(&format!("second contains first: {}", yes_no(labeled.is_ancestor(b, a))));
    output::detail(&format!("document order: {}", order));
    if labeled.scheme() == SchemeKind::PrimeProduct {
        output::warning("prime-product labels do not distinguish siblings");
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, config_dir: Option<&Path>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(config_dir)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config location on this platform"),
            }
            if let Some(dir) = config_dir {
                output::action("local", &local_config_path(dir).display());
            }
        }
        ConfigCommands::Init { global } => {
            let path: PathBuf = if *global {
                let dir = global_config_dir().ok_or_else(|| {
                    CliError::Usage("no global config location on this platform".into())
                })?;
                std::fs::create_dir_all(&dir).with_path_context("create config dir", &dir)?;
                dir.join("xlabel.toml")
            } else {
                let dir = config_dir
                    .ok_or_else(|| CliError::InvalidArgs("no directory for local config".into()))?;
                local_config_path(dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            std::fs::write(&path, Settings::template()).with_path_context("write config", &path)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}
