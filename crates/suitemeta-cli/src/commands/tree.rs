use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use suitemeta_suite::{build_trees, Module, ModuleForest};

use crate::common::{load_config, load_reactor};
use crate::GlobalOpts;

/// Print the suites found among the reactor's plugin modules
#[derive(Args, Debug, Clone, Default)]
pub struct TreeCommand {
    /// Reactor description (default: ./reactor.toml)
    #[arg(short, long)]
    pub reactor: Option<PathBuf>,

    /// Print the suites as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_tree(cmd: TreeCommand, _opts: &GlobalOpts) -> anyhow::Result<()> {
    let config = load_config();
    let reactor = load_reactor(cmd.reactor.as_deref())?;
    let forest = build_trees(reactor.plugin_modules(&config.get_packaging()))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&forest_json(&forest))?);
    } else {
        print!("{}", render(&forest));
    }
    Ok(())
}

fn forest_json(forest: &ModuleForest<'_>) -> serde_json::Value {
    let suites: Vec<serde_json::Value> = forest
        .trees()
        .map(|tree| {
            json!({
                "root": tree.root().id.to_string(),
                "children": tree.children().map(|m| m.id.to_string()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "suites": suites })
}

fn label(module: &Module) -> String {
    match module.name.as_deref() {
        Some(name) => format!("{} ({})", module.id, name),
        None => module.id.to_string(),
    }
}

fn render(forest: &ModuleForest<'_>) -> String {
    let mut out = String::new();
    for tree in forest.trees() {
        out.push_str(&format!("{}\n", label(tree.root()).bold()));
        let children: Vec<&Module> = tree.children().collect();
        for (idx, child) in children.iter().enumerate() {
            let branch = if idx + 1 == children.len() {
                "└──"
            } else {
                "├──"
            };
            out.push_str(&format!("{} {}\n", branch, label(child)));
        }
    }
    out
}
