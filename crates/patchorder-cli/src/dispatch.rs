use std::io::Write;

use anyhow::{Context, Result};
use patchorder_core::load_manifest;
use patchorder_ledger::PatchHistory;

use crate::completion::write_completions_script;
use crate::plan::{
    collect_aliases, parse_patch_arguments, plan_patch_order, resolve_mark_category,
    selected_categories, OrderDirection,
};
use crate::render::{
    current_output_style, format_alias_lines, format_applied_lines, format_order_lines,
    render_order_json,
};
use crate::{Cli, CliPatchCategory, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::InstallOrder {
            category,
            arguments,
            json,
        } => print_order(&cli, OrderDirection::Install, *category, arguments, *json)?,
        Commands::UninstallOrder {
            category,
            arguments,
            json,
        } => print_order(&cli, OrderDirection::Uninstall, *category, arguments, *json)?,
        Commands::Aliases {
            category,
            arguments,
        } => {
            let manifest = load_manifest(&cli.manifest)?;
            let arguments = parse_patch_arguments(arguments)?;
            let aliases = collect_aliases(&manifest, &selected_categories(*category), &arguments)?;
            for line in format_alias_lines(&aliases) {
                println!("{line}");
            }
        }
        Commands::MarkApplied { name, category } => {
            let manifest = load_manifest(&cli.manifest)?;
            let category = resolve_mark_category(&manifest, name, *category)?;
            let history = PatchHistory::new(&cli.state_root);
            if history.mark_applied(name, category)? {
                println!("marked applied: {name}");
            } else {
                println!("already applied: {name}");
            }
        }
        Commands::Unmark { name } => {
            let history = PatchHistory::new(&cli.state_root);
            if history.unmark(name)? {
                println!("unmarked: {name}");
            } else {
                println!("not applied: {name}");
            }
        }
        Commands::Applied => {
            let history = PatchHistory::new(&cli.state_root);
            for line in format_applied_lines(&history.list()?) {
                println!("{line}");
            }
        }
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout().lock();
            write_completions_script(*shell, &mut stdout)?;
            stdout
                .flush()
                .with_context(|| "failed flushing completion script")?;
        }
    }

    Ok(())
}

fn print_order(
    cli: &Cli,
    direction: OrderDirection,
    category: Option<CliPatchCategory>,
    arguments: &[String],
    json: bool,
) -> Result<()> {
    let manifest = load_manifest(&cli.manifest)?;
    let arguments = parse_patch_arguments(arguments)?;
    let ledger = PatchHistory::new(&cli.state_root).applied_names()?;
    let order = plan_patch_order(
        &manifest,
        &ledger,
        &selected_categories(category),
        &arguments,
        direction,
    )?;

    if json {
        println!("{}", render_order_json(direction, &order)?);
        return Ok(());
    }

    for line in format_order_lines(direction, &order, current_output_style()) {
        println!("{line}");
    }
    Ok(())
}
