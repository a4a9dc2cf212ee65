use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use anyhow::{Context, Result};
use patchorder_ledger::AppliedPatchRecord;
use serde::Serialize;

use crate::plan::OrderDirection;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

#[derive(Debug, Serialize)]
struct OrderReport<'a> {
    direction: &'a str,
    patches: &'a [String],
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// Plain output is one patch name per line so it can be piped.
pub(crate) fn format_order_lines(
    direction: OrderDirection,
    patches: &[String],
    style: OutputStyle,
) -> Vec<String> {
    match style {
        OutputStyle::Plain => patches.to_vec(),
        OutputStyle::Rich => {
            let mut lines = Vec::with_capacity(patches.len() + 1);
            let title = format!("== {} order ({} patches) ==", direction.as_str(), patches.len());
            lines.push(colorize(section_style(), &title));
            if patches.is_empty() {
                lines.push("nothing to do".to_string());
            }
            let width = patches.len().to_string().len();
            for (index, patch) in patches.iter().enumerate() {
                let position = format!("{:>width$}.", index + 1);
                lines.push(format!("{} {patch}", colorize(index_style(), &position)));
            }
            lines
        }
    }
}

pub(crate) fn render_order_json(direction: OrderDirection, patches: &[String]) -> Result<String> {
    serde_json::to_string_pretty(&OrderReport {
        direction: direction.as_str(),
        patches,
    })
    .context("failed serializing patch order")
}

pub(crate) fn format_alias_lines(aliases: &[(String, String)]) -> Vec<String> {
    aliases
        .iter()
        .map(|(alias, patch)| format!("{alias} -> {patch}"))
        .collect()
}

pub(crate) fn format_applied_lines(records: &[AppliedPatchRecord]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            format!(
                "{}\t{}\t{}",
                record.name, record.category, record.applied_at_unix
            )
        })
        .collect()
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn index_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::BrightCyan.into()))
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
