//! `bgrid run | validate | inspect`: bill reconciliation commands.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tracing::info;

use billgrid_recon::config::SheetLayout;
use billgrid_recon::{build_sheets, run, BillInput, ReconConfig, ReconResult, SheetKind, SheetSet};

use crate::exit_codes::{EXIT_ERROR, EXIT_INPUT_SHAPE, EXIT_ROW_WARNINGS};
use crate::CliError;

pub struct RunArgs {
    pub input: PathBuf,
    pub config: PathBuf,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub sheets: Vec<String>,
    pub strict: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(&args.config)?;
    let selected = select_sheets(&args.sheets)?;

    let input = load_input(&args.input, &config)?;
    let result = run(&config, &input)?;
    let sheet_set = build_sheets(&result, &config.context)?;

    let package = package_json(&result, &sheet_set, &selected);
    let json_str = serde_json::to_string_pretty(&package)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref dir) = args.out_dir {
        write_sheet_files(dir, &sheet_set, &selected)?;
    }

    if args.json {
        println!("{json_str}");
    }

    print_summary(&result);

    if args.strict && !result.warnings.is_empty() {
        return Err(CliError::new(
            EXIT_ROW_WARNINGS,
            format!("{} row(s) skipped as malformed", result.warnings.len()),
        )
        .with_hint("each skipped row is listed under \"warnings\" in the JSON package"));
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!("valid: \"{}\"", config.name);
    eprintln!(
        "  premium: {}% {}  first bill: {}",
        config.context.premium_percent, config.context.premium_type, config.context.is_first_bill
    );
    for (role, sheet) in layout_roles(&config) {
        eprintln!(
            "  {role:<14} sheet \"{}\", data from row {}",
            sheet.sheet,
            sheet.header_rows + 1
        );
    }
    Ok(())
}

pub fn cmd_inspect(workbook: PathBuf, config_path: Option<PathBuf>, json_output: bool) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => load_config(&path)?,
        None => ReconConfig::default(),
    };
    let stats = billgrid_io::inspect(&workbook)?;

    let expected: Vec<(&str, &SheetLayout, bool)> = layout_roles(&config)
        .into_iter()
        .map(|(role, layout)| (role, layout, stats.iter().any(|s| s.name == layout.sheet)))
        .collect();

    if json_output {
        let sheets: Vec<Value> = stats
            .iter()
            .enumerate()
            .map(|(index, s)| {
                json!({
                    "index": index,
                    "name": s.name,
                    "rows": s.rows,
                    "cols": s.cols,
                    "non_empty_cells": s.cells_imported,
                    "error_cells": s.errors_blanked,
                })
            })
            .collect();
        let roles: Vec<Value> = expected
            .iter()
            .map(|(role, layout, found)| json!({ "role": role, "sheet": layout.sheet, "found": found }))
            .collect();
        let out = json!({ "sheets": sheets, "expected": roles });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    } else {
        println!("{:<4} {:<24} {:>6} {:>5} {:>7}", "#", "sheet", "rows", "cols", "cells");
        for (index, s) in stats.iter().enumerate() {
            println!("{:<4} {:<24} {:>6} {:>5} {:>7}", index, s.name, s.rows, s.cols, s.cells_imported);
        }
        println!();
        for (role, layout, found) in &expected {
            let mark = if *found { "found" } else { "MISSING" };
            println!("{role:<14} \"{}\" {mark}", layout.sheet);
        }
    }

    // Extra Items is optional; the other two are not.
    let missing: Vec<&str> = expected
        .iter()
        .filter(|(role, _, found)| !found && *role != "extra_items")
        .map(|(_, layout, _)| layout.sheet.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(CliError::new(
            EXIT_INPUT_SHAPE,
            format!("required sheet(s) not in workbook: {}", missing.join(", ")),
        )
        .with_hint("set [layout.*].sheet in the bill config to the workbook's sheet names"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    Ok(ReconConfig::from_toml(&config_str)?)
}

fn layout_roles(config: &ReconConfig) -> [(&'static str, &SheetLayout); 3] {
    let layout = &config.layout;
    [
        ("work_order", &layout.work_order),
        ("bill_quantity", &layout.bill_quantity),
        ("extra_items", &layout.extra_items),
    ]
}

/// Empty selection means every sheet.
fn select_sheets(names: &[String]) -> Result<Vec<SheetKind>, CliError> {
    if names.is_empty() {
        return Ok(SheetKind::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            SheetKind::from_name(name).ok_or_else(|| {
                let available: Vec<&str> = SheetKind::ALL.iter().map(|k| k.name()).collect();
                CliError::args(format!("unknown sheet: \"{name}\""))
                    .with_hint(format!("available sheets: {}", available.join(", ")))
            })
        })
        .collect()
}

fn file_slug(sheet_name: &str) -> String {
    sheet_name.trim().to_lowercase().replace(' ', "_")
}

/// A directory holds one CSV per sheet; anything else is opened as a workbook.
fn load_input(path: &Path, config: &ReconConfig) -> Result<BillInput, CliError> {
    let names: Vec<&str> = layout_roles(config).into_iter().map(|(_, l)| l.sheet.as_str()).collect();

    if path.is_dir() {
        let files: Vec<(&str, PathBuf)> = names
            .iter()
            .map(|name| (*name, path.join(format!("{}.csv", file_slug(name)))))
            .filter(|(_, file)| file.exists())
            .collect();
        info!(dir = %path.display(), sheets = files.len(), "loading CSV sheets");
        return Ok(billgrid_io::load_csv_sheets(&files)?);
    }

    if !path.exists() {
        return Err(CliError::io(format!("input not found: {}", path.display())));
    }
    let import = billgrid_io::load_workbook(path, &names)?;
    info!("{}", import.summary());
    Ok(import.input)
}

fn package_json(result: &ReconResult, sheet_set: &SheetSet, selected: &[SheetKind]) -> Value {
    let mut sheets = Map::new();
    for payload in &sheet_set.sheets {
        if selected.contains(&payload.sheet) {
            sheets.insert(payload.sheet.slug(), payload.data.clone());
        }
    }
    json!({
        "result": result,
        "sheets": sheets,
    })
}

fn write_sheet_files(dir: &Path, sheet_set: &SheetSet, selected: &[SheetKind]) -> Result<(), CliError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", dir.display())))?;

    for payload in sheet_set.sheets.iter().filter(|p| selected.contains(&p.sheet)) {
        let path = dir.join(format!("{}.json", payload.sheet.slug()));
        let body = serde_json::to_string_pretty(&payload.data)
            .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))?;
        std::fs::write(&path, body)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    }
    eprintln!("wrote {} sheet(s) to {}", selected.len(), dir.display());
    Ok(())
}

fn print_summary(result: &ReconResult) {
    let s = &result.deviation.summary;
    let direction = if s.net_difference >= 0.0 { "excess" } else { "saving" };
    eprintln!(
        "{}: {} work order item(s), {} extra item(s), {} row(s) skipped",
        result.meta.config_name,
        result.current_bill.items.len(),
        result.extra_items.len(),
        result.warnings.len(),
    );
    eprintln!(
        "  work order {:.2}  executed {:.2}  net {} {:.2}  work done {:.2}%",
        s.grand_total_f,
        s.grand_total_h,
        direction,
        s.net_difference.abs(),
        result.notes.percentage_work_done,
    );
}
