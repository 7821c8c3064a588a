#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;

use dlms_contracts::master::ItemKind;
use dlms_contracts::s156::S156Id;
use dlms_core::service::DlmsService;
use dlms_core::session::SessionContext;

const ITEM_ADD_USAGE: &str = "item add <name> | <ledger> | <folio> | <Permanent|Consumable>";
const DEPT_ADD_USAGE: &str = "dept add <name>";
const RAISE_USAGE: &str = "raise <item> | <department> | <qty>";
const ISSUE_USAGE: &str = "issue <item> | <department> | <qty>";

pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("DLMS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg_data_home) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("dlms");
    }
    if let Ok(home) = env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share").join("dlms");
    }
    PathBuf::from("dlms_data")
}

/// Execute one menu command against the session's service. The Ok
/// string is what the shell prints; Err is a recoverable message and
/// the session continues either way.
pub fn execute_command(
    service: &mut DlmsService,
    session: &SessionContext,
    line: &str,
) -> Result<String, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    match command {
        "help" => Ok(help_text()),
        "items" => {
            let kind = parse_kind_filter(rest)?;
            Ok(render_items(service, kind))
        }
        "item" => {
            let fields = subcommand_fields(rest, "add", 4, ITEM_ADD_USAGE)?;
            let kind = ItemKind::parse(&fields[3])
                .ok_or_else(|| format!("unknown item type '{}'. usage: {ITEM_ADD_USAGE}", fields[3]))?;
            service
                .register_item(session.role, &fields[0], &fields[1], &fields[2], kind)
                .map_err(|e| e.to_string())?;
            Ok("Item Added".to_string())
        }
        "depts" => Ok(render_departments(service)),
        "dept" => {
            let fields = subcommand_fields(rest, "add", 1, DEPT_ADD_USAGE)?;
            service
                .register_department(session.role, &fields[0])
                .map_err(|e| e.to_string())?;
            Ok("Department Added".to_string())
        }
        "raise" => {
            let fields = split_fields(rest, 3, RAISE_USAGE)?;
            let quantity = parse_quantity(&fields[2])?;
            let record = service
                .raise_request(session.role, &fields[0], &fields[1], quantity)
                .map_err(|e| e.to_string())?;
            Ok(format!("S-156 Raised ({})", record.request_id.as_str()))
        }
        "approvals" | "requests" => Ok(render_requests(service)),
        "approve" => {
            if rest.is_empty() {
                return Err("usage: approve <request_id>".to_string());
            }
            let request_id = S156Id::new(rest).map_err(|e| e.to_string())?;
            let outcome = service
                .advance(session.role, &request_id)
                .map_err(|e| e.to_string())?;
            Ok(format!(
                "Request {} -> {}",
                outcome.request.request_id.as_str(),
                outcome.request.status.as_str()
            ))
        }
        "ledger" => Ok(render_ledger(service)),
        "pll" => Ok(render_loan_ledger(service)),
        "summary" => Ok(render_summary(service)),
        "issue" => {
            let fields = split_fields(rest, 3, ISSUE_USAGE)?;
            let quantity = parse_quantity(&fields[2])?;
            service
                .record_issue(session.role, &fields[0], &fields[1], quantity)
                .map_err(|e| e.to_string())?;
            Ok("Summary Updated".to_string())
        }
        "" => Err("type 'help' for the menu".to_string()),
        other => Err(format!("unknown command: {other}. type 'help' for the menu")),
    }
}

fn help_text() -> String {
    format!(
        "items [Permanent|Consumable]   list registered items\n\
         {ITEM_ADD_USAGE}   register an item (Store)\n\
         depts   list departments\n\
         {DEPT_ADD_USAGE}   register a department (Store)\n\
         {RAISE_USAGE}   raise an S-156 issue (Store)\n\
         approvals   list S-156 requests\n\
         approve <request_id>   advance a request (Department/Admin)\n\
         ledger   issue ledger\n\
         pll   permanent loan ledger\n\
         summary   consumable issue summary\n\
         {ISSUE_USAGE}   record a consumable issue (Store)\n\
         quit   end the session"
    )
}

fn parse_kind_filter(rest: &str) -> Result<Option<ItemKind>, String> {
    if rest.is_empty() {
        return Ok(None);
    }
    ItemKind::parse(rest)
        .map(Some)
        .ok_or_else(|| format!("unknown item type '{rest}'. expected Permanent or Consumable"))
}

fn subcommand_fields(
    rest: &str,
    subcommand: &str,
    expected: usize,
    usage: &str,
) -> Result<Vec<String>, String> {
    let Some((first, fields_raw)) = split_first_word(rest) else {
        return Err(format!("usage: {usage}"));
    };
    if first != subcommand {
        return Err(format!("usage: {usage}"));
    }
    split_fields(fields_raw, expected, usage)
}

fn split_first_word(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim())),
        None => Some((raw, "")),
    }
}

fn split_fields(raw: &str, expected: usize, usage: &str) -> Result<Vec<String>, String> {
    let fields: Vec<String> = raw.split('|').map(|f| f.trim().to_string()).collect();
    if raw.trim().is_empty() || fields.len() != expected {
        return Err(format!("usage: {usage}"));
    }
    Ok(fields)
}

fn parse_quantity(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(quantity) if quantity >= 1 => Ok(quantity),
        _ => Err(format!("quantity must be a positive integer, got '{raw}'")),
    }
}

fn render_items(service: &DlmsService, kind: Option<ItemKind>) -> String {
    let rows: Vec<Vec<String>> = service
        .items(kind)
        .iter()
        .map(|item| {
            vec![
                item.item.as_str().to_string(),
                item.folio.ledger.clone(),
                item.folio.folio.clone(),
                item.kind.as_str().to_string(),
            ]
        })
        .collect();
    render_table(&["Item", "Ledger", "Folio", "Type"], rows)
}

fn render_departments(service: &DlmsService) -> String {
    let rows: Vec<Vec<String>> = service
        .departments()
        .iter()
        .map(|d| vec![d.department.as_str().to_string()])
        .collect();
    render_table(&["Department"], rows)
}

fn render_requests(service: &DlmsService) -> String {
    let rows: Vec<Vec<String>> = service
        .requests()
        .iter()
        .enumerate()
        .map(|(row, r)| {
            vec![
                row.to_string(),
                r.request_id.as_str().to_string(),
                r.item.as_str().to_string(),
                r.department.as_str().to_string(),
                r.quantity.to_string(),
                r.status.as_str().to_string(),
            ]
        })
        .collect();
    render_table(
        &["Row", "Request", "Item", "Department", "Qty", "Status"],
        rows,
    )
}

fn render_ledger(service: &DlmsService) -> String {
    let rows: Vec<Vec<String>> = service
        .ledger()
        .iter()
        .map(|e| {
            vec![
                e.item.as_str().to_string(),
                e.department.as_str().to_string(),
                e.quantity.to_string(),
            ]
        })
        .collect();
    render_table(&["Item", "Department", "Qty"], rows)
}

fn render_loan_ledger(service: &DlmsService) -> String {
    let rows: Vec<Vec<String>> = service
        .loan_ledger()
        .iter()
        .map(|e| {
            vec![
                e.department.as_str().to_string(),
                e.item.as_str().to_string(),
                e.quantity.to_string(),
            ]
        })
        .collect();
    render_table(&["Department", "Item", "Qty"], rows)
}

fn render_summary(service: &DlmsService) -> String {
    let rows: Vec<Vec<String>> = service
        .summary()
        .iter()
        .map(|e| {
            vec![
                e.item.as_str().to_string(),
                e.department.as_str().to_string(),
                e.quantity.to_string(),
            ]
        })
        .collect();
    render_table(&["Item", "Department", "Qty"], rows)
}

fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (col, cell) in row.iter().enumerate() {
            if cell.len() > widths[col] {
                widths[col] = cell.len();
            }
        }
    }
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.iter().map(|h| h.to_string()), &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(format_row(row.into_iter(), &widths));
    }
    lines.join("\n")
}

fn format_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
