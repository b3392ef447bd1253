//! Single-court cause list handler.

use chrono::NaiveDate;
use serde::Serialize;

use ecourt_api::{CauseListCriteria, CauseListType};
use ecourt_core::{ExportHeader, RowKind, TableRow, export, html};

use crate::cli::{CauseListArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

/// Structured-output shape of a fetched list.
#[derive(Serialize)]
struct CauseListView<'a> {
    court_code: &'a str,
    court_number: &'a str,
    cause_list_type: CauseListType,
    date: NaiveDate,
    has_data: bool,
    rows: Vec<TableRow>,
    html: &'a str,
}

pub async fn handle(
    ctx: &Context,
    args: CauseListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let date = util::parse_date(args.date.as_deref())?;
    let criteria = CauseListCriteria {
        state_code: args.state,
        district_code: args.district,
        court_code: args.court_code,
        court_number: args.court_number,
        cause_list_type: args.list_type.into(),
        date,
    };

    let Some(list) = ctx.client.get_cause_list(&criteria).await? else {
        if !global.quiet {
            eprintln!(
                "No cause list for court {} / {} on {}",
                criteria.court_code,
                criteria.court_number,
                date.format("%d-%m-%Y")
            );
        }
        return Ok(());
    };

    if let Some(path) = args.save {
        let court_name = args
            .court_name
            .unwrap_or_else(|| format!("Court {}", criteria.court_number));
        let header = ExportHeader {
            court_name: &court_name,
            date,
            cause_list_type: criteria.cause_list_type,
        };
        std::fs::write(&path, export::render_document(&header, &list.html)).map_err(
            |source| CliError::Export {
                path: path.display().to_string(),
                source,
            },
        )?;
        if !global.quiet {
            eprintln!("✓ Saved cause list to {}", path.display());
        }
    }

    let view = CauseListView {
        court_code: &criteria.court_code,
        court_number: &criteria.court_number,
        cause_list_type: criteria.cause_list_type,
        date,
        has_data: html::has_table_data(&list.html),
        rows: html::table_rows(&list.html),
        html: &list.html,
    };
    let out = output::render_single(&global.output, &view, render_detail, |v| {
        data_rows(v).map(|r| r.cells.join("\t")).collect::<Vec<_>>().join("\n")
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn data_rows<'v>(view: &'v CauseListView<'_>) -> impl Iterator<Item = &'v TableRow> {
    view.rows.iter().filter(|r| r.kind == RowKind::Data)
}

fn render_detail(view: &CauseListView<'_>) -> String {
    if !view.has_data {
        return format!(
            "No cases listed ({} list, {})",
            view.cause_list_type,
            view.date.format("%d-%m-%Y")
        );
    }
    let rows: Vec<Vec<String>> = view.rows.iter().map(|r| r.cells.clone()).collect();
    let count = data_rows(view).count();
    format!(
        "{}\n{count} case(s) listed",
        output::render_ragged_table(&rows)
    )
}
