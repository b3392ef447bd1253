//! Case lookup by CNR.

use std::fmt::Write as _;

use ecourt_api::CaseHistory;
use ecourt_core::html;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

pub async fn handle(ctx: &Context, cnr: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let cnr = cnr.trim();
    if cnr.is_empty() {
        return Err(CliError::Validation {
            field: "cnr".into(),
            reason: "CNR must not be empty".into(),
        });
    }

    let history = ctx
        .client
        .get_case_details(cnr)
        .await?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "case".into(),
            identifier: cnr.into(),
            hint: "Check the 16-character CNR printed on the case papers.".into(),
        })?;

    let out = output::render_single(&global.output, &history, render_detail, |h| {
        h.cino.clone().unwrap_or_else(|| cnr.to_owned())
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_detail(h: &CaseHistory) -> String {
    let status = if h.is_active() { "Pending" } else { "Disposed" };
    let fields = [
        ("CNR", h.cino.clone()),
        ("Case type", h.type_name.clone()),
        ("Filing", number_year(h.fil_no.as_ref(), h.fil_year.as_ref())),
        ("Registration", number_year(h.reg_no.as_ref(), h.reg_year.as_ref())),
        ("Filed on", h.date_of_filing.clone()),
        ("Registered on", h.dt_regis.clone()),
        ("First hearing", h.date_first_list.clone()),
        ("Next hearing", h.date_next_list.clone()),
        ("Decided on", h.date_of_decision.clone()),
        ("Purpose", h.purpose_name.clone()),
        ("Status", Some(status.to_owned())),
        ("Court", court_line(h)),
        ("District", h.district_name.clone()),
        ("State", h.state_name.clone()),
        ("Petitioner", h.pet_name.as_deref().map(html::strip_tags)),
        ("Petitioner advocate", h.pet_adv.as_deref().map(html::strip_tags)),
        ("Respondent", h.res_name.as_deref().map(html::strip_tags)),
        ("Respondent advocate", h.res_adv.as_deref().map(html::strip_tags)),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            let _ = writeln!(out, "{label:<20} {value}");
        }
    }

    for (title, table) in [
        ("Acts", h.act.as_deref()),
        ("Hearings", h.history_of_case_hearing.as_deref()),
    ] {
        let rows: Vec<Vec<String>> = table
            .map(html::table_rows)
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.cells)
            .collect();
        if !rows.is_empty() {
            let _ = write!(out, "\n{title}\n{}\n", output::render_ragged_table(&rows));
        }
    }
    out.trim_end().to_owned()
}

fn number_year(number: Option<&String>, year: Option<&String>) -> Option<String> {
    match (number, year) {
        (Some(n), Some(y)) => Some(format!("{n}/{y}")),
        (Some(n), None) => Some(n.clone()),
        _ => None,
    }
}

fn court_line(h: &CaseHistory) -> Option<String> {
    let name = h.court_name.as_deref().or(h.desgname.as_deref())?;
    Some(match h.court_no.as_deref() {
        Some(no) => format!("{name} (court {no})"),
        None => name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_view_skips_missing_fields() {
        let history = CaseHistory {
            cino: Some("UPBL060053572018".into()),
            reg_no: Some("412".into()),
            reg_year: Some("2018".into()),
            archive: Some("N".into()),
            pet_name: Some("Ram <b>Kumar</b>".into()),
            ..CaseHistory::default()
        };
        let out = render_detail(&history);
        assert!(out.contains("412/2018"));
        assert!(out.contains("Pending"));
        assert!(out.contains("Ram Kumar"));
        assert!(!out.contains("Next hearing"));
    }

    #[test]
    fn hearing_table_is_rendered() {
        let history = CaseHistory {
            history_of_case_hearing: Some(
                "<table><tr><th>Date</th><th>Purpose</th></tr>\
                 <tr><td>07-03-2024</td><td>Evidence</td></tr></table>"
                    .into(),
            ),
            ..CaseHistory::default()
        };
        let out = render_detail(&history);
        assert!(out.contains("Hearings"));
        assert!(out.contains("Evidence"));
        assert!(out.contains("Disposed"));
    }
}
