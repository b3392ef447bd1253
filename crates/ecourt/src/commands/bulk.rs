//! Bulk cause list handler: every court of one complex.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use ecourt_core::bulk::{self, DEFAULT_DELAY};
use ecourt_core::{BulkEvent, BulkRequest, CardStatus, CourtCard, ExportHeader, export};

use crate::cli::{BulkCauseListArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CardRow {
    #[tabled(rename = "Court Code")]
    group: String,
    #[tabled(rename = "No.")]
    number: String,
    #[tabled(rename = "Court")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl CardRow {
    fn new(card: &CourtCard, color: bool) -> Self {
        Self {
            group: card.court.group_code.clone(),
            number: card.court.court_number.clone(),
            name: card.court.display_name.clone(),
            status: output::card_status(&card.status, color),
            detail: match &card.status {
                CardStatus::Failed { message } => message.clone(),
                _ => String::new(),
            },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: BulkCauseListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let date = util::parse_date(args.date.as_deref())?;

    let complex = ctx
        .client
        .list_complexes(&args.state, &args.district)
        .await?
        .into_iter()
        .find(|c| c.complex_code == args.complex)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "complex".into(),
            identifier: args.complex.clone(),
            hint: format!(
                "List the complexes with: ecourt complexes {} {}",
                args.state, args.district
            ),
        })?;

    let delay = args
        .delay_ms
        .or(ctx.profile.bulk_delay_ms)
        .map_or(DEFAULT_DELAY, Duration::from_millis);

    let request = BulkRequest {
        state_code: args.state,
        district_code: args.district,
        complex,
        cause_list_type: args.list_type.into(),
        date,
        delay,
    };

    let progress = if global.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    let report = bulk::run(&ctx.client, &request, |event| match event {
        BulkEvent::Started { total } => {
            progress.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        }
        BulkEvent::Fetching { court, .. } => progress.set_message(court.display_name.clone()),
        BulkEvent::Finished { .. } => progress.inc(1),
    })
    .await?;
    progress.finish_and_clear();

    if let Some(ref dir) = args.out_dir {
        let mut saved = 0usize;
        for card in &report.cards {
            let Some(ref list) = card.cause_list else {
                continue;
            };
            let header = ExportHeader {
                court_name: &card.court.display_name,
                date,
                cause_list_type: request.cause_list_type,
            };
            export::write_document(dir, &header, &list.html)?;
            saved += 1;
        }
        if !global.quiet {
            eprintln!("✓ Saved {saved} cause list(s) to {}", dir.display());
        }
    }

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let rows: Vec<CardRow> = r.cards.iter().map(|c| CardRow::new(c, color)).collect();
            format!(
                "{}\n{} listed, {} empty, {} failed",
                output::render_table(&rows),
                r.listed(),
                r.empty(),
                r.failed()
            )
        },
        |r| {
            r.cards
                .iter()
                .filter(|c| c.status == CardStatus::Listed)
                .map(|c| format!("{} {}", c.court.group_code, c.court.court_number))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
