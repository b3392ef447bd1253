// Bulk cause list
//
// Fetch the cause list of every court in a complex, one court at a time
// with a pause between requests. Each court ends up with a card; a
// failing court is recorded on its card and the batch carries on.

use std::time::Duration;

use chrono::NaiveDate;
use ecourt_api::{
    CauseList, CauseListCriteria, CauseListType, CourtComplex, CourtLookupClient, CourtRecord,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::html;

/// Pause between two consecutive cause-list requests.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// One bulk run: a complex, a list type, and a date.
#[derive(Debug, Clone)]
pub struct BulkRequest {
    pub state_code: String,
    pub district_code: String,
    pub complex: CourtComplex,
    pub cause_list_type: CauseListType,
    pub date: NaiveDate,
    pub delay: Duration,
}

/// Outcome for one court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CardStatus {
    /// The list has at least one case.
    Listed,
    /// The backend answered, but nothing is listed.
    Empty,
    Failed { message: String },
}

/// A court and what its cause list request produced.
#[derive(Debug, Clone, Serialize)]
pub struct CourtCard {
    pub court: CourtRecord,
    #[serde(flatten)]
    pub status: CardStatus,
    /// Kept only for `Listed` cards.
    #[serde(skip)]
    pub cause_list: Option<CauseList>,
}

/// Progress notifications, in order.
#[derive(Debug)]
pub enum BulkEvent<'a> {
    /// The court list is known.
    Started { total: usize },
    /// About to request `court`'s list (`index` is zero-based).
    Fetching {
        index: usize,
        total: usize,
        court: &'a CourtRecord,
    },
    /// `card` is final.
    Finished {
        index: usize,
        total: usize,
        card: &'a CourtCard,
    },
}

/// All cards of a run, in court order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub cards: Vec<CourtCard>,
}

impl BulkReport {
    pub fn listed(&self) -> usize {
        self.count(|s| matches!(s, CardStatus::Listed))
    }

    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, CardStatus::Empty))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CardStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&CardStatus) -> bool) -> usize {
        self.cards.iter().filter(|c| pred(&c.status)).count()
    }
}

/// Run a bulk request to completion.
///
/// Only the initial court-list lookup can fail the whole run; every
/// per-court failure lands on that court's card.
pub async fn run(
    client: &CourtLookupClient,
    request: &BulkRequest,
    mut on_progress: impl FnMut(BulkEvent<'_>),
) -> Result<BulkReport, CoreError> {
    let courts = client
        .list_court_names(
            &request.state_code,
            &request.district_code,
            request.complex.court_code(),
        )
        .await?;

    let total = courts.len();
    info!(
        complex = %request.complex.court_complex_name,
        courts = total,
        "starting bulk cause list"
    );
    on_progress(BulkEvent::Started { total });

    let mut report = BulkReport {
        cards: Vec::with_capacity(total),
    };

    for (index, court) in courts.into_iter().enumerate() {
        if index > 0 && !request.delay.is_zero() {
            tokio::time::sleep(request.delay).await;
        }
        on_progress(BulkEvent::Fetching {
            index,
            total,
            court: &court,
        });

        let card = fetch_card(client, request, court).await;
        on_progress(BulkEvent::Finished {
            index,
            total,
            card: &card,
        });
        report.cards.push(card);
    }

    info!(
        listed = report.listed(),
        empty = report.empty(),
        failed = report.failed(),
        "bulk cause list finished"
    );
    Ok(report)
}

async fn fetch_card(
    client: &CourtLookupClient,
    request: &BulkRequest,
    court: CourtRecord,
) -> CourtCard {
    let criteria = CauseListCriteria::for_court(
        &request.state_code,
        &request.district_code,
        &court,
        request.cause_list_type,
        request.date,
    );

    let (status, cause_list) = match client.get_cause_list(&criteria).await {
        Ok(Some(list)) if html::has_table_data(&list.html) => (CardStatus::Listed, Some(list)),
        Ok(_) => (CardStatus::Empty, None),
        Err(e) => {
            warn!(court = %court.display_name, error = %e, "cause list request failed");
            (
                CardStatus::Failed {
                    message: CoreError::from(e).to_string(),
                },
                None,
            )
        }
    };
    debug!(court = %court.display_name, ?status, "court done");

    CourtCard {
        court,
        status,
        cause_list,
    }
}
