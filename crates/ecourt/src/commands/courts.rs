//! Location hierarchy handlers: states, districts, complexes, courts.

use tabled::Tabled;

use ecourt_api::{CourtComplex, CourtRecord, District, State};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "State")]
    name: String,
}

impl From<&State> for StateRow {
    fn from(s: &State) -> Self {
        Self {
            code: s.state_code.clone(),
            name: s.state_name.clone(),
        }
    }
}

#[derive(Tabled)]
struct DistrictRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "District")]
    name: String,
}

impl From<&District> for DistrictRow {
    fn from(d: &District) -> Self {
        Self {
            code: d.dist_code.clone(),
            name: d.dist_name.clone(),
        }
    }
}

#[derive(Tabled)]
struct ComplexRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Complex")]
    name: String,
    #[tabled(rename = "Establishments")]
    establishments: String,
}

impl From<&CourtComplex> for ComplexRow {
    fn from(c: &CourtComplex) -> Self {
        Self {
            code: c.complex_code.clone(),
            name: c.court_complex_name.clone(),
            establishments: c.njdg_est_code.clone(),
        }
    }
}

#[derive(Tabled)]
struct CourtRow {
    #[tabled(rename = "Court Code")]
    group: String,
    #[tabled(rename = "No.")]
    number: String,
    #[tabled(rename = "Court")]
    name: String,
}

impl From<&CourtRecord> for CourtRow {
    fn from(c: &CourtRecord) -> Self {
        Self {
            group: c.group_code.clone(),
            number: c.court_number.clone(),
            name: c.display_name.clone(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn states(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let states = ctx.client.list_states().await?;
    let out = output::render_list(
        &global.output,
        &states,
        |s| StateRow::from(s),
        |s| s.state_code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn districts(ctx: &Context, state: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let districts = ctx.client.list_districts(state).await?;
    let out = output::render_list(
        &global.output,
        &districts,
        |d| DistrictRow::from(d),
        |d| d.dist_code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn complexes(
    ctx: &Context,
    state: &str,
    district: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let complexes = ctx.client.list_complexes(state, district).await?;
    let out = output::render_list(
        &global.output,
        &complexes,
        |c| ComplexRow::from(c),
        |c| c.complex_code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Courts of a complex. `complex` may be the complex code, resolved
/// through `list_complexes`, or the establishment code list itself.
pub async fn courts(
    ctx: &Context,
    state: &str,
    district: &str,
    complex: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let court_code = if complex.contains(',') {
        complex.to_owned()
    } else {
        let complexes = ctx.client.list_complexes(state, district).await?;
        complexes
            .iter()
            .find(|c| c.complex_code == complex)
            .map_or_else(|| complex.to_owned(), |c| c.court_code().to_owned())
    };

    let courts = ctx
        .client
        .list_court_names(state, district, &court_code)
        .await?;
    if courts.is_empty() && !global.quiet {
        eprintln!("No courts listed for complex {complex}");
    }
    let out = output::render_list(
        &global.output,
        &courts,
        |c| CourtRow::from(c),
        |c| format!("{} {}", c.group_code, c.court_number),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
