//! Command dispatch: bridges CLI args -> lookup client -> output formatting.

pub mod bulk;
pub mod cases;
pub mod cause_list;
pub mod config_cmd;
pub mod courts;
pub mod health;
pub mod token;
pub mod util;

use ecourt_api::CourtLookupClient;

use crate::cli::{Command, GlobalOpts};
use crate::config::Profile;
use crate::error::CliError;

/// What a backend-bound command runs against.
pub struct Context {
    pub client: CourtLookupClient,
    pub profile_name: String,
    pub profile: Profile,
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::States => courts::states(ctx, global).await,
        Command::Districts { state } => courts::districts(ctx, &state, global).await,
        Command::Complexes { state, district } => {
            courts::complexes(ctx, &state, &district, global).await
        }
        Command::Courts {
            state,
            district,
            complex,
        } => courts::courts(ctx, &state, &district, &complex, global).await,
        Command::CauseList(args) => cause_list::handle(ctx, args, global).await,
        Command::BulkCauseList(args) => bulk::handle(ctx, args, global).await,
        Command::Case { cnr } => cases::handle(ctx, &cnr, global).await,
        Command::Token(args) => token::handle(ctx, args, global).await,
        Command::Health => health::handle(ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
