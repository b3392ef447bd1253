//! Token subcommand handlers.

use serde::Serialize;

use crate::cli::{GlobalOpts, TokenArgs, TokenCommand};
use crate::config::TokenCacheKind;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Serialize)]
struct TokenStatus<'a> {
    profile: &'a str,
    cache: TokenCacheKind,
    cached: bool,
    token: Option<String>,
}

pub async fn handle(ctx: &Context, args: TokenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let tokens = ctx.client.tokens();
    match args.command {
        TokenCommand::Show => {
            let current = tokens.store().read();
            let status = TokenStatus {
                profile: &ctx.profile_name,
                cache: ctx.profile.token_cache,
                cached: current.is_some(),
                token: current.as_ref().map(util::mask_token),
            };
            let out = output::render_single(
                &global.output,
                &status,
                |s| match s.token {
                    Some(ref masked) => format!(
                        "Profile: {}\nCache:   {}\nToken:   {masked}",
                        s.profile, s.cache
                    ),
                    None => format!(
                        "Profile: {}\nCache:   {}\nToken:   (none, one is requested on first use)",
                        s.profile, s.cache
                    ),
                },
                |s| s.token.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TokenCommand::Refresh => {
            let fresh = tokens.force_refresh().await?;
            if !global.quiet {
                eprintln!(
                    "✓ New credential for profile '{}': {}",
                    ctx.profile_name,
                    util::mask_token(&fresh)
                );
            }
            Ok(())
        }

        TokenCommand::Clear => {
            tokens.store().clear();
            if !global.quiet {
                eprintln!("✓ Cached credential cleared for profile '{}'", ctx.profile_name);
            }
            Ok(())
        }
    }
}
