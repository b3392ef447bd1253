//! Backend health check.

use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Serialize)]
struct HealthReport {
    base_url: String,
    backend: serde_json::Value,
    credential: &'static str,
}

/// `GET /health`, then make sure a credential can be obtained.
pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let backend = ctx.client.check_health().await?;
    ctx.client.initialize().await?;

    let report = HealthReport {
        base_url: ctx.client.base_url().to_string(),
        backend,
        credential: "ok",
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            let status = r
                .backend
                .get("status")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("ok");
            format!(
                "Backend:    {} ({status})\nCredential: {}",
                r.base_url, r.credential
            )
        },
        |_| "ok".into(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
