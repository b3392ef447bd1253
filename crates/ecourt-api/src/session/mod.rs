// Session layer
//
// One bearer credential, shared by every request the client makes:
//
//   RequestPipeline ──▶ TokenManager ──▶ CredentialStore ──▶ TokenCache
//         │                  │
//         │ 401: refresh     └─ TokenIssuer (POST /auth/token)
//         └─ resend once
//
// Nothing here is global; a `TokenManager` is built per client and
// injected into its pipeline.

use url::Url;

use crate::error::Error;

pub mod manager;
pub mod pipeline;
pub mod store;

/// Path of the credential issuance endpoint.
pub const TOKEN_PATH: &str = "/auth/token";

/// Key under which durable caches hold the credential.
pub const TOKEN_CACHE_KEY: &str = "ecourt_token";

/// Join an absolute endpoint path onto the base URL, keeping any path
/// prefix the base carries (e.g. `https://host/ecourt-api`).
pub(crate) fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, Error> {
    let base = base_url.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

/// The first couple hundred bytes of a response body, for error messages.
pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
