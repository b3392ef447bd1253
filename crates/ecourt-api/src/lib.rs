// ecourt-api: Async Rust client for the eCourt lookup backend
//
// The session layer (`session`) owns the bearer credential: a durable
// `CredentialStore`, a single-flight `TokenManager`, and a
// `RequestPipeline` that retries once on 401. `CourtLookupClient` is
// the typed call surface built on top of it.

pub mod client;
pub mod codec;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

mod de;

pub use client::{ClientConfig, CourtLookupClient, DEFAULT_BASE_URL};
pub use codec::CourtRecord;
pub use error::Error;
pub use models::{
    CaseHistory, CauseList, CauseListCriteria, CauseListType, CourtComplex, District, State,
};
pub use session::manager::{HttpTokenIssuer, TokenIssuer, TokenManager};
pub use session::pipeline::{ApiRequest, RequestPipeline};
pub use session::store::{CacheError, CredentialStore, MemoryTokenCache, TokenCache};
pub use transport::{TlsMode, TransportConfig};
