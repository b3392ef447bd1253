// Court lookup client
//
// Typed call surface over the request pipeline. Each operation is one
// logical backend call; the pipeline owns credential handling and the
// 401 resend, this module owns envelope and status mapping.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::codec::{self, CourtRecord};
use crate::error::Error;
use crate::models::{
    CaseDetailsData, CaseHistory, CauseList, CauseListCriteria, CauseListData, ComplexData,
    CourtComplex, CourtNamesData, District, DistrictsData, Envelope, State, StatesData,
};
use crate::session::manager::{DEFAULT_ISSUANCE_TIMEOUT, HttpTokenIssuer, TokenManager};
use crate::session::pipeline::{ApiRequest, RequestPipeline};
use crate::session::{endpoint_url, preview};
use crate::session::store::{CredentialStore, TokenCache};
use crate::transport::TransportConfig;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Everything needed to build a [`CourtLookupClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub transport: TransportConfig,
    pub issuance_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport: TransportConfig::default(),
            issuance_timeout: DEFAULT_ISSUANCE_TIMEOUT,
        }
    }
}

// ── Request bodies ──────────────────────────────────────────────────

#[derive(Serialize)]
struct DistrictsBody<'a> {
    state_code: &'a str,
}

#[derive(Serialize)]
struct ComplexBody<'a> {
    state_code: &'a str,
    district_code: &'a str,
}

#[derive(Serialize)]
struct CourtNamesBody<'a> {
    state_code: &'a str,
    district_code: &'a str,
    court_code: &'a str,
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the eCourt lookup backend.
///
/// Cheap to clone; clones share one credential and one in-flight
/// acquisition.
#[derive(Debug, Clone)]
pub struct CourtLookupClient {
    pipeline: RequestPipeline,
}

impl CourtLookupClient {
    /// Build a client, its token manager, and the credential store
    /// backed by `cache`.
    pub fn new(config: &ClientConfig, cache: Arc<dyn TokenCache>) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Self::with_client(http, config.base_url.clone(), cache, config.issuance_timeout)
    }

    /// Build a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        cache: Arc<dyn TokenCache>,
        issuance_timeout: Duration,
    ) -> Result<Self, Error> {
        let issuer = HttpTokenIssuer::new(http.clone(), &base_url)?;
        let tokens = TokenManager::new(Arc::new(CredentialStore::new(cache)), Arc::new(issuer))
            .with_issuance_timeout(issuance_timeout);
        Ok(Self::from_pipeline(RequestPipeline::new(
            http,
            base_url,
            Arc::new(tokens),
        )))
    }

    /// Wrap an existing pipeline (and whatever token manager it carries).
    pub fn from_pipeline(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub fn base_url(&self) -> &Url {
        self.pipeline.base_url()
    }

    /// The shared token manager.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.pipeline.tokens()
    }

    /// Make sure a credential is available before the first real call.
    pub async fn initialize(&self) -> Result<(), Error> {
        self.tokens().get_valid().await.map(drop)
    }

    /// `GET /health`. Sent without a credential.
    pub async fn check_health(&self) -> Result<serde_json::Value, Error> {
        let url = endpoint_url(self.base_url(), "/health")?;
        debug!("GET {url}");
        let resp = self.pipeline.http().get(url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    // ── Location hierarchy ──────────────────────────────────────────

    pub async fn list_states(&self) -> Result<Vec<State>, Error> {
        let data: Option<StatesData> = self.call(&ApiRequest::get("/court/states")).await?;
        Ok(data.map(|d| d.states).unwrap_or_default())
    }

    pub async fn list_districts(&self, state_code: &str) -> Result<Vec<District>, Error> {
        let request = ApiRequest::post("/court/districts").json(&DistrictsBody { state_code })?;
        let data: Option<DistrictsData> = self.call(&request).await?;
        Ok(data.map(|d| d.districts).unwrap_or_default())
    }

    pub async fn list_complexes(
        &self,
        state_code: &str,
        district_code: &str,
    ) -> Result<Vec<CourtComplex>, Error> {
        let request = ApiRequest::post("/court/complex").json(&ComplexBody {
            state_code,
            district_code,
        })?;
        let data: Option<ComplexData> = self.call(&request).await?;
        Ok(data.map(|d| d.court_complex).unwrap_or_default())
    }

    /// Courts of a complex, decoded from the backend's `courtNames`
    /// string. Placeholder entries are already dropped.
    ///
    /// `court_code` is the complex's [`CourtComplex::court_code`].
    pub async fn list_court_names(
        &self,
        state_code: &str,
        district_code: &str,
        court_code: &str,
    ) -> Result<Vec<CourtRecord>, Error> {
        let request = ApiRequest::post("/court/names").json(&CourtNamesBody {
            state_code,
            district_code,
            court_code,
        })?;
        let data: Option<CourtNamesData> = self.call(&request).await?;
        let raw = data.and_then(|d| d.court_names).unwrap_or_default();
        Ok(codec::decode(&raw))
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// One court's cause list. `Ok(None)` when the backend has nothing
    /// for these criteria.
    pub async fn get_cause_list(
        &self,
        criteria: &CauseListCriteria,
    ) -> Result<Option<CauseList>, Error> {
        let request = ApiRequest::post("/court/cause-list").json(&criteria.to_body())?;
        let data: Option<CauseListData> = Self::not_found_as_none(self.call(&request).await)?;
        Ok(data.and_then(|d| d.cases).map(|html| CauseList { html }))
    }

    /// Case record by CNR. `Ok(None)` when no such case exists.
    pub async fn get_case_details(&self, cnr: &str) -> Result<Option<CaseHistory>, Error> {
        let request = ApiRequest::get("/cases/details").query("cnr", cnr);
        let data: Option<CaseDetailsData> = Self::not_found_as_none(self.call(&request).await)?;
        Ok(data.and_then(|d| d.history))
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn call<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<Option<T>, Error> {
        let resp = self.pipeline.send(request).await?;
        parse_envelope(request.path(), resp).await
    }

    fn not_found_as_none<T>(result: Result<Option<T>, Error>) -> Result<Option<T>, Error> {
        match result {
            Err(Error::NotFound { path }) => {
                debug!(%path, "no result");
                Ok(None)
            }
            other => other,
        }
    }
}

/// Map a backend response onto the envelope's `data`.
///
/// 400 and 404 get their own variants; a 401 never reaches here (the
/// pipeline turns it into `AuthorizationExpired`).
async fn parse_envelope<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<Option<T>, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound {
            path: path.to_owned(),
        });
    }

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = backend_message(&body);
        return Err(if status == reqwest::StatusCode::BAD_REQUEST {
            Error::InvalidParameters { message }
        } else {
            Error::Api {
                status: status.as_u16(),
                message,
            }
        });
    }

    let body = resp.text().await?;
    let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })?;

    if envelope.status == "success" {
        Ok(envelope.data)
    } else {
        Err(Error::Rejected {
            message: envelope.message.unwrap_or_default(),
            status: envelope.status,
        })
    }
}

/// The backend's own error message if the body carries one
/// (`{"message": ...}` or `{"detail": ...}`), else a body preview.
fn backend_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| preview(body).to_owned())
}
