// ecourt-core: Cause-list workflows on top of ecourt-api, shared by the CLI.
//
// `bulk` walks every court of a complex, `html` reads the backend's
// cause-list tables, and `export` turns a list into a standalone file.

pub mod bulk;
pub mod error;
pub mod export;
pub mod html;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bulk::{BulkEvent, BulkReport, BulkRequest, CardStatus, CourtCard};
pub use error::CoreError;
pub use export::ExportHeader;
pub use html::{RowKind, TableRow};
