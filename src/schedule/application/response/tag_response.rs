use serde::Serialize;

/// Outcome of a schedule tag write or delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagResponse {
    pub status: String,
    pub collection: String,
    pub doc_id: String,
}
