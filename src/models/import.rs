use serde::Deserialize;

/// Result of a bulk product upload. Produced entirely by the server; the
/// client renders it verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkImportResult {
    pub summary: ImportSummary,
    #[serde(default)]
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSummary {
    pub total: u64,
    pub created: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRowError {
    pub index: u64,
    #[serde(default)]
    pub name: String,
    pub error: String,
}
