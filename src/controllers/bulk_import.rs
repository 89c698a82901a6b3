use std::path::Path;

use crate::models::import::BulkImportResult;
use crate::services::api::{ApiClient, ApiError, ApiResult};
use crate::services::auth;
use crate::services::products::ProductService;
use crate::services::session::SessionStore;

/// Declared MIME types accepted for bulk upload: Excel (new and old format)
/// and CSV.
const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
];

const ALLOWED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// A file passes if its declared MIME type is allow-listed OR its name has an
/// allow-listed extension. The OR keeps the check working when the source
/// reports a generic or missing MIME type.
pub fn accept_file(name: &str, declared_mime: Option<&str>) -> bool {
    if let Some(declared) = declared_mime {
        if let Ok(parsed) = declared.parse::<mime::Mime>() {
            if ALLOWED_MIME_TYPES.contains(&parsed.essence_str()) {
                return true;
            }
        }
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Bulk product import: client-side file gate, one multipart upload, and the
/// server-produced per-row summary rendered verbatim. Only available to the
/// administrative role.
pub struct BulkImportController {
    pub file: Option<SelectedFile>,
    pub error: Option<String>,
    pub result: Option<BulkImportResult>,
}

impl Default for BulkImportController {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkImportController {
    pub fn new() -> Self {
        Self {
            file: None,
            error: None,
            result: None,
        }
    }

    pub fn available(session: &SessionStore) -> bool {
        auth::has_role(session, "ADMIN")
    }

    /// Validate and stage a file. A rejected file clears the selection and
    /// records the error; an accepted one clears any previous error/result.
    pub fn select_file(
        &mut self,
        name: impl Into<String>,
        declared_mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> bool {
        let name = name.into();
        if !accept_file(&name, declared_mime) {
            self.error = Some(
                "Tipo de archivo no permitido. Solo se aceptan archivos Excel (.xlsx, .xls) o CSV"
                    .into(),
            );
            self.file = None;
            return false;
        }
        self.file = Some(SelectedFile { name, bytes });
        self.error = None;
        self.result = None;
        true
    }

    /// Upload the staged file. The selection is only cleared on success, so
    /// a failed upload can be retried as-is.
    pub async fn upload(&mut self, api: &ApiClient) -> ApiResult<()> {
        let Some(file) = self.file.clone() else {
            let err = ApiError::Validation("Por favor selecciona un archivo".into());
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.error = None;
        self.result = None;
        match ProductService::bulk_upload(api, &file.name, file.bytes).await {
            Ok(result) => {
                self.result = Some(result);
                self.file = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetch the spreadsheet template and save it to disk, the console
    /// analogue of the browser's object-URL-and-click save idiom.
    pub async fn download_template(api: &ApiClient, dest: &Path) -> anyhow::Result<()> {
        let bytes = ProductService::download_template(api).await?;
        std::fs::write(dest, &bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::tests::session_with_claims;
    use serde_json::json;

    #[test]
    fn rejects_disallowed_type_and_extension() {
        assert!(!accept_file("data.pdf", Some("application/pdf")));
        assert!(!accept_file("data", None));
        assert!(!accept_file("data.txt", Some("text/plain")));
    }

    #[test]
    fn accepts_by_declared_mime() {
        assert!(accept_file("export.bin", Some("text/csv")));
        assert!(accept_file(
            "productos",
            Some("application/vnd.ms-excel")
        ));
    }

    #[test]
    fn accepts_by_extension_when_mime_is_unknown() {
        assert!(accept_file("data.csv", None));
        assert!(accept_file("data.csv", Some("application/octet-stream")));
        assert!(accept_file("DATA.XLSX", Some("")));
        assert!(accept_file("viejo.XLS", None));
    }

    #[test]
    fn rejected_file_clears_selection() {
        let mut c = BulkImportController::new();
        assert!(!c.select_file("data.pdf", Some("application/pdf"), vec![1, 2]));
        assert!(c.file.is_none());
        assert!(c.error.is_some());
    }

    #[test]
    fn accepted_file_resets_previous_error() {
        let mut c = BulkImportController::new();
        c.select_file("data.pdf", Some("application/pdf"), vec![]);
        assert!(c.select_file("data.csv", Some("text/csv"), vec![1, 2, 3]));
        assert!(c.error.is_none());
        assert_eq!(c.file.as_ref().unwrap().name, "data.csv");
    }

    #[test]
    fn only_admin_sees_the_import() {
        let admin = session_with_claims(json!({
            "userId": "u-1",
            "email": "admin@example.com",
            "role": "ADMIN",
            "permissions": ["view_products"],
        }));
        let vendor = session_with_claims(json!({
            "userId": "u-2",
            "email": "v@example.com",
            "role": "VENDEDOR",
            "permissions": ["view_products"],
        }));
        assert!(BulkImportController::available(&admin));
        assert!(!BulkImportController::available(&vendor));
    }

    #[tokio::test]
    async fn upload_without_file_is_a_validation_error() {
        let session = std::sync::Arc::new(crate::services::session::SessionStore::in_memory());
        let api = ApiClient::new("http://127.0.0.1:1", session);
        let mut c = BulkImportController::new();
        let err = c.upload(&api).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
