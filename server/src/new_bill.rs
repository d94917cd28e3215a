//! New-bill controller: proof-file validation and assembly of the final
//! submission sent to the store.

use std::ffi::OsStr;
use std::path::Path;

use platform_store::BillSubmission;
use serde::Deserialize;

pub const WRONG_FORMAT_ALERT: &str = "Le format du fichier n'est pas valide. Veuillez sélectionner un fichier au format jpg, jpeg ou png.";
pub const MISSING_FILE_ALERT: &str = "Veuillez soumettre le fichier avant de continuer.";
pub const UPLOAD_FAILED_ALERT: &str =
    "Le téléversement du justificatif a échoué. Veuillez réessayer.";

/// Only image proofs are accepted, case-insensitively.
pub fn proof_extension_allowed(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
        .unwrap_or(false)
}

/// The submitted form, including the hidden proof fields filled in by a
/// prior successful upload. An empty `file_key` means no proof yet.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewBillForm {
    #[serde(default)]
    pub expense_type: String,
    #[serde(default)]
    pub expense_name: String,
    #[serde(default)]
    pub datepicker: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub vat: String,
    #[serde(default)]
    pub pct: String,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub file_key: String,
    #[serde(default)]
    pub file_name: String,
}

impl NewBillForm {
    pub fn has_proof(&self) -> bool {
        !self.file_key.trim().is_empty()
    }

    /// Full-replacement payload; unparseable amounts fall back to 0 and
    /// a missing percentage defaults to 20.
    pub fn into_submission(self, email: &str) -> BillSubmission {
        BillSubmission {
            key: self.file_key,
            expense_type: self.expense_type,
            name: self.expense_name,
            date: self.datepicker,
            amount: self.amount.trim().parse().unwrap_or(0),
            vat: self.vat,
            pct: self.pct.trim().parse().unwrap_or(20),
            commentary: self.commentary,
            file_url: self.file_url,
            file_name: self.file_name,
            status: "pending".to_string(),
            email: email.to_string(),
        }
    }
}
