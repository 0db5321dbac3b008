use crate::domain::model::SelectedFile;
use crate::utils::validation::is_csv_media_type;

/// Result of checking what the file picker handed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intake {
    /// Picker closed without a file.
    Cleared,
    /// Declared media type is not `text/csv`.
    Rejected { name: String, media_type: String },
    Accepted(SelectedFile),
}

pub fn check_file(file: Option<SelectedFile>) -> Intake {
    match file {
        None => Intake::Cleared,
        Some(file) if !is_csv_media_type(&file.media_type) => Intake::Rejected {
            name: file.name,
            media_type: file.media_type,
        },
        Some(file) => Intake::Accepted(file),
    }
}
