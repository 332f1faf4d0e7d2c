pub use super::compare::{calculate_agreement, AgreementRecord, ComparisonError};
pub use super::export::{write_scores, ExportError};
pub use super::metrics::{cohen_kappa, f1_score, Confusion};
pub use super::scan::{
    find_segmentations, Annotation, AnnotatorId, ScanError, SubjectGroups, SubjectId,
    SEG_FILE_SUFFIX,
};
pub use super::volume::{binarize, load_volume, save_volume};
