use crate::compare::AgreementRecord;
use log::info;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write csv: {0}")]
    Io(#[from] io::Error),
}

/// 将评分结果写为CSV文件，首行为表头。
///
/// 列顺序固定为`patient_id,doctor1,doctor2,cohen_kappa,f1_score`；
/// 无定义的kappa值（NaN）写作字面量`NaN`。
pub fn write_scores(path: &Path, records: &[AgreementRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("wrote {} records to `{}`", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{AnnotatorId, SubjectId};
    use std::fs;
    use tempfile::TempDir;

    fn record(patient: &str, kappa: f64, f1: f64) -> AgreementRecord {
        AgreementRecord {
            subject: SubjectId::new(patient),
            annotator_a: AnnotatorId::new("doctor1"),
            annotator_b: AnnotatorId::new("doctor2"),
            cohen_kappa: kappa,
            f1_score: f1,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.csv");
        write_scores(&path, &[record("patient1", 1.0, 1.0)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("patient_id,doctor1,doctor2,cohen_kappa,f1_score")
        );
        assert_eq!(lines.next(), Some("patient1,doctor1,doctor2,1.0,1.0"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_nan_kappa_written_as_literal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.csv");
        write_scores(&path, &[record("patient1", f64::NAN, 0.0)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.lines().nth(1).unwrap().contains("NaN"));
    }
}
