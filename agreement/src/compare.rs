use crate::metrics;
use crate::scan::{Annotation, AnnotatorId, SubjectGroups, SubjectId};
use crate::volume;
use itertools::Itertools;
use log::{debug, warn};
use nifti::NiftiError;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// 一对标注的一致性评分结果。字段改名对应CSV边界上的列名。
#[derive(Debug, Clone, Serialize)]
pub struct AgreementRecord {
    #[serde(rename = "patient_id")]
    pub subject: SubjectId,
    #[serde(rename = "doctor1")]
    pub annotator_a: AnnotatorId,
    #[serde(rename = "doctor2")]
    pub annotator_b: AnnotatorId,
    pub cohen_kappa: f64,
    pub f1_score: f64,
}

/// 单对标注比较失败的原因。只影响该对，不中断整体批次。
#[derive(Debug, Error)]
pub enum ComparisonError {
    #[error("failed to load `{path}`: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: NiftiError,
    },
    #[error("volume sizes do not match ({len_a} vs {len_b} voxels)")]
    ShapeMismatch { len_a: usize, len_b: usize },
}

/// 对每个有至少两份标注的病人，计算所有无序标注对的一致性评分。
///
/// 结果顺序与病人分组的迭代顺序一致，组内按组合生成顺序排列。
/// 任何一对比较失败只记录诊断并跳过，其余对照常处理。
pub fn calculate_agreement(groups: &SubjectGroups) -> Vec<AgreementRecord> {
    let mut records = Vec::new();
    for (subject, annotations) in groups {
        if annotations.len() < 2 {
            continue;
        }
        debug!(
            "comparing {} annotation pairs for patient {subject}",
            annotations.len() * (annotations.len() - 1) / 2
        );
        for (anno1, anno2) in annotations.iter().tuple_combinations() {
            match compare_pair(anno1, anno2) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    "could not process pair for patient {subject} ({}, {}): {e}",
                    anno1.annotator, anno2.annotator
                ),
            }
        }
    }
    records
}

/// 读入并二值化一对标注体数据，计算kappa与F1。
pub fn compare_pair(
    anno1: &Annotation,
    anno2: &Annotation,
) -> Result<AgreementRecord, ComparisonError> {
    let labels1 = load_binary_labels(anno1)?;
    let labels2 = load_binary_labels(anno2)?;
    if labels1.len() != labels2.len() {
        return Err(ComparisonError::ShapeMismatch {
            len_a: labels1.len(),
            len_b: labels2.len(),
        });
    }

    Ok(AgreementRecord {
        subject: anno1.subject.clone(),
        annotator_a: anno1.annotator.clone(),
        annotator_b: anno2.annotator.clone(),
        cohen_kappa: metrics::cohen_kappa(&labels1, &labels2),
        f1_score: metrics::f1_score(&labels1, &labels2),
    })
}

fn load_binary_labels(anno: &Annotation) -> Result<Vec<u8>, ComparisonError> {
    let data = volume::load_volume(&anno.path).map_err(|source| ComparisonError::Load {
        path: anno.path.clone(),
        source,
    })?;
    Ok(volume::binarize(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::find_segmentations;
    use crate::volume::save_volume;
    use ndarray::Array3;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_mask(root: &Path, doctor: &str, patient: &str, mask: &Array3<u8>) {
        let dir = root.join(doctor).join(patient).join("segmentation");
        fs::create_dir_all(&dir).unwrap();
        save_volume(&dir.join("segmentation.seg.nii"), mask).unwrap();
    }

    fn half_ones() -> Array3<u8> {
        let mut m = Array3::<u8>::zeros((2, 2, 2));
        m.slice_mut(ndarray::s![0, .., ..]).fill(1);
        m
    }

    #[test]
    fn test_identical_volumes_score_one() {
        let dir = TempDir::new().unwrap();
        let mask = half_ones();
        write_mask(dir.path(), "doctor1", "patient1", &mask);
        write_mask(dir.path(), "doctor2", "patient1", &mask);

        let groups = find_segmentations(dir.path()).unwrap();
        let records = calculate_agreement(&groups);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.subject.as_str(), "patient1");
        assert_eq!(r.annotator_a.as_str(), "doctor1");
        assert_eq!(r.annotator_b.as_str(), "doctor2");
        assert!((r.cohen_kappa - 1.0).abs() < 1e-12);
        assert!((r.f1_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_ones_volumes_degenerate_kappa() {
        let dir = TempDir::new().unwrap();
        let mask = Array3::<u8>::ones((2, 2, 2));
        write_mask(dir.path(), "doctor1", "patient1", &mask);
        write_mask(dir.path(), "doctor2", "patient1", &mask);

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert_eq!(records.len(), 1);
        assert!(records[0].cohen_kappa.is_nan());
        assert!((records[0].f1_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_background_volumes() {
        let dir = TempDir::new().unwrap();
        let mask = Array3::<u8>::zeros((3, 3, 3));
        write_mask(dir.path(), "doctor1", "patient1", &mask);
        write_mask(dir.path(), "doctor2", "patient1", &mask);

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert_eq!(records.len(), 1);
        assert!(records[0].cohen_kappa.is_nan());
        assert!((records[0].f1_score - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_count_is_n_choose_2() {
        let dir = TempDir::new().unwrap();
        let mask = half_ones();
        for doctor in ["doctor1", "doctor2", "doctor3", "doctor4"] {
            write_mask(dir.path(), doctor, "patient1", &mask);
        }

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        // C(4, 2) = 6。
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_single_annotator_yields_no_pairs() {
        let dir = TempDir::new().unwrap();
        write_mask(dir.path(), "doctor1", "patient1", &half_ones());
        write_mask(dir.path(), "doctor1", "patient2", &half_ones());

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_file_skips_pair_only() {
        let dir = TempDir::new().unwrap();
        let mask = half_ones();
        write_mask(dir.path(), "doctor1", "patient1", &mask);
        write_mask(dir.path(), "doctor2", "patient1", &mask);

        let broken_dir = dir
            .path()
            .join("doctor1")
            .join("patient2")
            .join("segmentation");
        fs::create_dir_all(&broken_dir).unwrap();
        fs::write(broken_dir.join("bad.seg.nii"), b"garbage").unwrap();
        write_mask(dir.path(), "doctor2", "patient2", &mask);

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject.as_str(), "patient1");
    }

    #[test]
    fn test_shape_mismatch_skips_pair() {
        let dir = TempDir::new().unwrap();
        write_mask(dir.path(), "doctor1", "patient1", &half_ones());
        write_mask(dir.path(), "doctor2", "patient1", &Array3::<u8>::ones((3, 3, 3)));

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert!(records.is_empty());
    }

    #[test]
    fn test_record_order_follows_groups() {
        let dir = TempDir::new().unwrap();
        let mask = half_ones();
        for patient in ["patient1", "patient2"] {
            write_mask(dir.path(), "doctor1", patient, &mask);
            write_mask(dir.path(), "doctor2", patient, &mask);
        }

        let records = calculate_agreement(&find_segmentations(dir.path()).unwrap());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subject.as_str(), "patient1");
        assert_eq!(records[1].subject.as_str(), "patient2");
    }
}
