use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};
use thiserror::Error;
use walkdir::WalkDir;

/// 分割标注文件的后缀。区分大小写，必须完整匹配。
pub const SEG_FILE_SUFFIX: &str = ".seg.nii";

const SEG_DIR_NAME: &str = "segmentation";

/// 医生（标注者）标识，取目录名原文。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AnnotatorId(String);

impl AnnotatorId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AnnotatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// 病人标识，取目录名原文。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// 一份分割标注文件：哪位医生对哪个病人标注，文件在哪里。
#[derive(Debug, Clone)]
pub struct Annotation {
    pub annotator: AnnotatorId,
    pub subject: SubjectId,
    pub path: PathBuf,
}

/// 以病人为键的标注分组。保持插入顺序，扫描完成后不再修改。
pub type SubjectGroups = IndexMap<SubjectId, Vec<Annotation>>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("data directory `{path}` is missing or not readable: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 扫描`data_dir`，收集全部分割标注并按病人分组。
///
/// 目录约定为`<data_dir>/<医生>/<病人>/segmentation/*.seg.nii`；
/// 不满足该层级的条目一律跳过。根目录不可读视为致命错误。
pub fn find_segmentations(data_dir: &Path) -> Result<SubjectGroups, ScanError> {
    // 根目录缺失、非目录或无读权限都是致命错误；更深层的读取失败只跳过。
    fs::read_dir(data_dir).map_err(|source| ScanError::RootUnreadable {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let mut groups = SubjectGroups::new();
    // [data_dir/<doctor>/<patient>/segmentation/<file>]，固定四层。
    let walker = WalkDir::new(data_dir)
        .min_depth(4)
        .max_depth(4)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(SEG_FILE_SUFFIX) {
            continue;
        }

        let path = entry.path();
        // 深度固定为4，三级父目录必然存在。
        let seg_dir = path.parent().unwrap();
        if seg_dir.file_name().map(|n| n != SEG_DIR_NAME).unwrap_or(true) {
            continue;
        }
        let subject_dir = seg_dir.parent().unwrap();
        let annotator_dir = subject_dir.parent().unwrap();

        let subject = SubjectId::new(dir_name(subject_dir));
        let annotation = Annotation {
            annotator: AnnotatorId::new(dir_name(annotator_dir)),
            subject: subject.clone(),
            path: path.to_path_buf(),
        };
        groups.entry(subject).or_default().push(annotation);
    }
    Ok(groups)
}

fn dir_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
