use ndarray::{Array3, ArrayD};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiError, NiftiObject, ReaderOptions};
use std::path::Path;

/// 从NIfTI文件读入整个标注体数据。
///
/// 标签值统一转为`f32`读取；文件损坏或格式不符时返回错误。
pub fn load_volume(path: &Path) -> Result<ArrayD<f32>, NiftiError> {
    let obj = ReaderOptions::new().read_file(path)?;
    obj.into_volume().into_ndarray::<f32>()
}

/// 将体数据写为NIfTI文件。仅dummy数据生成器使用。
pub fn save_volume(path: &Path, volume: &Array3<u8>) -> Result<(), NiftiError> {
    WriterOptions::new(path).write_nifti(volume)
}

/// 按原生顺序展平并二值化：标签值大于0记为前景1，否则为背景0。
pub fn binarize(volume: &ArrayD<f32>) -> Vec<u8> {
    volume.iter().map(|&v| u8::from(v > 0.0)).collect()
}
