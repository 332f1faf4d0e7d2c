//! 两评审者二值标签一致性统计。

/// 二分类混淆矩阵计数。`a`为第一方标签序列，`b`为第二方。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    /// 双方均为前景。
    pub both_fg: u64,
    /// 双方均为背景。
    pub both_bg: u64,
    /// 仅第一方为前景。
    pub only_a: u64,
    /// 仅第二方为前景。
    pub only_b: u64,
}

impl Confusion {
    /// 统计两条标签序列的混淆矩阵。标签取值限定为0或1。
    ///
    /// 前置条件：两序列必须等长，只按对应位置逐一配对计数；
    /// 调用方（见`compare_pair`）须先校验体素总数一致。
    pub fn from_labels(a: &[u8], b: &[u8]) -> Self {
        debug_assert_eq!(a.len(), b.len());
        let mut c = Confusion::default();
        for (&x, &y) in a.iter().zip(b.iter()) {
            match (x, y) {
                (0, 0) => c.both_bg += 1,
                (0, _) => c.only_b += 1,
                (_, 0) => c.only_a += 1,
                _ => c.both_fg += 1,
            }
        }
        c
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.both_fg + self.both_bg + self.only_a + self.only_b
    }
}

/// Cohen's kappa：对两评审者二值标签的机会校正一致性。
///
/// 退化情形（双方在整个序列上给出同一个常量标签，期望一致率为1，
/// 统计量0/0无定义）返回NaN而不是报错，调用方据此继续处理。
pub fn cohen_kappa(a: &[u8], b: &[u8]) -> f64 {
    kappa_from(&Confusion::from_labels(a, b))
}

fn kappa_from(c: &Confusion) -> f64 {
    let total = c.total();
    let a_fg = c.both_fg + c.only_a;
    let b_fg = c.both_fg + c.only_b;
    if total == 0 || (a_fg == total && b_fg == total) || (a_fg == 0 && b_fg == 0) {
        return f64::NAN;
    }

    let n = total as f64;
    let observed = (c.both_fg + c.both_bg) as f64 / n;
    let a_bg = total - a_fg;
    let b_bg = total - b_fg;
    let expected = (a_fg as f64 * b_fg as f64 + a_bg as f64 * b_bg as f64) / (n * n);
    (observed - expected) / (1.0 - expected)
}

/// 二分类F1分数，以标签1为正类：`2·TP / (2·TP + FP + FN)`。
///
/// 双方均无前景时分母为0，约定返回0.0。
pub fn f1_score(a: &[u8], b: &[u8]) -> f64 {
    f1_from(&Confusion::from_labels(a, b))
}

fn f1_from(c: &Confusion) -> f64 {
    let denom = 2 * c.both_fg + c.only_a + c.only_b;
    if denom == 0 {
        return 0.0;
    }
    2.0 * c.both_fg as f64 / denom as f64
}
