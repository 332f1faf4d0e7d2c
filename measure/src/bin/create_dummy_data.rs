use agreement::prelude::save_volume;
use clap::Parser;
use ndarray::Array3;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "create_dummy_data")]
#[command(about = "生成用于测试的假标注数据目录.")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 输出根目录。
    #[arg(long = "base_dir", default_value = "dummy_data")]
    base_dir: PathBuf,
    /// 医生数量。
    #[arg(long = "num_doctors", default_value_t = 3)]
    num_doctors: usize,
    /// 病人数量。
    #[arg(long = "num_patients", default_value_t = 3)]
    num_patients: usize,
    /// 随机种子。
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl Cli {
    fn run_program(&self) -> anyhow::Result<()> {
        if self.base_dir.exists() {
            println!(
                "Directory '{}' already exists. Skipping creation.",
                self.base_dir.display()
            );
            return Ok(());
        }
        fs::create_dir_all(self.base_dir.as_path())?;
        println!("Created base directory: {}", self.base_dir.display());

        let mut rng = SimpleRng::new(self.seed);
        let mut dir = self.base_dir.clone();
        for i in 1..=self.num_doctors {
            for j in 1..=self.num_patients {
                // 并非每位医生都标注了所有病人。
                if rng.next_f64() <= 0.3 {
                    continue;
                }
                dir.extend([
                    format!("doctor{i}"),
                    format!("patient{j}"),
                    "segmentation".to_owned(),
                ]);
                fs::create_dir_all(dir.as_path())?;
                dir.push("segmentation.seg.nii");
                save_volume(dir.as_path(), &noisy_sphere(&mut rng))?;
                println!("Created dummy file: {}", dir.display());
                for _ in 0..4 {
                    dir.pop();
                }
            }
        }
        Ok(())
    }
}

/// 10x10x10体数据：以(4,4,4)为球心、半径3的球标为1，再叠加逐体素伯努利噪声。
fn noisy_sphere(rng: &mut SimpleRng) -> Array3<u8> {
    let mut data = Array3::<u8>::zeros((10, 10, 10));
    for ((x, y, z), v) in data.indexed_iter_mut() {
        let (dx, dy, dz) = (x as i64 - 4, y as i64 - 4, z as i64 - 4);
        let inside = u8::from(dx * dx + dy * dy + dz * dz <= 9);
        let noise = (rng.next_u64() & 1) as u8;
        *v = inside ^ noise;
    }
    data
}

/// 极简确定性伪随机数生成器（xoshiro256**算法）。
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cmd = Cli::parse();
    match cmd.run_program() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
