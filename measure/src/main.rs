use agreement::prelude::{calculate_agreement, find_segmentations, write_scores};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "measure_agreement")]
#[command(about = "计算多位医生对同一病人分割标注的一致性评分.")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 数据根目录。
    #[arg(long = "data_dir")]
    data_dir: PathBuf,
    /// 输出CSV文件路径。
    #[arg(long = "output_file", default_value = "agreement_scores.csv")]
    output_file: PathBuf,
}

impl Cli {
    fn run_program(&self) -> anyhow::Result<()> {
        let patients = find_segmentations(self.data_dir.as_path())
            .with_context(|| format!("scanning `{}`", self.data_dir.display()))?;
        let results = calculate_agreement(&patients);

        if results.is_empty() {
            println!("No pairs found to compare.");
            return Ok(());
        }
        write_scores(self.output_file.as_path(), &results)
            .with_context(|| format!("saving `{}`", self.output_file.display()))?;
        println!("Results saved to {}", self.output_file.display());
        Ok(())
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
