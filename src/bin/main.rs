use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use clap::Parser;
use esp_partition_gen::{
    FlashLayout,
    PartitionPlan,
    PartitionTable,
};
use log::{
    error,
    info,
};

#[derive(Parser)]
#[command(name = "esp-partition-gen")]
#[command(
    about = "Generate an ESP-IDF partition table with two equally sized OTA app slots",
    long_about = None
)]
struct Cli {
    /// TOML file with layout sizes (missing keys use the 4 MiB reference layout)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Offset of the NVS partition
    #[arg(long, value_parser = parse_size)]
    start: Option<u32>,

    /// System part of the NVS partition
    #[arg(long, value_parser = parse_size)]
    nvs_system_size: Option<u32>,

    /// User part of the NVS partition
    #[arg(long, value_parser = parse_size)]
    nvs_user_size: Option<u32>,

    /// Size of the OTA data partition
    #[arg(long, value_parser = parse_size)]
    ota_data_size: Option<u32>,

    /// Size of the SPIFFS partition
    #[arg(long, value_parser = parse_size)]
    filesystem_size: Option<u32>,

    /// Total flash size
    #[arg(long, value_parser = parse_size)]
    flash_size: Option<u32>,

    /// Write the table to this file instead of stdout
    #[arg(short, long, conflicts_with = "check")]
    output: Option<PathBuf>,

    /// Compare an existing table against the generated one instead of printing
    #[arg(long)]
    check: Option<PathBuf>,
}

impl Cli {
    fn flash_layout(&self) -> Result<FlashLayout, esp_partition_gen::Error> {
        let mut layout = match &self.layout {
            Some(path) => FlashLayout::from_toml_file(path)?,
            None => FlashLayout::default(),
        };

        let overrides = [
            (self.start, &mut layout.start),
            (self.nvs_system_size, &mut layout.nvs_system_size),
            (self.nvs_user_size, &mut layout.nvs_user_size),
            (self.ota_data_size, &mut layout.ota_data_size),
            (self.filesystem_size, &mut layout.filesystem_size),
            (self.flash_size, &mut layout.total_flash_size),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }

        Ok(layout)
    }
}

fn parse_size(s: &str) -> Result<u32, String> {
    esp_partition_gen::parse_size(s).map_err(|e| e.to_string())
}

fn check(plan: &PartitionPlan, path: &Path) -> Result<bool, esp_partition_gen::Error> {
    let table = PartitionTable::from_csv_file(path)?;
    if table.matches(plan) {
        info!("{} matches the generated layout", path.display());
        return Ok(true);
    }

    let expected = plan.entries();
    if table.entries.len() != expected.len() {
        error!(
            "{} has {} partitions, expected {}",
            path.display(),
            table.entries.len(),
            expected.len()
        );
    }
    for (found, expected) in table.entries.iter().zip(&expected) {
        if found != expected {
            error!("found {}, expected {}", found, expected);
        }
    }

    Ok(false)
}

fn run(cli: &Cli) -> Result<ExitCode, esp_partition_gen::Error> {
    let plan = cli.flash_layout()?.compute_plan()?;

    if let Some(path) = &cli.check {
        return Ok(if check(&plan, path)? {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    match &cli.output {
        Some(path) => {
            plan.to_csv_file(path)?;
            info!("Wrote partition table to {}", path.display());
        }
        None => plan.write_csv(io::stdout().lock())?,
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    run(&cli).unwrap_or_else(|e| {
        error!("{}", e);
        ExitCode::FAILURE
    })
}
