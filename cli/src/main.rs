use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use uti_core::demo::{demo_cases, DemoCase};
use uti_core::{evaluate, CaseRecord, Evaluation, RuleConfig, RuleOverrides};

mod logging;

#[derive(Parser, Debug)]
#[command(
    name = "uti-cli",
    about = "Đánh giá tiêu chí giám sát UTI từ ca bệnh JSON hoặc resource FHIR."
)]
struct Args {
    /// Tăng mức log (-v: debug, -vv: trace). `RUST_LOG` được ưu tiên nếu có.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// File JSON chứa cấu hình ngưỡng (có thể chỉ ghi một phần).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Đánh giá một ca bệnh, một Patient hoặc một Bundle FHIR.
    Evaluate {
        /// Đường dẫn tới file JSON đầu vào.
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Chạy bộ ca mẫu và in bảng so sánh với nhãn kỳ vọng.
    Demo {
        /// Đi qua Patient FHIR dựng từ ca mẫu thay vì gọi trực tiếp engine.
        #[arg(long)]
        fhir: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Evaluate { input } => run_evaluate(&input, &config),
        Command::Demo { fhir } => run_demo(&config, fhir),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RuleConfig> {
    let Some(path) = path else {
        return Ok(RuleConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file cấu hình {path:?}"))?;
    let overrides: RuleOverrides = serde_json::from_str(&data)
        .with_context(|| format!("File cấu hình {path:?} không hợp lệ"))?;
    let config = RuleConfig::default().with_overrides(overrides);
    debug!(?config, "loaded rule config");
    Ok(config)
}

fn run_evaluate(input: &Path, config: &RuleConfig) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Không đọc được file {input:?}"))?;
    let value: Value =
        serde_json::from_str(&data).with_context(|| format!("File {input:?} không phải JSON"))?;

    let output = match value.get("resourceType").and_then(Value::as_str) {
        Some(kind) => {
            info!(resource_type = kind, "evaluating FHIR resource");
            let results = uti_fhir::evaluate_resource_value(&value, config)
                .with_context(|| format!("Không đánh giá được resource {kind}"))?;
            serde_json::to_string_pretty(&results)?
        }
        None => {
            let case = CaseRecord::from_json_value(&value)
                .with_context(|| format!("Ca bệnh trong {input:?} không hợp lệ"))?;
            serde_json::to_string_pretty(&evaluate(&case, config))?
        }
    };

    println!("{output}");
    Ok(())
}

fn run_demo(config: &RuleConfig, via_fhir: bool) -> anyhow::Result<()> {
    println!(
        "{:<16} {:<8} {:<8} {:<6} {:<12} {:<9} main reason",
        "case", "expected", "got", "match", "infection", "catheter"
    );

    let mut mismatches = 0usize;
    for demo in demo_cases() {
        let evaluation = evaluate_demo(&demo, config, via_fhir)?;
        let decision = &evaluation.decision;
        let got = decision.outcome_label();
        let matched = got == demo.expected;
        if !matched {
            mismatches += 1;
        }

        let infection = decision
            .infection_day
            .map_or_else(|| "-".to_string(), |day| day.to_string());
        let catheter = match decision.has_catheter {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };

        println!(
            "{:<16} {:<8} {:<8} {:<6} {:<12} {:<9} {}",
            demo.title,
            demo.expected,
            got,
            if matched { "OK" } else { "FAIL" },
            infection,
            catheter,
            decision.main_reason()
        );
    }

    if mismatches > 0 {
        bail!("{mismatches} ca mẫu không khớp nhãn kỳ vọng");
    }
    Ok(())
}

fn evaluate_demo(demo: &DemoCase, config: &RuleConfig, via_fhir: bool) -> anyhow::Result<Evaluation> {
    if via_fhir {
        let patient = uti_fhir::build_demo_patient(demo.title, "other", &demo.input)
            .with_context(|| format!("Không dựng được Patient cho {}", demo.id))?;
        return uti_fhir::evaluate_patient(&patient, config)
            .with_context(|| format!("Không đánh giá được Patient {}", demo.id));
    }

    let case = demo
        .input
        .validate()
        .with_context(|| format!("Ca mẫu {} không hợp lệ", demo.id))?;
    Ok(evaluate(&case, config))
}
