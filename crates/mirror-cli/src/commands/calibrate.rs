use super::utils;
use anyhow::{Context, Result, bail};
use mirror_core::calibration::CalibrationResult;
use mirror_core::catalog::Recommendation;
use mirror_core::session::SessionState;
use mirror_infrastructure::ConfigService;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CalibrationOutput<'a> {
    input_text: &'a str,
    result: &'a CalibrationResult,
    recommendation: &'a Recommendation,
}

pub async fn run(config_service: &ConfigService, text: &str, json: bool) -> Result<()> {
    let app = utils::app(config_service)?;
    let state = app
        .usecase
        .calibrate(text)
        .await
        .context("Calibration was not started")?;

    match &state {
        SessionState::Ready {
            result,
            recommendation,
        } => {
            if json {
                let output = CalibrationOutput {
                    input_text: text.trim(),
                    result,
                    recommendation,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_result(result, recommendation);
            }
            Ok(())
        }
        SessionState::Failed { error } => {
            if let Some(raw) = error.raw_response() {
                tracing::debug!(raw = %raw, "Rejected backend answer");
            }
            bail!("{}", error.user_message())
        }
        other => bail!("Calibration ended in unexpected state: {}", other.name()),
    }
}

fn print_result(result: &CalibrationResult, recommendation: &Recommendation) {
    println!("🔍 Frequency scan\n   {}\n", result.frequency_scan);
    println!("🪞 Illusion stripping\n   {}\n", result.illusion_stripping);
    println!("🪜 Five steps");
    for (i, step) in result.five_steps.iter().enumerate() {
        println!("   {}. {}", i + 1, step);
    }
    println!();
    println!("⚓ Action anchor\n   {}\n", result.action_anchor);
    let entries = [
        ("📖", recommendation.book_entry()),
        ("🎵", recommendation.track_entry()),
    ];
    for (icon, entry) in &entries {
        match entry.resource_ref() {
            Some(url) => println!("{} {} <{}>", icon, entry.title(), url),
            None => println!("{} {} ({})", icon, entry.title(), recommendation.book.author),
        }
    }
}
