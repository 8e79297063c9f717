use clap::Parser;
use lti_outcomes_export::adapters::gradebook::load_for_action;
use lti_outcomes_export::domain::ports::ConfigProvider;
use lti_outcomes_export::utils::{logger, validation::Validate};
use lti_outcomes_export::{
    Action, CliConfig, ExportEngine, ExportReport, LocalStorage, LtiError, LtiExportPlugin,
};

fn fail(e: &LtiError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ LTI export failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}

fn print_report(report: &ExportReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("✅ LTI {} completed successfully!", report.action);
    if let Some(score) = report.score_sent {
        println!("📤 Score sent: {}", score);
    }
    if let Some(score) = report.score_returned {
        println!("📥 Score on the server: {}", score);
    }
    if let Some(path) = &report.output_path {
        println!("📁 Response saved to: {}", path);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting lti-export CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    let action: Action = match config.action().parse() {
        Ok(action) => action,
        Err(e) => fail(&e),
    };

    let storage = LocalStorage::new(".".to_string());
    let gradebook = match load_for_action(&storage, &config.gradebook, action).await {
        Ok(gradebook) => gradebook,
        Err(e) => fail(&e),
    };

    let json = config.json_logs;
    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    match engine.run(gradebook.as_ref()).await {
        Ok(report) => print_report(&report, json)?,
        Err(e) => fail(&e),
    }

    Ok(())
}
