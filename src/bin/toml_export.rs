use clap::Parser;
use lti_outcomes_export::adapters::gradebook::load_for_action;
use lti_outcomes_export::domain::ports::ConfigProvider;
use lti_outcomes_export::utils::{logger, validation::Validate};
use lti_outcomes_export::{Action, ExportEngine, LocalStorage, LtiError, LtiExportPlugin, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-export")]
#[command(about = "LTI outcomes export with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "lti-export.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Override the action from config (read, replace, delete)
    #[arg(long)]
    action: Option<String>,

    /// Override the response output file from config
    #[arg(long)]
    to: Option<String>,

    /// Dry run - show what would be sent without contacting the outcome service
    #[arg(long)]
    dry_run: bool,
}

fn fail(e: &LtiError) -> ! {
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

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Export summary:");
    tracing::info!("  - Outcome service: {}", config.outcome_service_url());
    tracing::info!("  - Action: {}", config.action().trim());
    tracing::info!("  - Assignment: {}", config.assignment());
    tracing::info!("  - Student: {}", config.student_id());
    tracing::info!("  - Gradebook: {}", config.gradebook_path());
    match config.output_path() {
        Some(path) => tracing::info!("  - Response file: {}", path),
        None => tracing::info!("  - Response file: (none)"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_logger(args.verbose, args.json_logs);

    tracing::info!("🚀 Starting TOML-based LTI export");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(action) = args.action {
        tracing::info!("🔧 Action overridden to: {}", action);
        config.export.action = action;
    }
    if let Some(to) = args.to {
        tracing::info!("🔧 Response file overridden to: {}", to);
        config.export.to = Some(to);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config);

    let action: Action = match config.action().parse() {
        Ok(action) => action,
        Err(e) => fail(&e),
    };

    let storage = LocalStorage::new(".".to_string());
    let gradebook_path = config.gradebook_path().to_string();
    let gradebook = match load_for_action(&storage, &gradebook_path, action).await {
        Ok(gradebook) => gradebook,
        Err(e) => fail(&e),
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be sent");
        if action == Action::Replace {
            match gradebook.find_submission(config.assignment(), config.student_id()) {
                Ok(submission) => println!("Would send score {} for {}", submission.score, action),
                Err(e) => fail(&e),
            }
        } else {
            println!("Would send a {} request", action);
        }
        return Ok(());
    }

    let engine = ExportEngine::new(LtiExportPlugin::new(storage, config));

    match engine.run(gradebook.as_ref()).await {
        Ok(report) => {
            if args.json_logs {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("✅ LTI {} completed successfully!", report.action);
                if let Some(score) = report.score_returned {
                    println!("📥 Score on the server: {}", score);
                }
            }
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
