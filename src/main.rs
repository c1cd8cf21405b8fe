use clap::Parser;
use openai_etl::utils::{logger, validation::Validate};
use openai_etl::{CliArgs, Component, ComponentConfig, DataDir, OpenAiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let data_dir = DataDir::new(&args.data_dir);

    // 載入配置
    let config = match ComponentConfig::from_file(data_dir.config_path()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "❌ Failed to load config '{}': {}",
                data_dir.config_path().display(),
                e
            );
            eprintln!("💡 Make sure the data directory contains a valid config.json");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(args.verbose || config.debug_enabled());

    tracing::info!("Starting openai-etl component");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 建立補全服務客戶端,憑證只存在於客戶端內
    let completion = match OpenAiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    let component = Component::new(data_dir, config, completion);

    match component.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            tracing::info!("📁 Output saved to: {}", output_path);
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Component run failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}
