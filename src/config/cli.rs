use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "openai-etl")]
#[command(about = "Augments a CSV table with OpenAI completions, one row at a time")]
pub struct CliArgs {
    /// Platform data directory (config.json, in/tables, out/tables)
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
