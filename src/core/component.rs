use crate::adapters::DataDir;
use crate::config::ComponentConfig;
use crate::core::pipeline::RowPipeline;
use crate::core::{Completion, OUTPUT_COLUMN};
use crate::utils::error::{ComponentError, Result};

/// Base prompt value that triggers a user-facing failure on purpose. Kept
/// as a diagnostic hook for exercising the error path on the platform.
const RAISE_EXCEPTION_SENTINEL: &str = "raise_exception";

/// Every run produces one table under this name.
const OUTPUT_TABLE_NAME: &str = "analyzed_output";

/// One batch run: state marker, input table resolution, row pipeline,
/// output manifest.
pub struct Component<C: Completion> {
    data_dir: DataDir,
    config: ComponentConfig,
    completion: C,
}

impl<C: Completion> Component<C> {
    pub fn new(data_dir: DataDir, config: ComponentConfig, completion: C) -> Self {
        Self {
            data_dir,
            config,
            completion,
        }
    }

    /// 執行一次完整的批次轉換,回傳輸出表路徑
    pub async fn run(self) -> Result<String> {
        tracing::info!("state file");
        let now = chrono::Local::now();
        self.data_dir.write_state(&serde_json::json!({
            "some_state_parameter": now.format("%H:%M:%S").to_string(),
        }))?;

        let text_column = self.config.text_column()?.clone();
        let base_prompt = self.config.base_prompt()?.clone();

        if base_prompt == RAISE_EXCEPTION_SENTINEL {
            return Err(ComponentError::UserError {
                message: "This is a user exception".to_string(),
            });
        }

        let input_tables = self.data_dir.input_tables()?;
        let input_table =
            input_tables
                .first()
                .ok_or_else(|| ComponentError::ProcessingError {
                    message: "No input table found under in/tables".to_string(),
                })?;
        tracing::info!("Processing input table: {}", input_table.name);

        let mut output_columns = input_table.columns.clone();
        output_columns.push(OUTPUT_COLUMN.to_string());

        let output_table = self
            .data_dir
            .create_output_table(OUTPUT_TABLE_NAME, output_columns)?;

        let pipeline = RowPipeline::new(self.completion, text_column, base_prompt)
            .with_row_error_policy(self.config.row_error_policy()?);

        let report = pipeline
            .process_file(
                &input_table.full_path,
                &output_table.full_path,
                &output_table.columns,
            )
            .await?;

        tracing::info!(
            "Wrote {} rows ({} skipped)",
            report.rows_written,
            report.rows_skipped
        );

        // Manifest is only written once the whole table made it out.
        self.data_dir.write_manifest(&output_table)?;

        Ok(output_table.full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct CountingCompletion {
        calls: Arc<AtomicUsize>,
        reply: String,
    }

    impl CountingCompletion {
        fn new(reply: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: Arc::clone(&calls),
                    reply: reply.to_string(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl Completion for CountingCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn config(base_prompt: &str) -> ComponentConfig {
        let mut config = ComponentConfig::default();
        config.parameters.api_token = Some("sk-test".to_string());
        config.parameters.base_prompt = Some(base_prompt.to_string());
        config.parameters.text_column = Some("msg".to_string());
        config
    }

    fn data_dir_with_input(temp: &TempDir, input_csv: &str) -> DataDir {
        let base = temp.path();
        std::fs::create_dir_all(base.join("in").join("tables")).unwrap();
        std::fs::write(base.join("in").join("tables").join("messages.csv"), input_csv).unwrap();
        DataDir::new(base)
    }

    #[tokio::test]
    async fn test_sentinel_base_prompt_fails_before_any_completion_call() {
        let temp = TempDir::new().unwrap();
        let data_dir = data_dir_with_input(&temp, "id,msg\n1,hello\n");
        let (completion, calls) = CountingCompletion::new("null");

        let component = Component::new(data_dir, config("raise_exception"), completion);
        let err = component.run().await.unwrap_err();

        assert!(matches!(err, ComponentError::UserError { .. }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // The state marker is written before the sentinel check fires.
        assert!(temp.path().join("out").join("state.json").exists());
    }

    #[tokio::test]
    async fn test_missing_input_table_is_a_processing_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("in").join("tables")).unwrap();
        let data_dir = DataDir::new(temp.path());
        let (completion, calls) = CountingCompletion::new("null");

        let component = Component::new(data_dir, config("Echo"), completion);
        let err = component.run().await.unwrap_err();

        assert!(matches!(err, ComponentError::ProcessingError { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_writes_table_manifest_and_state() {
        let temp = TempDir::new().unwrap();
        let data_dir = data_dir_with_input(&temp, "id,msg\n1,hello\n2,world\n");
        let (completion, calls) = CountingCompletion::new(r#"{"ok": true}"#);

        let component = Component::new(data_dir, config("Echo"), completion);
        let output_path = component.run().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(output_path.ends_with("analyzed_output.csv"));

        let out_dir = temp.path().join("out");
        assert!(out_dir.join("state.json").exists());
        assert!(out_dir.join("tables").join("analyzed_output.csv").exists());

        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(
                out_dir.join("tables").join("analyzed_output.csv.manifest"),
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(
            manifest["columns"],
            serde_json::json!(["id", "msg", "open_ai_output"])
        );
    }
}
