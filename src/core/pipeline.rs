use crate::core::prompt::build_prompt;
use crate::core::response::decode_output;
use crate::core::{Completion, Row, OUTPUT_COLUMN};
use crate::utils::error::{ComponentError, Result};
use std::io;
use std::path::Path;
use std::str::FromStr;

/// 列處理失敗時的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowErrorPolicy {
    /// First failure aborts the whole run. Partial output stays on disk and
    /// no manifest is written.
    #[default]
    Abort,
    /// Log the failure, count it and continue with the next row.
    SkipAndRecord,
}

impl FromStr for RowErrorPolicy {
    type Err = ComponentError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::SkipAndRecord),
            other => Err(ComponentError::InvalidConfigValueError {
                field: "on_row_error".to_string(),
                value: other.to_string(),
                reason: "expected \"abort\" or \"skip\"".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RowReport {
    pub rows_written: usize,
    pub rows_skipped: usize,
}

/// Sequential per-row loop: extract text value, build prompt, await the
/// completion, decode, write the augmented row.
pub struct RowPipeline<C: Completion> {
    completion: C,
    text_column: String,
    base_prompt: String,
    on_row_error: RowErrorPolicy,
}

impl<C: Completion> RowPipeline<C> {
    pub fn new(
        completion: C,
        text_column: impl Into<String>,
        base_prompt: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            text_column: text_column.into(),
            base_prompt: base_prompt.into(),
            on_row_error: RowErrorPolicy::default(),
        }
    }

    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.on_row_error = policy;
        self
    }

    /// 逐列處理,一次只有一個補全請求在途,輸出順序等於輸入順序
    ///
    /// Each output row is written and flushed before the next input row is
    /// read; the output carries no header row, the manifest holds the
    /// schema.
    pub async fn process<R: io::Read, W: io::Write>(
        &self,
        reader: &mut csv::Reader<R>,
        writer: &mut csv::Writer<W>,
        output_columns: &[String],
    ) -> Result<RowReport> {
        let headers = reader.headers()?.clone();
        let mut report = RowReport::default();

        for record in reader.records() {
            let record = record?;
            let row = Row::from_headers(&headers, &record);

            match self.process_row(&row).await {
                Ok(output) => {
                    writer.write_record(merge_row(&row, &output, output_columns))?;
                    writer.flush()?;
                    report.rows_written += 1;
                }
                Err(e) if self.on_row_error == RowErrorPolicy::SkipAndRecord => {
                    tracing::warn!(
                        "Skipping row {}: {}",
                        report.rows_written + report.rows_skipped + 1,
                        e
                    );
                    report.rows_skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        writer.flush()?;
        Ok(report)
    }

    pub async fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        in_path: P,
        out_path: Q,
        output_columns: &[String],
    ) -> Result<RowReport> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(in_path)?;
        let mut writer = csv::Writer::from_path(out_path)?;
        self.process(&mut reader, &mut writer, output_columns).await
    }

    /// 缺少文字欄位時以空訊息代替,仍然輸出該列
    async fn process_row(&self, row: &Row) -> Result<serde_json::Value> {
        let message = row.get(&self.text_column).unwrap_or_default();
        let prompt = build_prompt(&self.base_prompt, message);

        tracing::debug!("Requesting completion for a {} byte prompt", prompt.len());
        let completion = self.completion.complete(&prompt).await?;

        decode_output(&completion)
    }
}

fn merge_row(row: &Row, output: &serde_json::Value, output_columns: &[String]) -> Vec<String> {
    output_columns
        .iter()
        .map(|column| {
            if column == OUTPUT_COLUMN {
                output.to_string()
            } else {
                row.get(column).unwrap_or_default().to_string()
            }
        })
        .collect()
}
