pub mod cli;

use crate::core::pipeline::RowErrorPolicy;
use crate::utils::error::{ComponentError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Parameter keys as the platform configuration spells them. `print_hello`
// is the historical name of the base-prompt key and is part of the
// published contract.
pub const KEY_API_TOKEN: &str = "#api_token";
pub const KEY_BASE_PROMPT: &str = "print_hello";
pub const KEY_TEXT_COLUMN: &str = "text_column";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ComponentConfig {
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Parameters {
    #[serde(rename = "#api_token")]
    pub api_token: Option<String>,

    #[serde(rename = "print_hello")]
    pub base_prompt: Option<String>,

    pub text_column: Option<String>,

    /// Completion endpoint base URL; defaults to the public OpenAI API.
    pub api_base: Option<String>,

    /// Bounded timeout on each remote call. Absent means no timeout.
    pub request_timeout_seconds: Option<u64>,

    /// "abort" (default) or "skip".
    pub on_row_error: Option<String>,

    pub debug: Option<bool>,
}

impl ComponentConfig {
    /// 從 JSON 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ComponentError::IoError)?;
        Self::from_json_str(&content)
    }

    /// 從 JSON 字串解析配置
    pub fn from_json_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        serde_json::from_str(&processed_content).map_err(|e| ComponentError::ConfigError {
            message: format!("config.json parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn api_token(&self) -> Result<&String> {
        validation::validate_required_field(KEY_API_TOKEN, &self.parameters.api_token)
    }

    pub fn base_prompt(&self) -> Result<&String> {
        validation::validate_required_field(KEY_BASE_PROMPT, &self.parameters.base_prompt)
    }

    pub fn text_column(&self) -> Result<&String> {
        validation::validate_required_field(KEY_TEXT_COLUMN, &self.parameters.text_column)
    }

    pub fn row_error_policy(&self) -> Result<RowErrorPolicy> {
        match self.parameters.on_row_error.as_deref() {
            None => Ok(RowErrorPolicy::default()),
            Some(value) => value.parse(),
        }
    }

    pub fn debug_enabled(&self) -> bool {
        self.parameters.debug.unwrap_or(false)
    }
}

impl Validate for ComponentConfig {
    fn validate(&self) -> Result<()> {
        let api_token = self.api_token()?;
        validation::validate_non_empty_string(KEY_API_TOKEN, api_token)?;

        // The base prompt must be present but may be any string, including
        // an empty one.
        self.base_prompt()?;

        let text_column = self.text_column()?;
        validation::validate_non_empty_string(KEY_TEXT_COLUMN, text_column)?;

        if let Some(api_base) = &self.parameters.api_base {
            validation::validate_url("api_base", api_base)?;
        }

        if let Some(timeout) = self.parameters.request_timeout_seconds {
            validation::validate_range("request_timeout_seconds", timeout, 1, 3600)?;
        }

        self.row_error_policy()?;

        Ok(())
    }
}
