use crate::domain::model::{TableDefinition, TableManifest};
use crate::utils::error::{ComponentError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk exchange contract with the host platform: `config.json` at the
/// root, input tables under `in/tables/`, outputs under `out/tables/`, run
/// state in `out/state.json`.
#[derive(Debug, Clone)]
pub struct DataDir {
    base_path: PathBuf,
}

impl DataDir {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_path.join("config.json")
    }

    fn in_tables_dir(&self) -> PathBuf {
        self.base_path.join("in").join("tables")
    }

    fn out_tables_dir(&self) -> PathBuf {
        self.base_path.join("out").join("tables")
    }

    /// 列出輸入表(依檔名排序),欄位優先取 manifest,否則讀 CSV 表頭
    pub fn input_tables(&self) -> Result<Vec<TableDefinition>> {
        let dir = self.in_tables_dir();
        if !dir.is_dir() {
            return Err(ComponentError::ProcessingError {
                message: format!("Input tables directory not found: {}", dir.display()),
            });
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map(|ext| ext == "csv").unwrap_or(false))
            .collect();
        paths.sort();

        let mut tables = Vec::new();
        for path in paths {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();
            let columns = self.table_columns(&path)?;
            tables.push(TableDefinition {
                name,
                full_path: path,
                columns,
            });
        }

        Ok(tables)
    }

    fn table_columns(&self, table_path: &Path) -> Result<Vec<String>> {
        let manifest_path = manifest_path_for(table_path);
        if manifest_path.is_file() {
            let content = fs::read_to_string(&manifest_path)?;
            let manifest: TableManifest = serde_json::from_str(&content)?;
            return Ok(manifest.columns);
        }

        let mut reader = csv::Reader::from_path(table_path)?;
        Ok(reader.headers()?.iter().map(str::to_string).collect())
    }

    pub fn create_output_table(&self, name: &str, columns: Vec<String>) -> Result<TableDefinition> {
        let dir = self.out_tables_dir();
        fs::create_dir_all(&dir)?;
        Ok(TableDefinition {
            name: name.to_string(),
            full_path: dir.join(format!("{}.csv", name)),
            columns,
        })
    }

    pub fn write_manifest(&self, table: &TableDefinition) -> Result<()> {
        let manifest = TableManifest {
            columns: table.columns.clone(),
        };
        let path = manifest_path_for(&table.full_path);
        fs::write(&path, serde_json::to_string_pretty(&manifest)?)?;
        tracing::debug!("Manifest written to {}", path.display());
        Ok(())
    }

    pub fn write_state(&self, state: &serde_json::Value) -> Result<()> {
        let out_dir = self.base_path.join("out");
        fs::create_dir_all(&out_dir)?;
        fs::write(out_dir.join("state.json"), serde_json::to_string(state)?)?;
        Ok(())
    }
}

fn manifest_path_for(table_path: &Path) -> PathBuf {
    let mut os_string = table_path.as_os_str().to_os_string();
    os_string.push(".manifest");
    PathBuf::from(os_string)
}
