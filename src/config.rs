//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，如 `HIVE__WORKFLOW__MAX_ITERATIONS=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::RetryPolicy;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub workflow: WorkflowSection,
    pub remote: RemoteSection,
}

/// [app] 段：应用名、日志级别
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 未设置 RUST_LOG 时使用的默认级别
    pub log_level: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            log_level: "info".to_string(),
        }
    }
}

/// [llm] 段：后端选择与重试策略（重试由外部模型客户端执行）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：目前仅内置 mock
    pub provider: String,
    pub model: String,
    pub retry: RetryPolicy,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// [workflow] 段：工具轮数上限、工具超时、循环迭代上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    /// 单次 Agent 调用内最多派发的工具次数
    pub max_tool_rounds: usize,
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    /// 演示流水线中 LoopAgent 的迭代上限
    pub max_iterations: usize,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            max_tool_rounds: 5,
            tool_timeout_secs: 30,
            max_iterations: 2,
        }
    }
}

/// [remote] 段：远程 Agent 请求超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    pub request_timeout_secs: u64,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_default_toml() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.retry.attempts, 5);
        assert_eq!(cfg.llm.retry.http_status_codes, vec![429, 500, 503, 504]);
        assert_eq!(cfg.workflow.max_iterations, 2);
        assert_eq!(cfg.workflow.max_tool_rounds, 5);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[workflow]\nmax_iterations = 7\n\n[app]\nlog_level = \"debug\"").unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.workflow.max_iterations, 7);
        assert_eq!(cfg.app.log_level, "debug");
        // 未出现的键保持默认
        assert_eq!(cfg.workflow.tool_timeout_secs, 30);
    }
}
