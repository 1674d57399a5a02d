//! Hive - 命令行入口
//!
//! 用法：`hive <blog|briefing|story|coordinator> [prompt]`；加载配置、初始化日志、构建流水线并运行，结果以 JSON 打印。

use std::sync::Arc;

use anyhow::Context;
use hive::config::{load_config, AppConfig};
use hive::core::Runner;
use hive::llm::{create_llm_from_config, LlmClient};
use hive::{observability, pipelines};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(pipeline) = args.next() else {
        anyhow::bail!(
            "usage: hive <{}> [prompt]",
            pipelines::PIPELINES.join("|")
        );
    };
    let rest: Vec<String> = args.collect();

    // 配置文件缺失时回退到默认值
    let cfg = load_config(None).unwrap_or_else(|e| {
        eprintln!("config not loaded ({e}), using defaults");
        AppConfig::default()
    });
    observability::init(&cfg.app.log_level);

    let llm = create_llm_from_config(&cfg.llm).context("Failed to create LLM client")?;
    let models = |_: &str| -> Arc<dyn LlmClient> { Arc::clone(&llm) };
    let root = pipelines::build(&pipeline, &models, &cfg.workflow)
        .with_context(|| format!("Failed to build pipeline `{pipeline}`"))?;
    let runner = Runner::new(root).context("Invalid workflow")?;

    let prompt = if rest.is_empty() {
        pipelines::default_prompt(&pipeline)
            .unwrap_or_default()
            .to_string()
    } else {
        rest.join(" ")
    };

    let output = runner.run(&prompt).await.context("Workflow run failed")?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
