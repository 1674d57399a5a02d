//! 演示流水线：博客写作（顺序）、每日简报（并行 + 汇总）、故事打磨（有界循环）、研究协调（agent-as-tool）
//!
//! 每个构造函数接收 `models`：按 Agent 名返回模型客户端，便于为不同 Agent 注入不同后端（测试中为脚本客户端）。

use std::sync::Arc;

use crate::config::WorkflowSection;
use crate::core::WorkflowError;
use crate::llm::LlmClient;
use crate::tools::ExitLoopTool;
use crate::workflow::{AgentBuilder, LoopAgent, ParallelAgent, SequentialAgent, Unit};

/// 可用的流水线名
pub const PIPELINES: [&str; 4] = ["blog", "briefing", "story", "coordinator"];

/// 各流水线的示例输入
pub fn default_prompt(pipeline: &str) -> Option<&'static str> {
    match pipeline {
        "blog" => Some("Write a blog post about the benefits of multi-agent systems for software developers"),
        "briefing" => Some("Run the daily executive briefing on Tech, Health, and Finance"),
        "story" => Some("Write a short story about a lighthouse keeper who discovers a mysterious, glowing map"),
        "coordinator" => Some("What are the latest advancements in quantum computing and what do they mean for AI?"),
        _ => None,
    }
}

/// 按名称构建流水线
pub fn build<F>(pipeline: &str, models: &F, cfg: &WorkflowSection) -> Result<Arc<dyn Unit>, WorkflowError>
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    match pipeline {
        "blog" => blog_pipeline(models, cfg),
        "briefing" => research_briefing(models, cfg),
        "story" => story_refinement(models, cfg),
        "coordinator" => research_coordinator(models, cfg),
        other => Err(WorkflowError::InvalidConfiguration(format!(
            "unknown pipeline `{other}` (expected one of {})",
            PIPELINES.join(", ")
        ))),
    }
}

fn agent<F>(name: &str, models: &F, cfg: &WorkflowSection) -> AgentBuilder
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    AgentBuilder::new(name).with_defaults(cfg).model(models(name))
}

/// 大纲 -> 写作 -> 编辑
pub fn blog_pipeline<F>(models: &F, cfg: &WorkflowSection) -> Result<Arc<dyn Unit>, WorkflowError>
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    let outline = agent("OutlineAgent", models, cfg)
        .description("Creates the initial blog post outline.")
        .instruction(
            "Create a blog outline for the given topic with:\n\
             1. A catchy headline\n\
             2. An introduction hook\n\
             3. 3-5 main sections with 2-3 bullet points for each\n\
             4. A concluding thought",
        )
        .output_slot("blog_outline")
        .build_unit()?;

    let writer = agent("WriterAgent", models, cfg)
        .description("Writes the full blog post from the outline.")
        .instruction(
            "Following this outline strictly: {blog_outline}\n\
             Write a brief, 200 to 300-word blog post with an engaging and informative tone.",
        )
        .output_slot("blog_draft")
        .build_unit()?;

    let editor = agent("EditorAgent", models, cfg)
        .description("Edits and polishes the draft.")
        .instruction(
            "Edit this draft: {blog_draft}\n\
             Polish the text by fixing grammatical errors, improving the flow and sentence structure, \
             and enhancing overall clarity.",
        )
        .output_slot("final_blog")
        .build_unit()?;

    Ok(Arc::new(SequentialAgent::new("BlogPipeline", vec![outline, writer, editor])))
}

/// 三个研究员并行，随后汇总为执行摘要
pub fn research_briefing<F>(models: &F, cfg: &WorkflowSection) -> Result<Arc<dyn Unit>, WorkflowError>
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    let tech = agent("TechResearcher", models, cfg)
        .instruction(
            "Research the latest AI/ML trends. Include 3 key developments, the main companies involved, \
             and the potential impact. Keep the report very concise (100 words).",
        )
        .output_slot("tech_research")
        .build_unit()?;

    let health = agent("HealthResearcher", models, cfg)
        .instruction(
            "Research recent medical breakthroughs. Include 3 significant advances, their practical \
             applications, and estimated timelines. Keep the report concise (100 words).",
        )
        .output_slot("health_research")
        .build_unit()?;

    let finance = agent("FinanceResearcher", models, cfg)
        .instruction(
            "Research current fintech trends. Include 3 key trends, their market implications, \
             and the future outlook. Keep the report concise (100 words).",
        )
        .output_slot("finance_research")
        .build_unit()?;

    let aggregator = agent("AggregatorAgent", models, cfg)
        .instruction(
            "Combine these three research findings into a single executive summary:\n\n\
             **Technology Trends:**\n{tech_research}\n\n\
             **Health Breakthroughs:**\n{health_research}\n\n\
             **Finance Innovations:**\n{finance_research}\n\n\
             Highlight common themes, surprising connections, and the most important takeaways. \
             The final summary should be around 200 words.",
        )
        .output_slot("executive_summary")
        .build_unit()?;

    let team: Arc<dyn Unit> = Arc::new(ParallelAgent::new(
        "ParallelResearchTeam",
        vec![tech, health, finance],
    ));
    Ok(Arc::new(SequentialAgent::new("ResearchSystem", vec![team, aggregator])))
}

/// 初稿 -> 循环 [评审 -> 修改或 exit_loop]
pub fn story_refinement<F>(models: &F, cfg: &WorkflowSection) -> Result<Arc<dyn Unit>, WorkflowError>
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    let initial_writer = agent("InitialWriterAgent", models, cfg)
        .instruction(
            "Based on the user's prompt, write the first draft of a short story (around 100-150 words).\n\
             Output only the story text, with no introduction or explanation.",
        )
        .output_slot("current_story")
        .build_unit()?;

    let critic = agent("CriticAgent", models, cfg)
        .instruction(
            "You are a constructive story critic. Review the story provided below.\n\
             Story: {current_story}\n\n\
             Evaluate the story's plot, characters, and pacing.\n\
             - If the story is well-written and complete, you MUST respond with the exact phrase: \"APPROVED\"\n\
             - Otherwise, provide 2-3 specific, actionable suggestions for improvement.",
        )
        .output_slot("critique")
        .build_unit()?;

    let refiner = agent("RefinerAgent", models, cfg)
        .instruction(
            "You are a story refiner. You have a story draft and critique.\n\n\
             Story Draft: {current_story}\n\
             Critique: {critique}\n\n\
             - IF the critique is EXACTLY \"APPROVED\", you MUST call the `exit_loop` function and nothing else.\n\
             - OTHERWISE, rewrite the story draft to fully incorporate the feedback from the critique.",
        )
        .tool(ExitLoopTool)
        .output_slot("current_story")
        .build_unit()?;

    let refinement: Arc<dyn Unit> = Arc::new(LoopAgent::new(
        "StoryRefinementLoop",
        vec![critic, refiner],
        cfg.max_iterations,
    )?);
    Ok(Arc::new(SequentialAgent::new("StoryPipeline", vec![initial_writer, refinement])))
}

/// 协调者把研究员与摘要员当作工具调用
pub fn research_coordinator<F>(models: &F, cfg: &WorkflowSection) -> Result<Arc<dyn Unit>, WorkflowError>
where
    F: Fn(&str) -> Arc<dyn LlmClient>,
{
    let researcher = agent("ResearchAgent", models, cfg)
        .description("Finds 2-3 pieces of relevant information on a topic, with citations.")
        .instruction(
            "You are a specialized research agent. Find 2-3 pieces of relevant information on the given \
             topic and present the findings with citations.",
        )
        .output_slot("research_findings")
        .build_unit()?;

    let summarizer = agent("SummarizerAgent", models, cfg)
        .description("Summarizes the research findings as a bulleted list.")
        .instruction(
            "Read the provided research findings: {research_findings}\n\
             Create a concise summary as a bulleted list with 3-5 key points.",
        )
        .output_slot("final_summary")
        .build_unit()?;

    agent("ResearchCoordinator", models, cfg)
        .instruction(
            "You are a research coordinator. Answer the user's query by orchestrating a workflow.\n\
             1. First, you MUST call the `ResearchAgent` tool to find relevant information on the topic.\n\
             2. Next, after receiving the research findings, you MUST call the `SummarizerAgent` tool.\n\
             3. Finally, present the final summary clearly to the user as your response.",
        )
        .agent_tool(researcher)
        .agent_tool(summarizer)
        .output_slot("coordinator_response")
        .build_unit()
}
