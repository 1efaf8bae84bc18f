//! Advisify MCP Server implementation

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use advisify::core::query::MAX_TITLE_CHARS;
use advisify::{AdvisifyError, Config, HtpEmbedder, Query, RecommendationEngine, PROJECT_TYPES};

/// Parameters for recommend_advisers tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecommendParams {
    /// Thesis title (e.g., "Optimizing Machine Learning Models for Predicting Crop Yields")
    #[schemars(description = "Thesis title, at most 300 characters")]
    #[serde(default)]
    pub title: String,
    /// General project types, in order of relevance
    #[schemars(description = "Optional project types, e.g. [\"Web App\", \"IoT System\"]")]
    #[serde(default)]
    pub project_types: Vec<String>,
    /// Maximum number of advisers to return
    #[schemars(description = "Maximum number of advisers (default from config, usually 5)")]
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Parameters for list_advisers tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListAdvisersParams {
    /// Maximum number of results (default: 50)
    #[schemars(description = "Maximum results (default: 50)")]
    #[serde(default = "default_list_limit")]
    pub limit: usize,
}

fn default_list_limit() -> usize {
    50
}

/// Recommendation for JSON output
#[derive(Debug, Serialize)]
struct RecommendationJson {
    rank: usize,
    name: String,
    expertise_description: String,
    past_thesis_topics: String,
    expertise_similarity: f32,
    past_thesis_similarity: f32,
    overall_similarity: f32,
}

/// Adviser info for JSON output
#[derive(Debug, Serialize)]
struct AdviserInfoJson<'a> {
    name: &'a str,
    expertise_description: &'a str,
    past_thesis_topics: &'a str,
}

/// Advisify MCP Service
///
/// The engine is built once at startup and shared by every tool call.
#[derive(Clone)]
pub struct AdvisifyService {
    engine: Arc<RecommendationEngine<HtpEmbedder>>,
    top_k: usize,
    timeout: Duration,
    tool_router: ToolRouter<Self>,
}

impl AdvisifyService {
    pub fn new(engine: RecommendationEngine<HtpEmbedder>, config: &Config) -> Self {
        Self {
            engine: Arc::new(engine),
            top_k: config.top_k,
            timeout: Duration::from_millis(config.embed_timeout_ms),
            tool_router: Self::tool_router(),
        }
    }

    /// Run `recommend` off the async runtime, bounded by the embed timeout
    async fn recommend(
        &self,
        query: Query,
        limit: usize,
    ) -> Result<Vec<RecommendationJson>, McpError> {
        let engine = self.engine.clone();
        let task = tokio::task::spawn_blocking(move || {
            engine.recommend(&query, limit).map(|ranked| {
                ranked
                    .into_iter()
                    .enumerate()
                    .map(|(i, r)| RecommendationJson {
                        rank: i + 1,
                        name: r.adviser.name.clone(),
                        expertise_description: r.adviser.expertise_description.clone(),
                        past_thesis_topics: r.adviser.past_thesis_topics.clone(),
                        expertise_similarity: r.expertise_similarity,
                        past_thesis_similarity: r.past_thesis_similarity,
                        overall_similarity: r.overall_similarity,
                    })
                    .collect::<Vec<_>>()
            })
        });

        let outcome = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "recommendation timed out"
                );
                McpError::internal_error("Recommendation timed out, please try again", None)
            })?
            .map_err(|e| {
                McpError::internal_error(format!("Recommendation task failed: {}", e), None)
            })?;

        match outcome {
            Ok(results) => Ok(results),
            Err(AdvisifyError::InvalidQuery) => Err(McpError::invalid_params(
                "Provide a thesis title or at least one project type",
                None,
            )),
            Err(e) => {
                tracing::warn!(error = %e, "recommendation failed");
                Err(McpError::internal_error(
                    "Could not compute recommendations, please try again",
                    None,
                ))
            }
        }
    }
}

#[tool_router]
impl AdvisifyService {
    /// Recommend thesis advisers
    #[tool(description = "Recommend thesis advisers for a thesis title. Scores each adviser on area of expertise and past supervised theses (0-1) and ranks by the weighted overall match.")]
    async fn recommend_advisers(
        &self,
        params: Parameters<RecommendParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        if params.title.chars().count() > MAX_TITLE_CHARS {
            return Err(McpError::invalid_params(
                format!("Thesis title is limited to {} characters", MAX_TITLE_CHARS),
                None,
            ));
        }

        // Clamp limit: default from config, max 100
        let limit = params.limit.unwrap_or(self.top_k).clamp(1, 100);
        let query = Query::new(params.title).with_tags(&params.project_types);

        let results = self.recommend(query, limit).await?;

        let output = serde_json::to_string_pretty(&results).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// List advisers in the catalog
    #[tool(description = "List advisers in the catalog with their area of expertise and past supervised thesis topics.")]
    async fn list_advisers(
        &self,
        params: Parameters<ListAdvisersParams>,
    ) -> Result<CallToolResult, McpError> {
        // Clamp limit: default 50, max 500
        let limit = params.0.limit.clamp(1, 500);

        let advisers: Vec<AdviserInfoJson<'_>> = self
            .engine
            .store()
            .advisers()
            .iter()
            .take(limit)
            .map(|a| AdviserInfoJson {
                name: &a.name,
                expertise_description: &a.expertise_description,
                past_thesis_topics: &a.past_thesis_topics,
            })
            .collect();

        let output = serde_json::to_string_pretty(&advisers).map_err(|e| {
            McpError::internal_error(format!("JSON serialization failed: {}", e), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// List project types
    #[tool(description = "List the general project types that can refine a recommendation when the thesis title is vague.")]
    async fn list_project_types(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(PROJECT_TYPES).unwrap_or_default(),
        )]))
    }
}

#[tool_handler]
impl ServerHandler for AdvisifyService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Advisify MCP Server. Recommends thesis advisers from a thesis title and optional project types.".to_string()
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(
    engine: RecommendationEngine<HtpEmbedder>,
    config: &Config,
) -> Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!(advisers = engine.store().len(), "starting MCP server");

    let service = AdvisifyService::new(engine, config);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
