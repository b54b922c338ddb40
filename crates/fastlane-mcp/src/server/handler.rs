//! MCP server handler implementation.
//!
//! Implements the rmcp::ServerHandler trait to expose fastlane project
//! operations as MCP tools. Manual impl (no `#[tool_handler]`) so tool calls
//! can send a progress notification before long builds start.
//!
//! Operation failures (bad input, failed pre-flight, failed build) are tool
//! results with `is_error = true`; `McpError` is reserved for protocol-level
//! problems.

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ProgressNotificationParam, ProtocolVersion, ServerCapabilities,
    ServerInfo,
};
use rmcp::schemars::{self, JsonSchema};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_router};
use serde::{Deserialize, Serialize};

use fastlane_kernel::plugins::{self, PluginInfo};
use fastlane_kernel::project::{self, BuildRequest};
use fastlane_kernel::{CommandRunner, FastlaneError, Platform, SystemRunner};

use super::config::McpServerConfig;

/// Lane run when a build request names none.
pub const DEFAULT_LANE: &str = "build";

/// The fastlane MCP server handler.
#[derive(Clone)]
pub struct FastlaneServerHandler {
    /// Server configuration.
    config: McpServerConfig,
    /// Runs `which` lookups and fastlane itself.
    runner: Arc<dyn CommandRunner>,
    /// Tool router.
    tool_router: ToolRouter<Self>,
}

impl FastlaneServerHandler {
    /// Create a handler that spawns real processes.
    pub fn new(config: McpServerConfig) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    /// Create a handler with a custom command runner.
    pub fn with_runner(config: McpServerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            runner,
            tool_router: Self::tool_router(),
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeProjectInput {
    #[schemars(description = "Path to the project root")]
    pub project_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListLanesInput {
    #[schemars(description = "Path to the project root")]
    pub project_path: String,

    #[schemars(description = "Only list lanes for this platform: ios or android")]
    pub platform: Option<String>,

    #[schemars(description = "Include private lanes (default: false)")]
    pub include_private: Option<bool>,
}

/// Input shared by `build_ios` and `build_android`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildInput {
    #[schemars(description = "Path to the project root")]
    pub project_path: String,

    #[schemars(description = "Fastlane lane to run (default: build)")]
    pub lane: Option<String>,

    #[schemars(description = "Build environment exported as FASTLANE_ENV (e.g. debug, release)")]
    pub environment: Option<String>,

    #[schemars(description = "Pass clean:true to the lane (default: false)")]
    pub clean: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchPluginsInput {
    #[schemars(description = "Search query (matches name, description, signals)")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PluginDetailsInput {
    #[schemars(
        description = "The plugin name (e.g. fastlane-plugin-firebase_app_distribution)"
    )]
    pub plugin_name: String,
}

#[derive(Debug, Serialize)]
struct PluginSearchOutput {
    query: String,
    plugins: Vec<PluginInfo>,
}

#[derive(Debug, Serialize)]
struct PluginDetailsOutput {
    found: bool,
    #[serde(flatten)]
    plugin: Option<PluginInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    installation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[tool_router]
impl FastlaneServerHandler {
    #[tool(description = "Analyze a mobile project: which platforms have fastlane set up and which lanes each Fastfile declares.\n\nLooks for <project>/ios/fastlane/Fastfile, <project>/android/fastlane/Fastfile and <project>/fastlane/Fastfile.")]
    async fn analyze_project(
        &self,
        Parameters(input): Parameters<AnalyzeProjectInput>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(project = %input.project_path, "mcp.analyze_project");
        match project::analyze_project(&input.project_path) {
            Ok(analysis) => json_result(&analysis),
            Err(e) => Ok(error_result(&e)),
        }
    }

    #[tool(description = "List the lanes declared in a project's Fastfile(s), optionally for one platform (ios or android). Private lanes are hidden unless include_private is true.")]
    async fn list_lanes(
        &self,
        Parameters(input): Parameters<ListLanesInput>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            project = %input.project_path,
            platform = ?input.platform,
            "mcp.list_lanes"
        );
        let platform = match input.platform.as_deref().map(str::parse::<Platform>).transpose() {
            Ok(platform) => platform,
            Err(e) => return Ok(error_result(&FastlaneError::from(e))),
        };
        let include_private = input.include_private.unwrap_or(false);
        match project::list_lanes(&input.project_path, platform, include_private) {
            Ok(listing) => json_result(&listing),
            Err(e) => Ok(error_result(&e)),
        }
    }

    #[tool(description = "Build an iOS app by running a fastlane lane. Runs pre-flight checks first (Fastfile, lane, xcodebuild and fastlane on PATH) and diagnoses common failures such as code signing and provisioning problems.")]
    async fn build_ios(
        &self,
        Parameters(input): Parameters<BuildInput>,
    ) -> Result<CallToolResult, McpError> {
        self.build_platform(Platform::Ios, input).await
    }

    #[tool(description = "Build an Android app by running a fastlane lane. Runs pre-flight checks first (Fastfile, lane, fastlane on PATH) and diagnoses common failures such as Gradle, SDK and keystore problems.")]
    async fn build_android(
        &self,
        Parameters(input): Parameters<BuildInput>,
    ) -> Result<CallToolResult, McpError> {
        self.build_platform(Platform::Android, input).await
    }

    #[tool(description = "Search the catalog of common fastlane plugins by name, description or keyword.")]
    async fn search_fastlane_plugins(
        &self,
        Parameters(input): Parameters<SearchPluginsInput>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(query = %input.query, "mcp.search_fastlane_plugins");
        let plugins = plugins::search_plugins(&input.query);
        json_result(&PluginSearchOutput {
            query: input.query,
            plugins,
        })
    }

    #[tool(description = "Get details and installation instructions for a fastlane plugin by its exact name.")]
    async fn get_plugin_details(
        &self,
        Parameters(input): Parameters<PluginDetailsInput>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(plugin = %input.plugin_name, "mcp.get_plugin_details");
        let output = match plugins::get_plugin_info(&input.plugin_name) {
            Some(info) => PluginDetailsOutput {
                found: true,
                installation: Some(info.installation()),
                plugin: Some(info),
                message: None,
            },
            None => PluginDetailsOutput {
                found: false,
                plugin: None,
                installation: None,
                message: Some(format!(
                    "Plugin '{}' not found in registry",
                    input.plugin_name
                )),
            },
        };
        json_result(&output)
    }
}

impl FastlaneServerHandler {
    async fn build_platform(
        &self,
        platform: Platform,
        input: BuildInput,
    ) -> Result<CallToolResult, McpError> {
        let lane = input.lane.unwrap_or_else(|| DEFAULT_LANE.to_string());
        tracing::info!(
            project = %input.project_path,
            platform = %platform,
            lane = %lane,
            "mcp.build"
        );

        let mut request = BuildRequest::new(input.project_path, platform, lane);
        request.environment = input.environment;
        request.clean = input.clean.unwrap_or(false);

        let settings = self.config.build_settings(platform);
        match project::build(&request, &settings, self.runner.as_ref()).await {
            Ok(output) => json_result(&output),
            Err(e) => Ok(error_result(&e)),
        }
    }
}

/// Successful result: pretty JSON text plus the same value as structured content.
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let structured =
        serde_json::to_value(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    let text = serde_json::to_string_pretty(&structured)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}

/// Failed operation: the error message as text, with machine-readable
/// details where the error carries any.
fn error_result(err: &FastlaneError) -> CallToolResult {
    tracing::warn!(error = %err, "tool call failed");

    let structured = match err {
        FastlaneError::Validation(e) => Some(serde_json::json!({ "kind": e.kind() })),
        FastlaneError::Preflight { issues, .. } => serde_json::to_value(issues)
            .ok()
            .map(|issues| serde_json::json!({ "kind": "preflight", "issues": issues })),
        FastlaneError::CommandFailed { exit_code, .. } => {
            Some(serde_json::json!({ "kind": "command_failed", "exit_code": exit_code }))
        }
        FastlaneError::ConfigNotFound(_) | FastlaneError::Io { .. } => None,
    };

    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: structured,
        is_error: Some(true),
        meta: None,
    }
}

// Manual ServerHandler impl, in place of #[tool_handler], so tool calls can
// report progress.
impl rmcp::ServerHandler for FastlaneServerHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Build iOS and Android apps with fastlane.\n\n\
                 Tools:\n\
                 • analyze_project — Platforms and lanes found in a project\n\
                 • list_lanes — Lanes for one or all platforms\n\
                 • build_ios / build_android — Pre-flight checks, run a lane, diagnose failures\n\
                 • search_fastlane_plugins / get_plugin_details — Plugin catalog lookup\n\n\
                 Projects may use a per-platform layout (ios/fastlane, android/fastlane) \
                 or a single fastlane/ directory at the project root."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            meta: None,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        use rmcp::model::RequestParamsMeta;
        let progress_token = request.progress_token();

        if let Some(ref token) = progress_token {
            // Explicitly ignored: progress notifications are best-effort
            let _ = context
                .peer
                .notify_progress(ProgressNotificationParam {
                    progress_token: token.clone(),
                    progress: 0.0,
                    total: Some(1.0),
                    message: Some("Starting".to_string()),
                })
                .await;
        }

        let tool = request.name.clone();
        let tcc = ToolCallContext::new(self, request, context);
        let result = self.tool_router.call(tcc).await;

        // The peer moved into the call context; the result itself signals completion.
        if let Some(token) = progress_token {
            tracing::debug!(progress_token = ?token, tool = %tool, "tool call complete");
        }

        result
    }

    fn get_tool(&self, name: &str) -> Option<rmcp::model::Tool> {
        self.tool_router.get(name).cloned()
    }
}
