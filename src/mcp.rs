use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::{
    error::{self, Error},
    index::RecommendationIndex,
    player::{PlayerSummary, Season},
    validate::{self, Checked},
};

#[derive(Clone)]
pub struct SimilarPlayerMcpServer {
    index: Arc<RecommendationIndex>,
    tool_router: ToolRouter<Self>,
}

impl SimilarPlayerMcpServer {
    pub fn new(index: Arc<RecommendationIndex>) -> Self {
        Self {
            index,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl SimilarPlayerMcpServer {
    /// Find players by name.
    #[tool(
        name = "player_search",
        description = "Find players whose name contains the query (case-insensitive). Returns career stats and a season-by-season breakdown."
    )]
    pub async fn player_search(
        &self,
        params: Parameters<PlayerSearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let query = params.0.query;
        validate::validate_query(&query).map_err(invalid_params)?;

        let players = self.index.search_players(&query);
        let summary = format_summary(
            &players,
            &format!("players matching \"{query}\""),
        );
        players_result(summary, players)
    }

    /// Players with the most similar careers.
    #[tool(
        name = "career_recommendations",
        description = "List players whose full career is most similar to the given player, most similar first."
    )]
    pub async fn career_recommendations(
        &self,
        params: Parameters<CareerParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let mut players =
            match validate::validate_player_id(params.player_id)
                .map_err(invalid_params)?
            {
                Checked::Known(id) => self.index.career_recommendations(id),
                Checked::OutOfRange => Vec::new(),
            };
        truncate(&mut players, params.limit);

        let summary = format_summary(
            &players,
            &format!("career matches for player {}", params.player_id),
        );
        players_result(summary, players)
    }

    /// Player-seasons most similar to one season.
    #[tool(
        name = "season_recommendations",
        description = "List individual player-seasons most similar to one season of the given player, most similar first."
    )]
    pub async fn season_recommendations(
        &self,
        params: Parameters<SeasonParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let mut players =
            match validate::validate_player_season(params.player_id, params.season)
                .map_err(invalid_params)?
            {
                Checked::Known((id, season)) => {
                    self.index.season_recommendations(id, season)
                }
                Checked::OutOfRange => Vec::new(),
            };
        truncate(&mut players, params.limit);

        let summary = format_summary(
            &players,
            &format!(
                "season matches for player {} in {}",
                params.player_id, params.season
            ),
        );
        players_result(summary, players)
    }

    /// Seasons recorded for a player.
    #[tool(
        name = "player_seasons",
        description = "List the seasons recorded for a player, most recent first."
    )]
    pub async fn player_seasons(
        &self,
        params: Parameters<PlayerSeasonsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let player_id = params.0.player_id;
        let seasons = match validate::validate_player_id(player_id)
            .map_err(invalid_params)?
        {
            Checked::Known(id) => self.index.seasons_for_player(id),
            Checked::OutOfRange => Vec::new(),
        };

        let summary = if seasons.is_empty() {
            format!("No seasons recorded for player {player_id}")
        } else {
            let years: Vec<String> =
                seasons.iter().map(ToString::to_string).collect();
            format!("Seasons for player {player_id}: {}", years.join(", "))
        };
        let structured = serde_json::to_value(SeasonsResponse {
            player_id,
            seasons,
        })
        .map_err(|e| mcp_error("failed to serialize seasons", e))?;

        Ok(CallToolResult {
            content: vec![Content::text(summary)],
            structured_content: Some(structured),
            is_error: Some(false),
            meta: None,
        })
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SimilarPlayerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "simplayer".to_string(),
                title: Some("Similar player lookup".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Use player_search to find a player id, player_seasons to list their seasons, then career_recommendations or season_recommendations for similar players."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSearchParams {
    /// Part of the player's name (1 to 100 characters).
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CareerParams {
    /// Player id from player_search.
    pub player_id: i64,
    /// Maximum number of matches to return.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonParams {
    /// Player id from player_search.
    pub player_id: i64,
    /// Season year from player_seasons.
    pub season: i64,
    /// Maximum number of matches to return.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSeasonsParams {
    /// Player id from player_search.
    pub player_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayersResponse {
    result_count: usize,
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeasonsResponse {
    player_id: i64,
    seasons: Vec<Season>,
}

fn truncate(players: &mut Vec<PlayerSummary>, limit: Option<usize>) {
    if let Some(limit) = limit {
        players.truncate(limit);
    }
}

fn players_result(
    summary: String,
    players: Vec<PlayerSummary>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let structured = serde_json::to_value(PlayersResponse {
        result_count: players.len(),
        players,
    })
    .map_err(|e| mcp_error("failed to serialize players", e))?;

    Ok(CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}

fn format_summary(players: &[PlayerSummary], what: &str) -> String {
    if players.is_empty() {
        return format!("No {what}");
    }

    let mut lines = Vec::with_capacity(players.len() + 1);
    let suffix = if players.len() == 1 { "" } else { "s" };
    lines.push(format!("Found {} result{} for {what}:", players.len(), suffix));

    for p in players {
        let score = p
            .similarity_score
            .map(|s| format!(" {s:.3}"))
            .unwrap_or_default();
        lines.push(format!("#{}{score} {} ({})", p.player_id, p.name, p.years));
    }

    lines.join("\n")
}

fn invalid_params(error: Error) -> rmcp::ErrorData {
    rmcp::ErrorData::invalid_params(error.to_string(), None)
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(index: RecommendationIndex) -> error::Result<()> {
    let server = SimilarPlayerMcpServer::new(Arc::new(index));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        info!("starting MCP server on stdio");
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            Error::Config(format!("MCP server initialization failed: {e}"))
        })?;
        running
            .waiting()
            .await
            .map_err(|e| Error::Config(format!("MCP server error: {e}")))?;
        Ok(())
    })
}
