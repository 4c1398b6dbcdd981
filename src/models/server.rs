use serde::Serialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::channel::Channel;

/// Raw query string of the server list endpoint.
///
/// Built from the decoded key/value pairs; when a key repeats, the last value
/// wins. Unknown keys are ignored.
#[derive(Debug, Default, PartialEq, Eq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServerListParams {
    /// Category of servers to retrieve
    pub category: Option<String>,
    /// Number of servers to retrieve
    #[param(value_type = Option<i64>)]
    pub qty: Option<String>,
    /// Filter servers by the current authenticated user (true/false)
    #[param(value_type = Option<bool>)]
    pub by_user: Option<String>,
    /// Include server by id
    #[param(value_type = Option<i64>)]
    pub by_serverid: Option<String>,
    /// Include the number of members for each server in the response
    #[param(value_type = Option<bool>)]
    pub with_num_members: Option<String>,
}

impl FromIterator<(String, String)> for ServerListParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut params.category,
                "qty" => &mut params.qty,
                "by_user" => &mut params.by_user,
                "by_serverid" => &mut params.by_serverid,
                "with_num_members" => &mut params.with_num_members,
                _ => continue,
            };
            *slot = Some(value);
        }
        params
    }
}

/// Parsed filters for one list request.
///
/// `limit` and `server_id` keep the caller's text. They are parsed by the
/// pipeline step that consumes them, so an authentication failure on an
/// earlier step wins over a malformed number on a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub category: Option<String>,
    pub limit: Option<String>,
    pub by_current_user: bool,
    pub server_id: Option<String>,
    pub with_member_count: bool,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn flag(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}

impl From<ServerListParams> for FilterRequest {
    fn from(params: ServerListParams) -> Self {
        Self {
            category: present(params.category),
            limit: present(params.qty),
            by_current_user: flag(params.by_user),
            server_id: present(params.by_serverid),
            with_member_count: flag(params.with_num_members),
        }
    }
}

/// Externally visible projection of a server. Member ids are never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ServerDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner: i64,
    pub category: i64,
    pub channel_server: Vec<Channel>,
}

/// A server as returned by the list endpoint.
///
/// `num_members` only exists on the `WithCount` variant, so it is omitted from
/// the JSON entirely rather than rendered as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ShapedServer {
    WithCount {
        #[serde(flatten)]
        server: ServerDetail,
        num_members: i64,
    },
    WithoutCount(ServerDetail),
}

impl ShapedServer {
    pub fn server(&self) -> &ServerDetail {
        match self {
            ShapedServer::WithCount { server, .. } => server,
            ShapedServer::WithoutCount(server) => server,
        }
    }

    pub fn num_members(&self) -> Option<i64> {
        match self {
            ShapedServer::WithCount { num_members, .. } => Some(*num_members),
            ShapedServer::WithoutCount(_) => None,
        }
    }
}
