//! Filter composition and response shaping for the server list endpoint.
//!
//! A request is first turned into a [`ServerQuery`] by [`plan`], which
//! applies the filters in a fixed order: category, membership, member count,
//! truncation, id lookup. Truncation runs before the id lookup, so
//! `qty=2&by_serverid=3` only finds server 3 when it is among the first two.

use crate::database::DbPool;
use crate::middleware::auth::CurrentUser;
use crate::models::server::{FilterRequest, ShapedServer};
use crate::services::server_query::{FetchedServer, ServerQuery};
use crate::utils::error::{AppError, AppResult};

fn require_user(user: Option<&CurrentUser>) -> AppResult<&CurrentUser> {
    user.ok_or_else(|| {
        AppError::Unauthenticated("Authentication credentials were not provided".to_string())
    })
}

/// Parses a non-negative count. Values past `i64::MAX` saturate, since no
/// collection is that large.
fn parse_limit(raw: &str) -> AppResult<i64> {
    let digits = raw.trim();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidArgument(format!(
            "qty must be a non-negative integer, got {}",
            raw
        )));
    }
    Ok(digits.parse::<i64>().unwrap_or(i64::MAX))
}

fn parse_server_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::InvalidArgument(format!("Server with id {} value error", raw)))
}

/// Builds the query for `request`, checking authentication and parsing
/// numeric parameters at the step that needs them.
pub fn plan(request: &FilterRequest, user: Option<&CurrentUser>) -> AppResult<ServerQuery> {
    let query = ServerQuery::all();

    let query = match &request.category {
        Some(category) => query.in_category(category.as_str()),
        None => query,
    };

    let query = if request.by_current_user {
        query.with_member(require_user(user)?.id)
    } else {
        query
    };

    let query = if request.with_member_count {
        query.annotate_member_count()
    } else {
        query
    };

    let query = match &request.limit {
        Some(raw) => query.first(parse_limit(raw)?),
        None => query,
    };

    let query = match &request.server_id {
        Some(raw) => {
            require_user(user)?;
            query.with_id(parse_server_id(raw)?)
        }
        None => query,
    };

    Ok(query)
}

fn shape(fetched: FetchedServer, with_member_count: bool) -> ShapedServer {
    if with_member_count {
        ShapedServer::WithCount {
            server: fetched.server,
            num_members: fetched.num_members.unwrap_or(0),
        }
    } else {
        ShapedServer::WithoutCount(fetched.server)
    }
}

pub async fn list_servers(
    pool: &DbPool,
    request: &FilterRequest,
    user: Option<&CurrentUser>,
) -> AppResult<Vec<ShapedServer>> {
    let query = plan(request, user)?;

    tracing::debug!(
        "Listing servers: category={:?} by_user={} limit={:?} server_id={:?} with_num_members={}",
        request.category,
        request.by_current_user,
        request.limit,
        request.server_id,
        request.with_member_count
    );

    let servers = query.fetch(pool).await?;

    if let Some(raw) = &request.server_id
        && servers.is_empty()
    {
        return Err(AppError::NotFound(format!("Server with id {} not found", raw)));
    }

    Ok(servers
        .into_iter()
        .map(|fetched| shape(fetched, request.with_member_count))
        .collect())
}
