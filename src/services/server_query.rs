use itertools::Itertools;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashMap;

use crate::database::DbPool;
use crate::models::channel::Channel;
use crate::models::server::ServerDetail;
use crate::utils::error::AppResult;

const BASE_SELECT: &str = "SELECT s.id, s.name, s.description, s.owner_id AS owner, \
     s.category_id AS category, c.name AS category_name \
     FROM servers s JOIN categories c ON c.id = s.category_id";

const MEMBER_COUNT_PREFIX: &str = "SELECT w.*, \
     (SELECT COUNT(*) FROM server_members m WHERE m.server_id = w.id) AS num_members FROM (";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Category(String),
    Member(i64),
    CountMembers,
    First(i64),
    Id(i64),
}

/// An immutable, narrowing view over the `servers` table.
///
/// Every builder call returns a new query with one more step appended. Steps
/// are applied in call order: each wraps the previous view in a subquery, so
/// a filter added after `first` only sees the rows that survived truncation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
    steps: Vec<Step>,
}

#[derive(FromRow)]
struct ServerRow {
    id: i64,
    name: String,
    description: Option<String>,
    owner: i64,
    category: i64,
    #[sqlx(default)]
    num_members: Option<i64>,
}

/// A fetched server and, when the query counted members, its member count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedServer {
    pub server: ServerDetail,
    pub num_members: Option<i64>,
}

impl ServerQuery {
    pub fn all() -> Self {
        Self::default()
    }

    fn then(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    pub fn in_category(&self, name: impl Into<String>) -> Self {
        self.then(Step::Category(name.into()))
    }

    pub fn with_member(&self, user_id: i64) -> Self {
        self.then(Step::Member(user_id))
    }

    /// Annotates rows with their member count. Idempotent.
    pub fn annotate_member_count(&self) -> Self {
        if self.counts_members() {
            return self.clone();
        }
        self.then(Step::CountMembers)
    }

    /// Keeps the first `n` rows by ascending id.
    pub fn first(&self, n: i64) -> Self {
        self.then(Step::First(n))
    }

    pub fn with_id(&self, id: i64) -> Self {
        self.then(Step::Id(id))
    }

    pub fn counts_members(&self) -> bool {
        self.steps.contains(&Step::CountMembers)
    }

    fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT * FROM (");

        // Binds only ever appear after the nested view, so all prefixes go
        // first (outermost step first) and suffixes follow in step order.
        for step in self.steps.iter().rev() {
            match step {
                Step::CountMembers => qb.push(MEMBER_COUNT_PREFIX),
                _ => qb.push("SELECT * FROM ("),
            };
        }

        qb.push(BASE_SELECT);

        for step in &self.steps {
            match step {
                Step::Category(name) => {
                    qb.push(") AS w WHERE w.category_name = ");
                    qb.push_bind(name.clone());
                }
                Step::Member(user_id) => {
                    qb.push(
                        ") AS w WHERE w.id IN (SELECT server_id FROM server_members WHERE user_id = ",
                    );
                    qb.push_bind(*user_id);
                    qb.push(")");
                }
                Step::CountMembers => {
                    qb.push(") AS w");
                }
                Step::First(n) => {
                    qb.push(") AS w ORDER BY w.id LIMIT ");
                    qb.push_bind(*n);
                }
                Step::Id(id) => {
                    qb.push(") AS w WHERE w.id = ");
                    qb.push_bind(*id);
                }
            }
        }

        qb.push(") AS w ORDER BY w.id");
        qb
    }

    pub async fn fetch(&self, pool: &DbPool) -> AppResult<Vec<FetchedServer>> {
        let rows = self
            .build()
            .build_query_as::<ServerRow>()
            .fetch_all(pool.as_ref())
            .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut channels = fetch_channels(pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| FetchedServer {
                server: ServerDetail {
                    id: row.id,
                    name: row.name,
                    description: row.description,
                    owner: row.owner,
                    category: row.category,
                    channel_server: channels.remove(&row.id).unwrap_or_default(),
                },
                num_members: row.num_members,
            })
            .collect())
    }
}

async fn fetch_channels(
    pool: &DbPool,
    server_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<Channel>>> {
    if server_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, name, topic, owner_id AS owner, server_id AS server FROM channels WHERE server_id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in server_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    let channels = qb
        .build_query_as::<Channel>()
        .fetch_all(pool.as_ref())
        .await?;

    Ok(channels.into_iter().into_group_map_by(|channel| channel.server))
}
