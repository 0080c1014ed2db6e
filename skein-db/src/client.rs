use crate::record::{CommunityRow, PostRow, UserRow};
use skein_common::model::{
    Id,
    community::{Community, CommunityMarker},
    directory::{SortOrder, UserFilter},
    post::{Post, PostMarker},
    user::{ProfileUpdate, User, UserMarker},
};
use skein_engine::store::{StoreError, ThreadStore};
use sqlx::{PgPool, Postgres, QueryBuilder};

const USER_SELECT: &str = "\
    SELECT \
        u.user_id, u.handle, u.display_name, u.bio, u.avatar, u.onboarded, u.created_at, \
        array_remove(array_agg(p.post_id ORDER BY p.ordinal), NULL) AS post_ids \
    FROM users u \
    LEFT JOIN posts p ON p.author_id = u.user_id";

const POST_SELECT: &str = "\
    SELECT \
        p.post_id, p.body, p.parent_id, p.author_id, p.community_id, p.created_at, \
        array_remove(array_agg(c.post_id ORDER BY c.ordinal), NULL) AS child_ids \
    FROM posts p \
    LEFT JOIN posts c ON c.parent_id = p.post_id";

const COMMUNITY_SELECT: &str = "\
    SELECT \
        c.community_id, c.display_name, c.avatar, c.created_at, \
        array_remove(array_agg(p.post_id ORDER BY p.ordinal), NULL) AS post_ids \
    FROM communities c \
    LEFT JOIN posts p ON p.community_id = c.community_id";

/// Postgres-backed [`ThreadStore`]. Reference lists are materialized per
/// query from the relational side, ordered by the `ordinal` insertion
/// sequence, so parent/child and author/post consistency holds by
/// construction.
#[derive(Clone, Debug)]
pub struct PgThreadStore {
    pool: PgPool,
}

impl PgThreadStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

/// Escapes LIKE wildcards and wraps the text in `%` for an unanchored
/// substring match.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_user_predicates(builder: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    builder.push(" WHERE true");
    if let Some(exclude) = &filter.exclude {
        builder
            .push(" AND u.user_id <> ")
            .push_bind(exclude.get().to_owned());
    }
    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        builder
            .push(" AND (u.handle ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR u.display_name ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn into_strings<Marker>(ids: &[Id<Marker>]) -> Vec<String> {
    ids.iter().map(|id| id.get().to_owned()).collect()
}

impl ThreadStore for PgThreadStore {
    async fn user_by_id(&self, id: &Id<UserMarker>) -> Result<Option<User>, StoreError> {
        let sql = format!("{USER_SELECT} WHERE u.user_id = $1 GROUP BY u.user_id");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::new)?;

        row.map(User::try_from)
            .transpose()
            .map_err(StoreError::new)
    }

    async fn community_by_id(
        &self,
        id: &Id<CommunityMarker>,
    ) -> Result<Option<Community>, StoreError> {
        let sql = format!("{COMMUNITY_SELECT} WHERE c.community_id = $1 GROUP BY c.community_id");
        let row: Option<CommunityRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::new)?;

        Ok(row.map(Community::from))
    }

    async fn users_by_ids(&self, ids: &[Id<UserMarker>]) -> Result<Vec<User>, StoreError> {
        let sql = format!("{USER_SELECT} WHERE u.user_id = ANY($1) GROUP BY u.user_id");
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(into_strings(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::new)?;

        rows.into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()
            .map_err(StoreError::new)
    }

    async fn communities_by_ids(
        &self,
        ids: &[Id<CommunityMarker>],
    ) -> Result<Vec<Community>, StoreError> {
        let sql =
            format!("{COMMUNITY_SELECT} WHERE c.community_id = ANY($1) GROUP BY c.community_id");
        let rows: Vec<CommunityRow> = sqlx::query_as(&sql)
            .bind(into_strings(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::new)?;

        Ok(rows.into_iter().map(Community::from).collect())
    }

    async fn posts_by_ids(&self, ids: &[Id<PostMarker>]) -> Result<Vec<Post>, StoreError> {
        let sql = format!("{POST_SELECT} WHERE p.post_id = ANY($1) GROUP BY p.post_id");
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(into_strings(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::new)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn posts_by_author(&self, author: &Id<UserMarker>) -> Result<Vec<Post>, StoreError> {
        let sql = format!("{POST_SELECT} WHERE p.author_id = $1 GROUP BY p.post_id ORDER BY p.ordinal");
        let rows: Vec<PostRow> = sqlx::query_as(&sql)
            .bind(author.get())
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::new)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut builder = QueryBuilder::new(USER_SELECT);
        push_user_predicates(&mut builder, filter);
        builder.push(" GROUP BY u.user_id");
        builder.push(match filter.sort {
            SortOrder::Asc => " ORDER BY u.created_at ASC",
            SortOrder::Desc => " ORDER BY u.created_at DESC",
        });
        builder
            .push(" OFFSET ")
            .push_bind(i64::try_from(filter.skip).unwrap_or(i64::MAX));
        if let Some(limit) = filter.limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows: Vec<UserRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::new)?;

        rows.into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()
            .map_err(StoreError::new)
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::new("SELECT count(*) FROM users u");
        push_user_predicates(&mut builder, filter);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::new)?;

        Ok(count.cast_unsigned())
    }

    async fn upsert_profile(&self, update: &ProfileUpdate) -> Result<(), StoreError> {
        sqlx::query(
            "
            INSERT INTO users (user_id, handle, display_name, bio, avatar, onboarded)
            VALUES ($1, $2, $3, $4, $5, true)
            ON CONFLICT (user_id) DO UPDATE SET
                handle = excluded.handle,
                display_name = excluded.display_name,
                bio = excluded.bio,
                avatar = excluded.avatar,
                onboarded = true
            ",
        )
        .bind(update.user_id.get())
        .bind(update.handle.get())
        .bind(&update.name)
        .bind(&update.bio)
        .bind(&update.avatar)
        .execute(&self.pool)
        .await
        .map_err(StoreError::new)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("alice"), "%alice%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("under_score"), "%under\\_score%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
