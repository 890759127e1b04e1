use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{AstPass, Query, QueryFragment, QueryId};
use diesel::query_dsl::methods::LoadQuery;
use diesel::sql_types::BigInt;
use shared::pagination::{PageRequest, PageWindow, Pagination};

/// Adds `LIMIT`/`OFFSET` paging to any diesel query. The raw parameters are
/// normalized first, so callers can pass query-string values straight
/// through.
pub trait Paginate: Sized {
    fn paginate(self, page: i64, page_size: i64) -> Paginated<Self>;

    fn paginate_window(self, window: PageWindow) -> Paginated<Self>;
}

impl<T> Paginate for T {
    fn paginate(self, page: i64, page_size: i64) -> Paginated<Self> {
        self.paginate_window(PageRequest::new(page, page_size).normalize())
    }

    fn paginate_window(self, window: PageWindow) -> Paginated<Self> {
        Paginated {
            query: self,
            window,
        }
    }
}

#[derive(Debug, Clone, Copy, QueryId)]
pub struct Paginated<T> {
    query: T,
    window: PageWindow,
}

impl<T> Paginated<T> {
    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Query counting every row matched by the inner query, ignoring the
    /// window.
    pub fn count_all(&self) -> CountAll<T>
    where
        T: Clone,
    {
        CountAll {
            query: self.query.clone(),
        }
    }

    /// Loads one page and the total number of rows matched by the inner
    /// query. The total is read from the window count on the page rows; when
    /// a page past the end comes back empty it is counted separately.
    pub fn load_and_count<'a, U>(
        self,
        conn: &mut PgConnection,
    ) -> QueryResult<(Vec<U>, i64)>
    where
        T: Clone,
        Self: LoadQuery<'a, PgConnection, (U, i64)>,
        CountAll<T>: LoadQuery<'a, PgConnection, i64>,
    {
        let window = self.window;
        let count_all = self.count_all();

        let results = self.load::<(U, i64)>(conn)?;
        let total = match results.first() {
            Some((_, total)) => *total,
            None if window.offset > 0 => count_all.get_result::<i64>(conn)?,
            None => 0,
        };
        let records = results.into_iter().map(|(record, _)| record).collect();

        Ok((records, total))
    }

    pub fn load_pagination<'a, U>(
        self,
        conn: &mut PgConnection,
    ) -> QueryResult<Pagination<U>>
    where
        T: Clone,
        Self: LoadQuery<'a, PgConnection, (U, i64)>,
        CountAll<T>: LoadQuery<'a, PgConnection, i64>,
    {
        let window = self.window;
        let (list, total) = self.load_and_count(conn)?;

        tracing::debug!(
            page = window.page,
            page_size = window.page_size,
            total,
            "Loaded page"
        );

        Ok(window.into_pagination(total, list))
    }
}

impl<T: Query> Query for Paginated<T> {
    type SqlType = (T::SqlType, BigInt);
}

impl<T> RunQueryDsl<PgConnection> for Paginated<T> {}

impl<T> QueryFragment<Pg> for Paginated<T>
where
    T: QueryFragment<Pg>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Pg>) -> QueryResult<()> {
        out.push_sql("SELECT *, COUNT(*) OVER () FROM (");
        self.query.walk_ast(out.reborrow())?;
        out.push_sql(") t LIMIT ");
        out.push_bind_param::<BigInt, _>(&self.window.page_size)?;
        out.push_sql(" OFFSET ");
        out.push_bind_param::<BigInt, _>(&self.window.offset)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, QueryId)]
pub struct CountAll<T> {
    query: T,
}

impl<T: Query> Query for CountAll<T> {
    type SqlType = BigInt;
}

impl<T> RunQueryDsl<PgConnection> for CountAll<T> {}

impl<T> QueryFragment<Pg> for CountAll<T>
where
    T: QueryFragment<Pg>,
{
    fn walk_ast<'b>(&'b self, mut out: AstPass<'_, 'b, Pg>) -> QueryResult<()> {
        out.push_sql("SELECT COUNT(*) FROM (");
        self.query.walk_ast(out.reborrow())?;
        out.push_sql(") t");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use diesel::{debug_query, sql_query};

    use super::*;

    diesel::table! {
        articles (id) {
            id -> Int4,
            title -> Varchar,
        }
    }

    fn render<T: QueryFragment<Pg>>(query: &T) -> String {
        debug_query::<Pg, _>(query).to_string()
    }

    #[test]
    fn wraps_query_with_limit_and_offset() {
        let query = articles::table
            .select(articles::id)
            .order(articles::id.desc())
            .paginate(3, 500);

        let sql = render(&query);

        assert!(sql.starts_with("SELECT *, COUNT(*) OVER () FROM (SELECT"));
        assert!(sql.contains(r#"FROM "articles" ORDER BY "articles"."id" DESC) t LIMIT $1 OFFSET $2"#));
        assert!(sql.ends_with("-- binds: [100, 200]"), "{sql}");
    }

    #[test]
    fn defaults_apply_to_invalid_parameters() {
        let query = articles::table.select(articles::title).paginate(0, 0);

        assert_eq!(
            query.window(),
            PageWindow {
                page: 1,
                page_size: 10,
                offset: 0,
            }
        );
        assert!(render(&query).ends_with("-- binds: [10, 0]"));
    }

    #[test]
    fn negative_page_is_passed_through() {
        let query = articles::table.select(articles::id).paginate(-1, 10);

        assert_eq!(query.window().offset, -20);
        assert!(render(&query).ends_with("-- binds: [10, -20]"));
    }

    #[test]
    fn count_ignores_the_window() {
        let query = articles::table
            .select(articles::id)
            .filter(articles::id.gt(5))
            .paginate(9, 10);

        let sql = render(&query.count_all());

        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT"), "{sql}");
        assert!(sql.contains(") t -- binds: [5]"), "{sql}");
        assert!(!sql.contains("LIMIT"));
    }

    fn seeded_connection() -> PgConnection {
        let url = env::var("DATABASE_URL_TEST")
            .expect("DATABASE_URL_TEST must be set");
        PgConnection::establish(&url).expect("Failed to connect to test db")
    }

    fn seed_articles(conn: &mut PgConnection, count: i32) -> QueryResult<()> {
        sql_query(
            "CREATE TEMPORARY TABLE articles (id SERIAL PRIMARY KEY, title \
             VARCHAR NOT NULL)",
        )
        .execute(conn)?;

        let rows: Vec<_> = (1..=count)
            .map(|n| articles::title.eq(format!("article {n}")))
            .collect();
        diesel::insert_into(articles::table)
            .values(rows)
            .execute(conn)?;

        Ok(())
    }

    #[test]
    #[ignore = "requires DATABASE_URL_TEST"]
    fn loads_pages_against_postgres() {
        let mut conn = seeded_connection();

        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            seed_articles(conn, 42)?;
            let ids = || articles::table.select(articles::id).order(articles::id);

            let (first, total) =
                ids().paginate(1, 10).load_and_count::<i32>(conn)?;
            assert_eq!(first, (1..=10).collect::<Vec<_>>());
            assert_eq!(total, 42);

            let middle = ids().paginate(3, 10).load_pagination::<i32>(conn)?;
            assert_eq!(middle.list, (21..=30).collect::<Vec<_>>());
            assert_eq!(middle.total, 42);
            assert_eq!(middle.page, 3);
            assert_eq!(middle.page_size, 10);

            let past_end = ids().paginate(9, 10).load_pagination::<i32>(conn)?;
            assert!(past_end.list.is_empty());
            assert_eq!(past_end.total, 42);

            // Postgres aborts the transaction here, so this runs last.
            let negative = ids().paginate(-1, 10).load_and_count::<i32>(conn);
            let err = negative.expect_err("negative offset must be rejected");
            assert!(
                err.to_string().contains("OFFSET must not be negative"),
                "{err}"
            );

            Ok(())
        });
    }
}
