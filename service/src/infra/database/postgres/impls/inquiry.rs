//! [`Inquiry`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{inquiry, Inquiry},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Reads an [`Inquiry`] from the provided [`Row`].
fn inquiry_from_row(row: &Row) -> Inquiry {
    Inquiry {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        kind: row.get("kind"),
        status: row.get("status"),
        property_id: row.get("property_id"),
        budget_min: row.get("budget_min"),
        budget_max: row.get("budget_max"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Inquiry>, inquiry::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Inquiry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Inquiry>, inquiry::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: inquiry::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, email, phone, message, kind, status, \
                   property_id, budget_min, budget_max, \
                   created_at, updated_at \
            FROM inquiries \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| inquiry_from_row(&row)))
    }
}

impl<C> Database<Insert<Inquiry>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Inquiry>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(inquiry): Insert<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(inquiry)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Inquiry>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(inquiry): Update<Inquiry>,
    ) -> Result<Self::Ok, Self::Err> {
        let Inquiry {
            id,
            name,
            email,
            phone,
            message,
            kind,
            status,
            property_id,
            budget_min,
            budget_max,
            created_at,
            updated_at,
        } = inquiry;

        const SQL: &str = "\
            INSERT INTO inquiries (\
                id, name, email, phone, message, kind, status, \
                property_id, budget_min, budget_max, \
                created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::TEXT, \
                $6::VARCHAR, $7::VARCHAR, \
                $8::UUID, $9::INT8, $10::INT8, \
                $11::TIMESTAMPTZ, $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                phone = EXCLUDED.phone, \
                message = EXCLUDED.message, \
                kind = EXCLUDED.kind, \
                status = EXCLUDED.status, \
                property_id = EXCLUDED.property_id, \
                budget_min = EXCLUDED.budget_min, \
                budget_max = EXCLUDED.budget_max, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &name,
                &email,
                &phone,
                &message,
                &kind,
                &status,
                &property_id,
                &budget_min,
                &budget_max,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Renders `WHERE` conditions of the provided `filter`, pushing their
/// parameters into `ps`.
fn conditions<'a>(
    filter: &'a read::inquiry::list::Filter,
    ps: &mut Vec<&'a (dyn ToSql + Sync)>,
) -> String {
    let read::inquiry::list::Filter { status, kind } = filter;

    let mut conds = vec![];
    if let Some(s) = status {
        ps.push(s);
        conds.push(format!("q.status = ${}::VARCHAR", ps.len()));
    }
    if let Some(k) = kind {
        ps.push(k);
        conds.push(format!("q.kind = ${}::VARCHAR", ps.len()));
    }

    conds
        .iter()
        .format_with("", |c, f| f(&format_args!(" AND {c}")))
        .to_string()
}

impl<C>
    Database<
        Select<By<read::inquiry::list::Page, read::inquiry::list::Selector>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::inquiry::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::inquiry::list::Page, read::inquiry::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::inquiry::list::Selector {
            arguments, filter, ..
        } = by.into_inner();

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let conditions = conditions(&filter, &mut ps);

        let sql = format!(
            "SELECT q.id, q.name, q.email, q.phone, q.message, \
                    q.kind, q.status, \
                    q.property_id, q.budget_min, q.budget_max, \
                    q.created_at, q.updated_at, \
                    p.title AS property_title, \
                    p.slug AS property_slug, \
                    p.price AS property_price, \
                    (SELECT i.url \
                     FROM property_images i \
                     WHERE i.property_id = p.id \
                       AND i.is_primary \
                     ORDER BY i.position \
                     LIMIT 1) AS property_primary_image \
             FROM inquiries q \
             LEFT JOIN properties p ON p.id = q.property_id \
             WHERE true{conditions} \
             ORDER BY q.created_at DESC, q.id DESC \
             LIMIT $1::INT8 \
             OFFSET $2::INT8"
        );
        let items = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                let inquiry = inquiry_from_row(&row);
                let property = row
                    .get::<_, Option<_>>("property_title")
                    .zip(inquiry.property_id)
                    .map(|(title, id)| read::property::Summary {
                        id,
                        title,
                        slug: row.get("property_slug"),
                        price: row.get("property_price"),
                        primary_image: row.get("property_primary_image"),
                    });
                read::inquiry::Entry { inquiry, property }
            })
            .collect();

        Ok(read::inquiry::list::Page { items, arguments })
    }
}

impl<C>
    Database<
        Select<
            By<read::inquiry::list::TotalCount, read::inquiry::list::Filter>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::inquiry::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::inquiry::list::TotalCount, read::inquiry::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let conditions = conditions(&filter, &mut ps);

        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM inquiries q \
             WHERE true{conditions}"
        );
        self.query_opt(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                let count = row.expect("always exists").get::<_, i64>(0);
                u64::try_from(count).unwrap_or(0).into()
            })
    }
}
