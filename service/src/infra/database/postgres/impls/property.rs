//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of the `properties` table (aliased as `p`) along with the
/// engagement counters.
const COLUMNS: &str = "\
    p.id, p.title, p.description, p.price, \
    p.location, p.address, p.latitude, p.longitude, \
    p.kind, p.status, \
    p.bedrooms, p.bathrooms, p.area, p.parking, \
    p.featured, p.year_built, \
    p.furnished, p.pet_friendly, p.garden, p.balcony, \
    p.slug, p.sold_at, p.created_by, p.created_at, p.updated_at, \
    (SELECT COUNT(*) \
     FROM property_views v \
     WHERE v.property_id = p.id)::INT8 AS views_count, \
    (SELECT COUNT(*) \
     FROM inquiries i \
     WHERE i.property_id = p.id)::INT8 AS inquiries_count";

/// Reads a [`Property`] from the provided [`Row`] selected with [`COLUMNS`].
fn property_from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        price: row.get("price"),
        location: row.get("location"),
        address: row.get("address"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        kind: row.get("kind"),
        status: row.get("status"),
        bedrooms: row.get("bedrooms"),
        bathrooms: row.get("bathrooms"),
        area: row.get("area"),
        parking: row.get("parking"),
        featured: row.get("featured"),
        year_built: row.get("year_built"),
        amenities: property::Amenities {
            furnished: row.get("furnished"),
            pet_friendly: row.get("pet_friendly"),
            garden: row.get("garden"),
            balcony: row.get("balcony"),
        },
        slug: row.get("slug"),
        sold_at: row.get("sold_at"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Reads [`read::property::Counts`] from the provided [`Row`] selected with
/// [`COLUMNS`].
fn counts_from_row(row: &Row) -> read::property::Counts {
    let count = |col: &str| u64::try_from(row.get::<_, i64>(col)).unwrap_or(0);
    read::property::Counts {
        views: count("views_count"),
        inquiries: count("inquiries_count"),
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties p \
             WHERE p.id = $1::UUID"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| property_from_row(&row)))
    }
}

impl<'s, C> Database<Select<By<Option<Property>, &'s property::Slug>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<Option<Property>, property::Id>>,
        Ok = Option<Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, &'s property::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE slug = $1::VARCHAR \
            LIMIT 1";
        let Some(row) = self
            .query_opt(SQL, &[slug])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        self.execute(Select(By::new(row.get::<_, property::Id>("id"))))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            title,
            description,
            price,
            location,
            address,
            latitude,
            longitude,
            kind,
            status,
            bedrooms,
            bathrooms,
            area,
            parking,
            featured,
            year_built,
            amenities:
                property::Amenities {
                    furnished,
                    pet_friendly,
                    garden,
                    balcony,
                },
            slug,
            sold_at,
            created_by,
            created_at,
            updated_at,
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, title, description, price, \
                location, address, latitude, longitude, \
                kind, status, \
                bedrooms, bathrooms, area, parking, \
                featured, year_built, \
                furnished, pet_friendly, garden, balcony, \
                slug, sold_at, created_by, created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::TEXT, $4::INT8, \
                $5::VARCHAR, $6::VARCHAR, $7::FLOAT8, $8::FLOAT8, \
                $9::VARCHAR, $10::VARCHAR, \
                $11::INT4, $12::INT4, $13::INT4, $14::INT4, \
                $15::BOOLEAN, $16::INT4, \
                $17::BOOLEAN, $18::BOOLEAN, $19::BOOLEAN, $20::BOOLEAN, \
                $21::VARCHAR, $22::TIMESTAMPTZ, $23::UUID, \
                $24::TIMESTAMPTZ, $25::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                price = EXCLUDED.price, \
                location = EXCLUDED.location, \
                address = EXCLUDED.address, \
                latitude = EXCLUDED.latitude, \
                longitude = EXCLUDED.longitude, \
                kind = EXCLUDED.kind, \
                status = EXCLUDED.status, \
                bedrooms = EXCLUDED.bedrooms, \
                bathrooms = EXCLUDED.bathrooms, \
                area = EXCLUDED.area, \
                parking = EXCLUDED.parking, \
                featured = EXCLUDED.featured, \
                year_built = EXCLUDED.year_built, \
                furnished = EXCLUDED.furnished, \
                pet_friendly = EXCLUDED.pet_friendly, \
                garden = EXCLUDED.garden, \
                balcony = EXCLUDED.balcony, \
                slug = EXCLUDED.slug, \
                sold_at = EXCLUDED.sold_at, \
                created_by = EXCLUDED.created_by, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &price,
                &location,
                &address,
                &latitude,
                &longitude,
                &kind,
                &status,
                &bedrooms,
                &bathrooms,
                &area,
                &parking,
                &featured,
                &year_built,
                &furnished,
                &pet_friendly,
                &garden,
                &balcony,
                &slug,
                &sold_at,
                &created_by,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        // Images, features and views are removed by `ON DELETE CASCADE`,
        // inquiries are detached by `ON DELETE SET NULL`.
        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, IDs>
    Database<Select<By<HashMap<property::Id, Vec<property::Image>>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Vec<property::Image>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<HashMap<property::Id, Vec<property::Image>>, IDs>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, property_id, url, public_id, caption, \
                   is_primary, position \
            FROM property_images \
            WHERE property_id = ANY($1::UUID[]) \
            ORDER BY property_id, position, id";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| property::Image {
                id: row.get("id"),
                property_id: row.get("property_id"),
                url: row.get("url"),
                public_id: row.get("public_id"),
                caption: row.get("caption"),
                is_primary: row.get("is_primary"),
                order: row.get("position"),
            })
            .into_group_map_by(|i| i.property_id))
    }
}

impl<C> Database<Select<By<Vec<property::Image>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<HashMap<property::Id, Vec<property::Image>>, [property::Id; 1]>,
        >,
        Ok = HashMap<property::Id, Vec<property::Image>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<property::Image>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<property::Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id)
            .unwrap_or_default())
    }
}

impl<C> Database<Insert<property::Image>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<property::Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let property::Image {
            id,
            property_id,
            url,
            public_id,
            caption,
            is_primary,
            order,
        } = image;

        const SQL: &str = "\
            INSERT INTO property_images (\
                id, property_id, url, public_id, caption, \
                is_primary, position\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::BOOLEAN, $7::INT4\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &property_id,
                &url,
                &public_id,
                &caption,
                &is_primary,
                &order,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<property::Image>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<property::Image>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM property_images \
            WHERE property_id = $1::UUID";
        self.exec(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C, IDs>
    Database<Select<By<HashMap<property::Id, Vec<property::Feature>>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Vec<property::Feature>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<HashMap<property::Id, Vec<property::Feature>>, IDs>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        const SQL: &str = "\
            SELECT id, property_id, name, icon \
            FROM property_features \
            WHERE property_id = ANY($1::UUID[]) \
            ORDER BY property_id, seq";
        Ok(self
            .query(SQL, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| property::Feature {
                id: row.get("id"),
                property_id: row.get("property_id"),
                name: row.get("name"),
                icon: row.get("icon"),
            })
            .into_group_map_by(|f| f.property_id))
    }
}

impl<C> Database<Insert<property::Feature>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(feature): Insert<property::Feature>,
    ) -> Result<Self::Ok, Self::Err> {
        let property::Feature {
            id,
            property_id,
            name,
            icon,
        } = feature;

        const SQL: &str = "\
            INSERT INTO property_features (id, property_id, name, icon) \
            VALUES ($1::UUID, $2::UUID, $3::VARCHAR, $4::VARCHAR)";
        self.exec(SQL, &[&id, &property_id, &name, &icon])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Vec<property::Feature>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<property::Feature>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let property_id: property::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM property_features \
            WHERE property_id = $1::UUID";
        self.exec(SQL, &[&property_id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<property::View>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(view): Insert<property::View>,
    ) -> Result<Self::Ok, Self::Err> {
        let property::View {
            id,
            property_id,
            ip_address,
            user_agent,
            created_at,
        } = view;

        const SQL: &str = "\
            INSERT INTO property_views (\
                id, property_id, ip_address, user_agent, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::TEXT, $5::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &property_id, &ip_address, &user_agent, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<
                By<HashMap<property::Id, Vec<property::Image>>, Vec<property::Id>>,
            >,
            Ok = HashMap<property::Id, Vec<property::Image>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    HashMap<property::Id, Vec<property::Feature>>,
                    Vec<property::Id>,
                >,
            >,
            Ok = HashMap<property::Id, Vec<property::Feature>>,
            Err = Traced<database::Error>,
        >,
{
    /// Assembles [`read::property::Listing`]s out of the provided [`Row`]s
    /// selected with [`COLUMNS`], preserving their order.
    async fn listings(
        &self,
        rows: Vec<Row>,
    ) -> Result<Vec<read::property::Listing>, Traced<database::Error>> {
        let ids = rows
            .iter()
            .map(|r| r.get("id"))
            .collect::<Vec<property::Id>>();
        let mut images = self
            .execute(Select(By::<
                HashMap<property::Id, Vec<property::Image>>,
                _,
            >::new(ids.clone())))
            .await
            .map_err(tracerr::wrap!())?;
        let mut features = self
            .execute(Select(By::<
                HashMap<property::Id, Vec<property::Feature>>,
                _,
            >::new(ids)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(rows
            .iter()
            .map(|row| {
                let property = property_from_row(row);
                read::property::Listing {
                    images: images.remove(&property.id).unwrap_or_default(),
                    features: features
                        .remove(&property.id)
                        .unwrap_or_default(),
                    counts: counts_from_row(row),
                    property,
                }
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<read::property::Details>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<
                By<HashMap<property::Id, Vec<property::Image>>, Vec<property::Id>>,
            >,
            Ok = HashMap<property::Id, Vec<property::Image>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    HashMap<property::Id, Vec<property::Feature>>,
                    Vec<property::Id>,
                >,
            >,
            Ok = HashMap<property::Id, Vec<property::Feature>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<read::property::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::property::Details>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS}, \
                    u.name AS creator_name, u.email AS creator_email \
             FROM properties p \
             INNER JOIN users u ON u.id = p.created_by \
             WHERE p.id = $1::UUID"
        );
        let Some(row) = self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };
        let creator = read::user::Summary {
            id: row.get("created_by"),
            name: row.get("creator_name"),
            email: row.get("creator_email"),
        };

        Ok(self
            .listings(vec![row])
            .await
            .map_err(tracerr::wrap!())?
            .pop()
            .map(|listing| read::property::Details { listing, creator }))
    }
}

impl<C> Database<Select<By<Option<read::property::Summary>, property::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::property::Summary>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::property::Summary>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT p.id, p.title, p.slug, p.price, \
                   (SELECT i.url \
                    FROM property_images i \
                    WHERE i.property_id = p.id \
                      AND i.is_primary \
                    ORDER BY i.position \
                    LIMIT 1) AS primary_image \
            FROM properties p \
            WHERE p.id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| read::property::Summary {
                id: row.get("id"),
                title: row.get("title"),
                slug: row.get("slug"),
                price: row.get("price"),
                primary_image: row.get("primary_image"),
            }))
    }
}

/// [`FuzzPattern`]s of a [`read::property::list::Filter`].
struct Patterns {
    /// Pattern of [`read::property::list::Filter::search`].
    search: Option<FuzzPattern>,

    /// Pattern of [`read::property::list::Filter::location`].
    location: Option<FuzzPattern>,
}

impl Patterns {
    /// Creates new [`Patterns`] of the provided `filter`.
    fn new(filter: &read::property::list::Filter) -> Self {
        Self {
            search: filter.search.as_deref().map(FuzzPattern::new),
            location: filter.location.as_deref().map(FuzzPattern::new),
        }
    }
}

/// Renders `WHERE` conditions of the provided `filter`, pushing their
/// parameters into `ps`.
fn conditions<'a>(
    filter: &'a read::property::list::Filter,
    patterns: &'a Patterns,
    ps: &mut Vec<&'a (dyn ToSql + Sync)>,
) -> String {
    let read::property::list::Filter {
        search: _,
        kind,
        status,
        location: _,
        min_price,
        max_price,
        min_bedrooms,
        max_bedrooms,
        featured_only,
    } = filter;

    let mut bind = |p: &'a (dyn ToSql + Sync)| {
        ps.push(p);
        ps.len()
    };

    let mut conds = vec![];
    if let Some(p) = &patterns.search {
        let i = bind(p);
        conds.push(format!(
            "(p.title ILIKE ${i}::VARCHAR \
              OR p.description ILIKE ${i}::VARCHAR \
              OR p.location ILIKE ${i}::VARCHAR \
              OR p.address ILIKE ${i}::VARCHAR)"
        ));
    }
    if let Some(k) = kind {
        conds.push(format!("p.kind = ${}::VARCHAR", bind(k)));
    }
    if let Some(s) = status {
        conds.push(format!("p.status = ${}::VARCHAR", bind(s)));
    }
    if let Some(p) = &patterns.location {
        conds.push(format!("p.location ILIKE ${}::VARCHAR", bind(p)));
    }
    if let Some(min) = min_price {
        conds.push(format!("p.price >= ${}::INT8", bind(min)));
    }
    if let Some(max) = max_price {
        conds.push(format!("p.price <= ${}::INT8", bind(max)));
    }
    if let Some(min) = min_bedrooms {
        conds.push(format!("p.bedrooms >= ${}::INT4", bind(min)));
    }
    if let Some(max) = max_bedrooms {
        conds.push(format!("p.bedrooms <= ${}::INT4", bind(max)));
    }
    if *featured_only {
        conds.push("p.featured".to_owned());
    }

    conds
        .iter()
        .format_with("", |c, f| f(&format_args!(" AND {c}")))
        .to_string()
}

impl<C>
    Database<
        Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
    Self: Database<
            Select<
                By<HashMap<property::Id, Vec<property::Image>>, Vec<property::Id>>,
            >,
            Ok = HashMap<property::Id, Vec<property::Image>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<
                By<
                    HashMap<property::Id, Vec<property::Feature>>,
                    Vec<property::Id>,
                >,
            >,
            Ok = HashMap<property::Id, Vec<property::Feature>>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::list::Selector {
            arguments,
            filter,
            sort,
        } = by.into_inner();

        let limit = i64::from(arguments.limit());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);
        let patterns = Patterns::new(&filter);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let conditions = conditions(&filter, &patterns, &mut ps);

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties p \
             WHERE true{conditions} \
             ORDER BY p.{column} {order} NULLS LAST, \
                      p.id {order} \
             LIMIT $1::INT8 \
             OFFSET $2::INT8",
            column = sort.by.column(),
            order = sort.order.sql(),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        Ok(read::property::list::Page {
            items: self.listings(rows).await.map_err(tracerr::wrap!())?,
            arguments,
        })
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::TotalCount, read::property::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let patterns = Patterns::new(&filter);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let conditions = conditions(&filter, &patterns, &mut ps);

        let sql = format!(
            "SELECT COUNT(*)::INT8 \
             FROM properties p \
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
