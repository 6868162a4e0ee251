//! [`LegalDocument`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select, Update};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{legal_document, LegalDocument},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `legal_documents` table (aliased as `d`) along with the
/// creator summary (aliased as `u`).
const COLUMNS: &str = "\
    d.id, d.title, d.description, d.category, \
    d.file_path, d.file_name, d.file_size, d.mime_type, \
    d.is_active, d.position, d.created_by, d.created_at, d.updated_at, \
    u.name AS creator_name, u.email AS creator_email";

/// Reads a [`read::legal_document::Entry`] from the provided [`Row`] selected
/// with [`COLUMNS`].
fn entry_from_row(row: &Row) -> read::legal_document::Entry {
    let document = LegalDocument {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        file_path: row.get("file_path"),
        file_name: row.get("file_name"),
        file_size: row.get("file_size"),
        mime_type: row.get("mime_type"),
        is_active: row.get("is_active"),
        order: row.get("position"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    };
    let creator = row
        .get::<_, Option<_>>("creator_name")
        .zip(row.get::<_, Option<_>>("creator_email"))
        .map(|(name, email)| read::user::Summary {
            id: document.created_by,
            name,
            email,
        });
    read::legal_document::Entry { document, creator }
}

impl<C>
    Database<
        Select<
            By<Option<read::legal_document::Entry>, legal_document::Id>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<read::legal_document::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Option<read::legal_document::Entry>, legal_document::Id>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: legal_document::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM legal_documents d \
             LEFT JOIN users u ON u.id = d.created_by \
             WHERE d.id = $1::UUID"
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| entry_from_row(&row)))
    }
}

impl<C> Database<Select<By<Option<LegalDocument>, legal_document::Id>>>
    for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<
            By<Option<read::legal_document::Entry>, legal_document::Id>,
        >,
        Ok = Option<read::legal_document::Entry>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<LegalDocument>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<LegalDocument>, legal_document::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .execute(Select(By::new(by.into_inner())))
            .await
            .map_err(tracerr::wrap!())?
            .map(|e| e.document))
    }
}

impl<C>
    Database<
        Select<
            By<
                Vec<read::legal_document::Entry>,
                read::legal_document::list::Filter,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::legal_document::Entry>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Vec<read::legal_document::Entry>,
                read::legal_document::list::Filter,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::legal_document::list::Filter {
            category,
            active_only,
        } = by.into_inner();

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let category_idx = category.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM legal_documents d \
             LEFT JOIN users u ON u.id = d.created_by \
             WHERE true \
                   {category_filtering} \
                   {active_filtering} \
             ORDER BY d.position ASC, d.created_at DESC, d.id",
            category_filtering = category_idx
                .map(|i| format!("AND d.category = ${i}::VARCHAR"))
                .unwrap_or_default(),
            active_filtering = if active_only { "AND d.is_active" } else { "" },
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(entry_from_row)
            .collect())
    }
}

impl<C> Database<Insert<LegalDocument>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<LegalDocument>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(document): Insert<LegalDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(document)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<LegalDocument>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(document): Update<LegalDocument>,
    ) -> Result<Self::Ok, Self::Err> {
        let LegalDocument {
            id,
            title,
            description,
            category,
            file_path,
            file_name,
            file_size,
            mime_type,
            is_active,
            order,
            created_by,
            created_at,
            updated_at,
        } = document;

        const SQL: &str = "\
            INSERT INTO legal_documents (\
                id, title, description, category, \
                file_path, file_name, file_size, mime_type, \
                is_active, position, created_by, created_at, updated_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::VARCHAR, $6::VARCHAR, $7::INT8, $8::VARCHAR, \
                $9::BOOLEAN, $10::INT4, $11::UUID, \
                $12::TIMESTAMPTZ, $13::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                category = EXCLUDED.category, \
                file_path = EXCLUDED.file_path, \
                file_name = EXCLUDED.file_name, \
                file_size = EXCLUDED.file_size, \
                mime_type = EXCLUDED.mime_type, \
                is_active = EXCLUDED.is_active, \
                position = EXCLUDED.position, \
                created_by = EXCLUDED.created_by, \
                created_at = EXCLUDED.created_at, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &category,
                &file_path,
                &file_name,
                &file_size,
                &mime_type,
                &is_active,
                &order,
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

impl<C> Database<Delete<By<LegalDocument, legal_document::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<LegalDocument, legal_document::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: legal_document::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM legal_documents \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
