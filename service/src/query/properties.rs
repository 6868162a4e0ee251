//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Property;
use crate::{
    infra::{database, Database},
    read::property::list,
    Service,
};

use super::Query;

/// Searches [`Property`] listings.
///
/// Counts the [`Property`]s matching the [`list::Filter`] first, and then
/// selects the requested [`list::Page`] of them.
#[derive(Clone, Debug)]
pub struct Search(pub list::Selector);

impl<Db, Ms, Gc> Query<Search> for Service<Db, Ms, Gc>
where
    Db: Database<
            Select<By<list::TotalCount, list::Filter>>,
            Ok = list::TotalCount,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<list::Page, list::Selector>>,
            Ok = list::Page,
            Err = Traced<database::Error>,
        >,
{
    type Ok = list::Connection;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Search(selector): Search,
    ) -> Result<Self::Ok, Self::Err> {
        let total = self
            .database()
            .execute(Select(By::<list::TotalCount, _>::new(
                selector.filter.clone(),
            )))
            .await
            .map_err(tracerr::wrap!())?;
        let page = self
            .database()
            .execute(Select(By::<list::Page, _>::new(selector)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(list::Connection::new(page, total.into()))
    }
}

#[cfg(test)]
mod spec {
    use std::collections::HashSet;

    use common::{operations::Insert, pagination::Order};

    use crate::{
        domain::{property, Property},
        infra::{database::Memory, Database as _},
        read::property::list,
        test_utils::{property, service},
        Query as _,
    };

    use super::Search;

    async fn seed(db: &Memory, prices: &[i64]) {
        for (n, price) in prices.iter().enumerate() {
            db.execute(Insert(Property {
                price: property::Price::new(*price).unwrap(),
                ..property(&format!("Listing {n}"))
            }))
            .await
            .unwrap();
        }
    }

    fn selector(
        page: u32,
        limit: Option<u32>,
        filter: list::Filter,
        sort: list::Sort,
    ) -> list::Selector {
        list::Selector {
            arguments: list::Arguments::new(
                Some(page),
                limit,
                list::DEFAULT_LIMIT,
            )
            .unwrap(),
            filter,
            sort,
        }
    }

    fn prices(conn: &list::Connection) -> Vec<i64> {
        conn.page
            .items
            .iter()
            .map(|l| l.property.price.into())
            .collect()
    }

    #[tokio::test]
    async fn filters_by_price_range() {
        let (svc, db) = service();
        seed(
            &db,
            &[
                500_000, 1_999_999, 2_000_000, 3_500_000, 5_000_000,
                5_000_001, 8_000_000, 12_000_000, 40_000_000, 90_000,
            ],
        )
        .await;

        let conn = svc
            .execute(Search(selector(
                1,
                None,
                list::Filter {
                    min_price: property::Price::new(2_000_000),
                    max_price: property::Price::new(5_000_000),
                    ..list::Filter::default()
                },
                list::Sort::default(),
            )))
            .await
            .unwrap();

        assert_eq!(conn.info.total, 3);
        assert_eq!(conn.info.total_pages, 1);
        assert!(!conn.info.has_next);
        assert!(!conn.info.has_prev);
        let mut found = prices(&conn);
        found.sort_unstable();
        assert_eq!(found, [2_000_000, 3_500_000, 5_000_000]);
    }

    #[tokio::test]
    async fn walks_pages_with_stable_total() {
        let (svc, db) = service();
        let all = (1..=25).map(|n| n * 100_000).collect::<Vec<_>>();
        seed(&db, &all).await;
        let sort = list::Sort {
            by: list::SortBy::Price,
            order: Order::Ascending,
        };

        let mut seen = Vec::new();
        for (page, len, has_next, has_prev) in
            [(1, 10, true, false), (2, 10, true, true), (3, 5, false, true)]
        {
            let conn = svc
                .execute(Search(selector(
                    page,
                    Some(10),
                    list::Filter::default(),
                    sort,
                )))
                .await
                .unwrap();

            assert_eq!(conn.info.total, 25, "page {page}");
            assert_eq!(conn.info.total_pages, 3, "page {page}");
            assert_eq!(conn.page.items.len(), len, "page {page}");
            assert_eq!(conn.info.has_next, has_next, "page {page}");
            assert_eq!(conn.info.has_prev, has_prev, "page {page}");
            seen.extend(prices(&conn));
        }

        assert_eq!(seen, all);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 25);

        let conn = svc
            .execute(Search(selector(
                4,
                Some(10),
                list::Filter::default(),
                sort,
            )))
            .await
            .unwrap();
        assert!(conn.page.items.is_empty());
        assert_eq!(conn.info.total, 25);
    }

    #[tokio::test]
    async fn sorts_by_requested_column() {
        let (svc, db) = service();
        seed(&db, &[3_000_000, 1_000_000, 2_000_000]).await;

        let search = |by, order| {
            Search(selector(
                1,
                None,
                list::Filter::default(),
                list::Sort { by, order },
            ))
        };

        let conn = svc
            .execute(search(list::SortBy::Price, Order::Ascending))
            .await
            .unwrap();
        assert_eq!(prices(&conn), [1_000_000, 2_000_000, 3_000_000]);

        let conn = svc
            .execute(search(list::SortBy::Price, Order::Descending))
            .await
            .unwrap();
        assert_eq!(prices(&conn), [3_000_000, 2_000_000, 1_000_000]);

        let conn = svc
            .execute(search(list::SortBy::Title, Order::Ascending))
            .await
            .unwrap();
        let titles = conn
            .page
            .items
            .iter()
            .map(|l| l.property.title.to_string())
            .collect::<Vec<_>>();
        assert_eq!(titles, ["Listing 0", "Listing 1", "Listing 2"]);
    }

    #[tokio::test]
    async fn counts_what_unpaginated_search_returns() {
        let (svc, db) = service();
        seed(&db, &[1, 2, 3, 4, 5, 6, 7]).await;
        let filter = list::Filter {
            max_price: property::Price::new(5),
            ..list::Filter::default()
        };

        let paged = svc
            .execute(Search(selector(
                1,
                Some(2),
                filter.clone(),
                list::Sort::default(),
            )))
            .await
            .unwrap();
        let whole = svc
            .execute(Search(selector(
                1,
                Some(list::Arguments::MAX_LIMIT),
                filter,
                list::Sort::default(),
            )))
            .await
            .unwrap();

        assert_eq!(paged.page.items.len(), 2);
        assert_eq!(paged.info.total, 5);
        assert_eq!(whole.info.total, 5);
        assert_eq!(
            u64::try_from(whole.page.items.len()).unwrap(),
            whole.info.total,
        );
    }
}
