//! [`Query`] collection related to the multiple [`Inquiry`]s.

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Inquiry;
use crate::{
    infra::{database, Database},
    read::inquiry::list,
    Service,
};

use super::Query;

/// Searches [`Inquiry`] entries.
///
/// Counts the [`Inquiry`]s matching the [`list::Filter`] first, and then
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
            .execute(Select(By::<list::TotalCount, _>::new(selector.filter)))
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
    use crate::{
        command::{CreateInquiry, UpdateInquiryStatus},
        domain::inquiry,
        read::inquiry::list,
        test_utils::{inquiry_draft, service},
        Command as _, Query as _,
    };

    use super::Search;

    fn selector(page: u32, limit: u32, filter: list::Filter) -> list::Selector {
        list::Selector {
            arguments: list::Arguments::new(
                Some(page),
                Some(limit),
                list::DEFAULT_LIMIT,
            )
            .unwrap(),
            filter,
            sort: (),
        }
    }

    #[tokio::test]
    async fn filters_and_paginates() {
        let (svc, _) = service();
        let mut consultations = Vec::new();
        for kind in [
            inquiry::Kind::General,
            inquiry::Kind::Consultation,
            inquiry::Kind::Consultation,
            inquiry::Kind::Consultation,
        ] {
            let entry = svc
                .execute(CreateInquiry {
                    kind: Some(kind),
                    ..inquiry_draft()
                })
                .await
                .unwrap();
            if kind == inquiry::Kind::Consultation {
                consultations.push(entry.inquiry.id);
            }
        }
        _ = svc
            .execute(UpdateInquiryStatus {
                id: consultations[0],
                status: inquiry::Status::Resolved,
            })
            .await
            .unwrap();

        let filter = list::Filter {
            kind: Some(inquiry::Kind::Consultation),
            ..list::Filter::default()
        };
        let mut seen = Vec::new();
        for page in 1..=2 {
            let conn = svc
                .execute(Search(selector(page, 2, filter)))
                .await
                .unwrap();
            assert_eq!(conn.info.total, 3, "page {page}");
            assert_eq!(conn.info.total_pages, 2, "page {page}");
            seen.extend(conn.page.items.into_iter().map(|e| e.inquiry.id));
        }
        seen.sort();
        consultations.sort();
        assert_eq!(seen, consultations);

        let conn = svc
            .execute(Search(selector(
                1,
                10,
                list::Filter {
                    status: Some(inquiry::Status::New),
                    ..filter
                },
            )))
            .await
            .unwrap();
        assert_eq!(conn.info.total, 2);
        assert!(conn
            .page
            .items
            .iter()
            .all(|e| e.inquiry.status == inquiry::Status::New));
    }
}
