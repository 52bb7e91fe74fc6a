//! Taxonomy service: category/status reads and category creation over the
//! taxonomy repository port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::error::Error;
use super::ports::{
    PersistenceError, TaxonomyRepository, TaxonomyService, map_persistence_error,
};
use super::taxonomy::{Category, CategoryName, Status};

/// Default implementation of [`TaxonomyService`].
#[derive(Clone)]
pub struct TaxonomyServiceImpl {
    taxonomy: Arc<dyn TaxonomyRepository>,
}

impl TaxonomyServiceImpl {
    /// Create a service over the given port.
    pub fn new(taxonomy: Arc<dyn TaxonomyRepository>) -> Self {
        Self { taxonomy }
    }
}

#[async_trait]
impl TaxonomyService for TaxonomyServiceImpl {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        self.taxonomy
            .categories()
            .await
            .map_err(map_persistence_error)
    }

    async fn statuses(&self) -> Result<Vec<Status>, Error> {
        self.taxonomy
            .statuses()
            .await
            .map_err(map_persistence_error)
    }

    async fn create_category(&self, name: CategoryName) -> Result<Category, Error> {
        match self.taxonomy.insert_category(&name).await {
            Ok(category) => {
                info!(category_id = %category.id, "category created");
                Ok(category)
            }
            Err(PersistenceError::Conflict { .. }) => {
                Err(Error::conflict("category name already exists"))
            }
            Err(other) => Err(map_persistence_error(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Mutex;

    use super::*;
    use crate::domain::taxonomy::{CategoryId, StatusId};
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[derive(Default)]
    struct StubTaxonomyRepository {
        categories: Mutex<Vec<Category>>,
    }

    #[async_trait]
    impl TaxonomyRepository for StubTaxonomyRepository {
        async fn categories(&self) -> Result<Vec<Category>, PersistenceError> {
            Ok(self.categories.lock().expect("lock").clone())
        }

        async fn statuses(&self) -> Result<Vec<Status>, PersistenceError> {
            Ok(vec![
                Status {
                    id: StatusId::new(1),
                    name: "Idea".to_owned(),
                },
                Status {
                    id: StatusId::new(2),
                    name: "Planned".to_owned(),
                },
            ])
        }

        async fn find_category(
            &self,
            id: CategoryId,
        ) -> Result<Option<Category>, PersistenceError> {
            Ok(self
                .categories
                .lock()
                .expect("lock")
                .iter()
                .find(|category| category.id == id)
                .cloned())
        }

        async fn find_status(
            &self,
            _id: StatusId,
        ) -> Result<Option<Status>, PersistenceError> {
            Ok(None)
        }

        async fn insert_category(
            &self,
            name: &CategoryName,
        ) -> Result<Category, PersistenceError> {
            let mut categories = self.categories.lock().expect("lock");
            if categories
                .iter()
                .any(|category| category.name == name.as_ref())
            {
                return Err(PersistenceError::conflict("categories_name_key"));
            }
            let category = Category {
                id: CategoryId::new(i32::try_from(categories.len()).unwrap_or(0) + 1),
                name: name.as_ref().to_owned(),
            };
            categories.push(category.clone());
            Ok(category)
        }
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_category_name_conflicts() {
        let svc = TaxonomyServiceImpl::new(Arc::new(StubTaxonomyRepository::default()));
        let name = CategoryName::new("Docs").expect("valid name");

        svc.create_category(name.clone())
            .await
            .expect("first create succeeds");
        let err = svc
            .create_category(name)
            .await
            .expect_err("duplicate must conflict");

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.message(), "category name already exists");
    }

    #[rstest]
    #[tokio::test]
    async fn statuses_keep_id_order() {
        let svc = TaxonomyServiceImpl::new(Arc::new(StubTaxonomyRepository::default()));
        let statuses = svc.statuses().await.expect("statuses load");
        let ids: Vec<i32> = statuses.iter().map(|status| status.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
