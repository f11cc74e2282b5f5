//! Lazy paging over backend result sets.
//!
//! [`Pages`] walks the `next` links of a search result one page at a time.
//! [`PagingCursor`] flattens those pages into the resources of one kind and
//! only fetches a page once the previous one is used up.

use std::collections::VecDeque;

use xdsfhir_storage::{Bundle, FhirBackend, FhirResource};

use crate::error::QueryError;

/// Forward-only walk over the pages of one search result.
pub struct Pages<'a> {
    backend: &'a dyn FhirBackend,
    first: Option<Bundle>,
    next_link: Option<String>,
}

impl<'a> Pages<'a> {
    pub fn new(backend: &'a dyn FhirBackend, first: Bundle) -> Self {
        Self {
            backend,
            first: Some(first),
            next_link: None,
        }
    }

    /// The next page, `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Result<Option<Bundle>, QueryError> {
        let page = match self.first.take() {
            Some(first) => first,
            None => match self.next_link.take() {
                Some(link) => {
                    tracing::debug!(link = %link, "Loading next result page");
                    self.backend.load_page(&link).await?
                }
                None => return Ok(None),
            },
        };
        self.next_link = page.next_link().map(str::to_string);
        Ok(Some(page))
    }

    fn has_more(&self) -> bool {
        self.first.is_some() || self.next_link.is_some()
    }
}

/// Single pass over every resource of kind `T` in a paged result set.
///
/// Not restartable: scanning the same search again needs a new cursor.
pub struct PagingCursor<'a, T> {
    pages: Pages<'a>,
    buffer: VecDeque<T>,
}

impl<'a, T: FhirResource> PagingCursor<'a, T> {
    pub fn new(backend: &'a dyn FhirBackend, first: Bundle) -> Self {
        Self {
            pages: Pages::new(backend, first),
            buffer: VecDeque::new(),
        }
    }

    /// Whether another resource is available. Fetches the next page only when
    /// the current one is exhausted and a `next` link exists; pages without a
    /// resource of kind `T` are skipped.
    pub async fn has_next(&mut self) -> Result<bool, QueryError> {
        while self.buffer.is_empty() && self.pages.has_more() {
            if let Some(page) = self.pages.next_page().await? {
                self.buffer.extend(page.resources_of::<T>()?);
            }
        }
        Ok(!self.buffer.is_empty())
    }

    /// The next resource.
    ///
    /// # Errors
    ///
    /// `QueryError::CursorExhausted` when the result set has no resource
    /// left.
    pub async fn next(&mut self) -> Result<T, QueryError> {
        if !self.has_next().await? {
            return Err(QueryError::CursorExhausted);
        }
        self.buffer.pop_front().ok_or(QueryError::CursorExhausted)
    }

    /// The next resource, or `None` at the end of the result set.
    pub async fn try_next(&mut self) -> Result<Option<T>, QueryError> {
        if self.has_next().await? {
            Ok(self.buffer.pop_front())
        } else {
            Ok(None)
        }
    }

    /// Drains the cursor.
    pub async fn collect_all(mut self) -> Result<Vec<T>, QueryError> {
        let mut all = Vec::new();
        while let Some(resource) = self.try_next().await? {
            all.push(resource);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio_test::block_on;
    use xdsfhir_storage::{DocumentReference, SearchParams, StorageError};

    use super::*;

    /// Serves pages by link and counts fetches.
    struct LinkedPages {
        pages: Vec<(String, Bundle)>,
        loads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FhirBackend for LinkedPages {
        async fn search(&self, _params: &SearchParams) -> Result<Bundle, StorageError> {
            Err(StorageError::internal("not used"))
        }

        async fn load_page(&self, next_link: &str) -> Result<Bundle, StorageError> {
            self.loads.lock().unwrap().push(next_link.to_string());
            self.pages
                .iter()
                .find(|(link, _)| link == next_link)
                .map(|(_, page)| page.clone())
                .ok_or_else(|| StorageError::http(404, next_link))
        }

        fn backend_name(&self) -> &'static str {
            "linked"
        }
    }

    fn doc(id: &str) -> Value {
        json!({
            "resourceType": "DocumentReference",
            "id": id,
            "identifier": [{"value": format!("urn:uuid:{id}")}]
        })
    }

    fn backend(pages: Vec<(&str, Bundle)>) -> LinkedPages {
        LinkedPages {
            pages: pages
                .into_iter()
                .map(|(link, page)| (link.to_string(), page))
                .collect(),
            loads: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_next_page_fetched_only_when_exhausted() {
        let backend = backend(vec![("p2", Bundle::from_resources([doc("d3")]))]);
        let first = Bundle::from_resources([doc("d1"), doc("d2")]).with_next_link("p2");
        let mut cursor = PagingCursor::<DocumentReference>::new(&backend, first);

        assert_eq!(cursor.next().await.unwrap().id.as_deref(), Some("d1"));
        assert_eq!(cursor.next().await.unwrap().id.as_deref(), Some("d2"));
        assert!(backend.loads.lock().unwrap().is_empty());

        assert!(cursor.has_next().await.unwrap());
        assert_eq!(*backend.loads.lock().unwrap(), vec!["p2".to_string()]);
        assert_eq!(cursor.next().await.unwrap().id.as_deref(), Some("d3"));

        assert!(!cursor.has_next().await.unwrap());
        assert!(matches!(
            cursor.next().await,
            Err(QueryError::CursorExhausted)
        ));
        assert_eq!(backend.loads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pages_without_matching_resources_are_skipped() {
        let patient = json!({"resourceType": "Patient", "id": "p1"});
        let backend = backend(vec![
            ("p2", Bundle::from_resources([patient]).with_next_link("p3")),
            ("p3", Bundle::from_resources([doc("d9")])),
        ]);
        let first = Bundle::default().with_next_link("p2");
        let docs = PagingCursor::<DocumentReference>::new(&backend, first)
            .collect_all()
            .await
            .unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id.as_deref(), Some("d9"));
    }

    #[test]
    fn test_empty_first_page_without_link_is_exhausted() {
        let backend = backend(vec![]);
        let mut cursor = PagingCursor::<DocumentReference>::new(&backend, Bundle::default());

        assert!(!block_on(cursor.has_next()).unwrap());
        assert!(block_on(cursor.collect_all()).unwrap().is_empty());
        assert!(backend.loads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_page_fetch_failure_propagates() {
        let backend = backend(vec![]);
        let first = Bundle::default().with_next_link("gone");
        let mut cursor = PagingCursor::<DocumentReference>::new(&backend, first);

        let err = cursor.has_next().await.unwrap_err();
        assert!(matches!(err, QueryError::Backend(StorageError::Http { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_pages_walk_next_links() {
        let backend = backend(vec![("p2", Bundle::from_resources([doc("d2")]))]);
        let first = Bundle::from_resources([doc("d1")]).with_next_link("p2");
        let mut pages = Pages::new(&backend, first);

        assert!(pages.next_page().await.unwrap().is_some());
        assert!(pages.next_page().await.unwrap().is_some());
        assert!(pages.next_page().await.unwrap().is_none());
    }
}
