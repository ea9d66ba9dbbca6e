//! pagination helpers
//!
//! typed view of the list envelope and a paginator that walks page numbers
//! until the server reports no next page or sends an empty page.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// one page of a list operation: `items`, `hasNextPage`, `hasPreviousPage`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    /// requested selection for each item
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// true if a following page exists
    #[serde(default)]
    pub has_next_page: bool,
    /// true if a preceding page exists
    #[serde(default)]
    pub has_previous_page: bool,
}

impl<T: DeserializeOwned> ListPage<T> {
    /// decode an unwrapped list payload
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// generic paginator over numbered pages (1-based)
pub struct Paginator<T, R, Fetch, Fut, Extract>
where
    Fetch: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<R>>,
    Extract: FnMut(R) -> Result<ListPage<T>>,
{
    fetch: Fetch,
    extract: Extract,
    page: u32,
    done: bool,
    _phantom: std::marker::PhantomData<(T, R)>,
}

impl<T, R, Fetch, Fut, Extract> Paginator<T, R, Fetch, Fut, Extract>
where
    Fetch: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<R>>,
    Extract: FnMut(R) -> Result<ListPage<T>>,
{
    /// create a new paginator starting at page 1
    pub fn new(fetch: Fetch, extract: Extract) -> Self {
        Self {
            fetch,
            extract,
            page: 1,
            done: false,
            _phantom: std::marker::PhantomData,
        }
    }

    /// start at `page` instead of 1
    pub fn starting_at(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// fetch the next page of results.
    ///
    /// paging ends after a page without `hasNextPage` or without items.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.done {
            return Ok(None);
        }

        let response = (self.fetch)(self.page).await?;
        let page = (self.extract)(response)?;
        if !page.has_next_page || page.items.is_empty() {
            self.done = true;
        } else {
            match self.page.checked_add(1) {
                Some(next) => self.page = next,
                None => {
                    self.done = true;
                    return Err(Error::UnexpectedPayload(format!(
                        "page number overflow after page {}",
                        self.page
                    )));
                }
            }
        }

        Ok(Some(page.items))
    }

    /// fetch all pages and return a single collection
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_list_page_from_value() {
        let page: ListPage<serde_json::Value> = ListPage::from_value(serde_json::json!({
            "items": [{"id": 1}, {"id": 2}],
            "hasNextPage": true,
            "hasPreviousPage": false
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_next_page);
        assert!(!page.has_previous_page);

        assert!(ListPage::<serde_json::Value>::from_value(serde_json::json!([1])).is_err());
    }

    #[test]
    fn test_list_page_items_default_without_default_bound() {
        #[derive(Debug, Deserialize)]
        struct Product {
            #[allow(dead_code)]
            id: i64,
        }

        let page: ListPage<Product> =
            ListPage::from_value(serde_json::json!({"hasNextPage": false})).unwrap();
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_stops_on_empty_page() {
        let calls = Arc::new(Mutex::new(0u32));
        let calls_fetch = calls.clone();
        let fetch = move |_: u32| {
            let calls = calls_fetch.clone();
            async move {
                *calls.lock().unwrap() += 1;
                Ok(ListPage::<i32> {
                    items: vec![],
                    has_next_page: true,
                    has_previous_page: false,
                })
            }
        };
        let extract = |page: ListPage<i32>| Ok(page);

        let items = Paginator::new(fetch, extract).collect_all().await.unwrap();
        assert!(items.is_empty());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_page_overflow() {
        let fetch = |_: u32| async {
            Ok(ListPage::<i32> {
                items: vec![1],
                has_next_page: true,
                has_previous_page: true,
            })
        };
        let extract = |page: ListPage<i32>| Ok(page);

        let mut paginator = Paginator::new(fetch, extract).starting_at(u32::MAX);
        let err = paginator.next_page().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedPayload(_)));
        assert!(paginator.next_page().await.unwrap().is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_collect_all() {
        let pages: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let pages_fetch = pages.clone();

        let fetch = move |page: u32| {
            let pages = pages_fetch.clone();
            async move {
                pages.lock().unwrap().push(page);
                Ok(ListPage {
                    items: vec![page * 10, page * 10 + 1],
                    has_next_page: page < 2,
                    has_previous_page: page > 1,
                })
            }
        };

        let extract = |page: ListPage<u32>| Ok(page);

        let paginator = Paginator::new(fetch, extract);
        let items = paginator.collect_all().await.unwrap();
        assert_eq!(items, vec![10, 11, 20, 21]);
        assert_eq!(*pages.lock().unwrap(), vec![1, 2]);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_pagination_next_page_done() {
        let fetch = |_: u32| async {
            Ok(ListPage::<i32> {
                items: vec![42],
                has_next_page: false,
                has_previous_page: false,
            })
        };
        let extract = |page: ListPage<i32>| Ok(page);

        let mut paginator = Paginator::new(fetch, extract);
        let page = paginator.next_page().await.unwrap();
        assert_eq!(page.unwrap(), vec![42]);
        let none = paginator.next_page().await.unwrap();
        assert!(none.is_none());
    }
}
