//! Paged list responses.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::client::ResourceManagerClient;
use super::error::ApiError;
use reqwest::Method;

/// One page of a list operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default)]
    pub value: Vec<T>,
    /// Link to the next page, absent on the last one.
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// Whether another page follows this one.
    pub fn has_more(&self) -> bool {
        self.next_link.as_deref().is_some_and(|link| !link.is_empty())
    }
}

/// Fetch `first` and every following page, keeping items matching `predicate`.
pub(crate) async fn collect_pages<T, F>(
    client: &ResourceManagerClient,
    first: Url,
    predicate: F,
) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned + Send,
    F: Fn(&T) -> bool + Send + Sync,
{
    let mut items = Vec::new();
    let mut pages = 0usize;
    let mut next = Some(first);

    while let Some(url) = next.take() {
        let response = client.execute(Method::GET, url, None).await?;
        let page: Page<T> = serde_json::from_str(&response.body)?;
        pages += 1;

        if page.has_more() {
            if let Some(link) = page.next_link.as_deref() {
                next = Some(client.link_url(link)?);
            }
        }
        items.extend(page.value.into_iter().filter(|item| predicate(item)));
    }

    debug!(pages, items = items.len(), "listed all pages");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_decodes_next_link() {
        let page: Page<serde_json::Value> = serde_json::from_str(
            r#"{"value": [{"name": "a"}], "nextLink": "https://management.azure.com/next?page=2"}"#,
        )
        .unwrap();
        assert_eq!(page.value.len(), 1);
        assert!(page.has_more());
    }

    #[test]
    fn test_last_page() {
        let page: Page<serde_json::Value> = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(!page.has_more());

        let page: Page<serde_json::Value> =
            serde_json::from_str(r#"{"value": [], "nextLink": ""}"#).unwrap();
        assert!(!page.has_more());

        let page: Page<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.value.is_empty());
    }

    #[derive(Debug, Deserialize)]
    struct Machine {
        name: String,
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Page<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_page_of_items_without_default() {
        let page: Page<Machine> = decode(r#"{"value": [{"name": "arc-01"}, {"name": "arc-02"}]}"#);
        let names: Vec<&str> = page.value.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["arc-01", "arc-02"]);

        let empty: Page<Machine> = decode("{}");
        assert!(empty.value.is_empty());
    }
}
