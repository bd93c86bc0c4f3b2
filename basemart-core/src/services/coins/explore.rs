use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{CoinSource, ProviderError};
use crate::interfaces::coin::{CoinList, CoinNode, CoinPage};

const API_KEY_HEADER: &str = "api-key";

#[derive(Debug, Deserialize)]
struct ExploreEdge {
    node: CoinNode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExploreList {
    #[serde(default)]
    edges: Vec<ExploreEdge>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

/// Payloads come either bare or wrapped in a GraphQL style `data` object.
fn unwrap_data(body: &Value) -> &Value {
    match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => body,
    }
}

pub fn parse_explore_response(body: &Value) -> Result<CoinPage, ProviderError> {
    let list = match unwrap_data(body).get("exploreList") {
        Some(list) if !list.is_null() => list,
        _ => {
            return Err(ProviderError::MissingDataError(
                "exploreList missing from response".to_string(),
            ))
        }
    };
    let list: ExploreList = serde_json::from_value(list.clone())?;

    Ok(CoinPage {
        coins: list.edges.into_iter().map(|edge| edge.node).collect(),
        next_cursor: list
            .page_info
            .and_then(|info| info.end_cursor)
            .filter(|cursor| !cursor.is_empty()),
    })
}

pub fn parse_coin_response(body: &Value) -> Result<Option<CoinNode>, ProviderError> {
    match unwrap_data(body).get("zora20Token") {
        None | Some(Value::Null) => Ok(None),
        Some(token) => Ok(Some(serde_json::from_value(token.clone())?)),
    }
}

/// Public explore REST API. Works anonymously; the key only lifts rate
/// limits.
#[derive(Debug, Clone)]
pub struct ExploreApiSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    chain_id: u64,
}

impl ExploreApiSource {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        chain_id: u64,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chain_id,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn get_json(&self, request: RequestBuilder) -> Result<Value, ProviderError> {
        let request = match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        };
        let response = request.header("accept", "application/json").send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl CoinSource for ExploreApiSource {
    fn name(&self) -> &'static str {
        "explore-api"
    }

    async fn list_coins(
        &self,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> Result<CoinPage, ProviderError> {
        let list_type = list.explore_list_type().ok_or_else(|| ProviderError::Unsupported {
            provider: self.name().to_string(),
            what: list.label().to_string(),
        })?;

        let mut query = vec![
            ("listType", list_type.to_string()),
            ("count", count.to_string()),
        ];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }
        debug!("GET {}/api/explore {:?}", self.base_url, query);

        let request = self
            .client
            .get(format!("{}/api/explore", self.base_url))
            .query(&query);
        let body = self.get_json(request).await?;
        parse_explore_response(&body)
    }

    async fn coin_details(&self, address: &str) -> Result<Option<CoinNode>, ProviderError> {
        let request = self
            .client
            .get(format!("{}/api/coin", self.base_url))
            .query(&[
                ("address", address.to_string()),
                ("chain", self.chain_id.to_string()),
            ]);
        let body = self.get_json(request).await?;
        parse_coin_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wrapped_explore_page() {
        let body = json!({
            "data": {
                "exploreList": {
                    "edges": [
                        { "node": { "address": "0x01", "name": "One", "priceChange24h": "4.2" } },
                        { "node": { "address": "0x02", "name": "Two", "marketCapDelta24h": -1 } }
                    ],
                    "pageInfo": { "endCursor": "cursor-2", "hasNextPage": true }
                }
            }
        });

        let page = parse_explore_response(&body).unwrap();

        assert_eq!(page.coins.len(), 2);
        assert_eq!(page.coins[0].address, "0x01");
        assert_eq!(page.coins[1].name.as_deref(), Some("Two"));
        assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
    }

    #[test]
    fn test_parse_bare_explore_page() {
        let body = json!({ "exploreList": { "edges": [], "pageInfo": { "endCursor": "" } } });

        let page = parse_explore_response(&body).unwrap();

        assert!(page.coins.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_fail_without_explore_list() {
        let err = parse_explore_response(&json!({ "data": { "exploreList": null } })).unwrap_err();
        assert!(matches!(err, ProviderError::MissingDataError(_)));

        let err = parse_explore_response(&json!({ "errors": [] })).unwrap_err();
        assert!(matches!(err, ProviderError::MissingDataError(_)));
    }

    #[test]
    fn test_parse_coin_detail() {
        let body = json!({
            "zora20Token": {
                "address": "0x4200000000000000000000000000000000000006",
                "name": "Frog",
                "symbol": "FROG",
                "totalSupply": "1000000000",
                "uniqueHolders": 12
            }
        });

        let node = parse_coin_response(&body).unwrap().unwrap();
        assert_eq!(node.symbol.as_deref(), Some("FROG"));
        assert_eq!(node.unique_holders, Some(12));

        assert_eq!(parse_coin_response(&json!({ "zora20Token": null })).unwrap(), None);
    }

    #[tokio::test]
    async fn test_reject_derived_lists() {
        let source =
            ExploreApiSource::new("http://localhost", None, 8453, Duration::from_secs(1)).unwrap();
        let result = source.list_coins(CoinList::TopLosers, 10, None).await;
        assert!(matches!(result, Err(ProviderError::Unsupported { .. })));
    }
}
