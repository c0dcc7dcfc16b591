//! The network boundary: one request per grid cell and issuance window
//! against the KMA village forecast service.

use crate::config::CollectorConfig;
use crate::forecast::error::FetchError;
use crate::types::forecast_kind::ForecastKind;
use crate::types::forecast_record::RawRecord;
use crate::types::grid_cell::GridCell;
use crate::types::issuance_window::IssuanceWindow;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

/// Result code of a successful call, carried in `response.header.resultCode`.
const RESULT_OK: &str = "00";

/// Anything that can hand out the raw forecast items for a cell and window.
///
/// The collector only talks to the network through this trait, which keeps
/// orchestration testable without a live service.
#[allow(async_fn_in_trait)]
pub trait ForecastSource {
    async fn fetch(
        &self,
        cell: GridCell,
        window: &IssuanceWindow,
        kind: ForecastKind,
    ) -> Result<Vec<RawRecord>, FetchError>;
}

/// `reqwest`-backed client for `VilageFcstInfoService_2.0`.
pub struct KmaForecastClient {
    client: Client,
    base_url: String,
    service_key: String,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: ResponsePart,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    header: Header,
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    items: Items,
}

#[derive(Debug, Deserialize)]
struct Items {
    item: Vec<RawRecord>,
}

impl KmaForecastClient {
    pub fn new(config: &CollectorConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            page_size: config.page_size,
        })
    }

    fn endpoint(&self, kind: ForecastKind) -> String {
        format!("{}/{}", self.base_url, kind.operation())
    }

    /// Pulls the item array out of a response body, checking the service's own
    /// result code first. The service answers invalid keys with an XML page and
    /// a 200 status, which ends up here as a format error.
    fn parse_items(url: &str, text: &str) -> Result<Vec<RawRecord>, FetchError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| FetchError::ResponseFormat {
                url: url.to_string(),
                reason: format!("{e} (body starts with {:?})", snippet(text)),
            })?;

        let header = envelope.response.header;
        if header.result_code != RESULT_OK {
            return Err(FetchError::Api {
                code: header.result_code,
                message: header.result_msg,
            });
        }

        envelope
            .response
            .body
            .map(|body| body.items.item)
            .ok_or_else(|| FetchError::ResponseFormat {
                url: url.to_string(),
                reason: "result code 00 but no response body".to_string(),
            })
    }
}

impl ForecastSource for KmaForecastClient {
    async fn fetch(
        &self,
        cell: GridCell,
        window: &IssuanceWindow,
        kind: ForecastKind,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = self.endpoint(kind);
        let page_size = self.page_size.to_string();
        let base_date = window.base_date();
        let base_time = window.base_time();
        let nx = cell.x.to_string();
        let ny = cell.y.to_string();
        debug!("Requesting {} for nx={} ny={} at {}", kind, nx, ny, window);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("numOfRows", page_size.as_str()),
                ("pageNo", "1"),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url, e)
                });
            }
        };

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;
        Self::parse_items(&url, &text)
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://example.invalid/getUltraSrtFcst";

    #[test]
    fn parses_item_array_from_normal_response() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"},
            "body":{"dataType":"JSON","items":{"item":[
              {"baseDate":"20240615","baseTime":"1400","category":"SKY","fcstDate":"20240615",
               "fcstTime":"1500","fcstValue":"1","nx":60,"ny":127}
            ]},"pageNo":1,"numOfRows":1000,"totalCount":1}}}"#;

        let items = KmaForecastClient::parse_items(URL, text).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["category"], "SKY");
        assert_eq!(items[0]["nx"], 60);
    }

    #[test]
    fn non_ok_result_code_is_an_api_error() {
        let text = r#"{"response":{"header":{"resultCode":"03","resultMsg":"NO_DATA"}}}"#;

        match KmaForecastClient::parse_items(URL, text) {
            Err(FetchError::Api { code, message }) => {
                assert_eq!(code, "03");
                assert_eq!(message, "NO_DATA");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn xml_error_page_is_a_format_error() {
        let text = "<OpenAPI_ServiceResponse><cmmMsgHeader><errMsg>SERVICE ERROR</errMsg>";

        assert!(matches!(
            KmaForecastClient::parse_items(URL, text),
            Err(FetchError::ResponseFormat { .. })
        ));
    }

    #[test]
    fn ok_code_without_body_is_a_format_error() {
        let text = r#"{"response":{"header":{"resultCode":"00","resultMsg":"NORMAL_SERVICE"}}}"#;

        assert!(matches!(
            KmaForecastClient::parse_items(URL, text),
            Err(FetchError::ResponseFormat { .. })
        ));
    }

    #[test]
    fn endpoint_depends_on_kind() {
        let config = CollectorConfig::builder().service_key("key").build();
        let client = KmaForecastClient::new(&config).unwrap();

        assert!(client
            .endpoint(ForecastKind::UltraShort)
            .ends_with("/VilageFcstInfoService_2.0/getUltraSrtFcst"));
        assert!(client
            .endpoint(ForecastKind::ShortTerm)
            .ends_with("/VilageFcstInfoService_2.0/getVilageFcst"));
    }
}
