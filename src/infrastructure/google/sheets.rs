use super::token::TokenProvider;
use super::{describe_failure, SheetsApi};
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

const VALUE_INPUT_OPTION: &str = "RAW";

#[derive(Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Serialize)]
struct ValueRangeBody<'a> {
    range: &'a str,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// `{base}/spreadsheets/{id}/values/{range}{suffix}` with the range percent-encoded.
fn values_url(base_url: &str, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/spreadsheets/{}/values", base_url, spreadsheet_id))
        .map_err(|e| AppError::SheetsError(format!("Invalid Sheets URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| AppError::SheetsError("Sheets base URL cannot hold a path".to_string()))?
        .push(&format!("{}{}", range, suffix));

    Ok(url)
}

/// Google Sheets v4 `spreadsheets.values` client bound to one spreadsheet.
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: String,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
        spreadsheet_id: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
        }
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        values_url(&self.base_url, &self.spreadsheet_id, range, suffix)
    }

    fn cell_to_string(cell: serde_json::Value) -> String {
        match cell {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::SheetsError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SheetsError(describe_failure(response).await));
        }

        let body: ValueRangeResponse = response
            .json()
            .await
            .map_err(|e| AppError::SheetsError(format!("Failed to parse JSON: {}", e)))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(Self::cell_to_string).collect())
            .collect())
    }

    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<()> {
        let mut url = self.values_url(range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        let token = self.tokens.access_token().await?;

        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values: vec![row],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SheetsError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SheetsError(describe_failure(response).await));
        }
        Ok(())
    }

    async fn update_values(&self, range: &str, row: Vec<String>) -> Result<()> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", VALUE_INPUT_OPTION);
        let token = self.tokens.access_token().await?;

        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values: vec![row],
        };

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::SheetsError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SheetsError(describe_failure(response).await));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://sheets.googleapis.com/v4";

    #[test]
    fn test_values_url_keeps_a1_notation() {
        let url = values_url(BASE, "sheet-1", "Compliance!C7:E7", "").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/Compliance!C7:E7"
        );
    }

    #[test]
    fn test_values_url_append_suffix_and_escaping() {
        let url = values_url(BASE, "sheet-1", "My Tab!A:D", ":append").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/My%20Tab!A:D:append"
        );
    }

    #[test]
    fn test_values_url_rejects_garbage_base() {
        assert!(values_url("not a url", "id", "A:B", "").is_err());
    }

    #[test]
    fn test_cell_to_string_flattens_json_scalars() {
        assert_eq!(GoogleSheetsClient::cell_to_string(serde_json::json!("x")), "x");
        assert_eq!(GoogleSheetsClient::cell_to_string(serde_json::json!(42)), "42");
        assert_eq!(GoogleSheetsClient::cell_to_string(serde_json::json!(true)), "true");
        assert_eq!(GoogleSheetsClient::cell_to_string(serde_json::Value::Null), "");
    }

    #[test]
    fn test_value_range_response_defaults_to_empty() {
        let parsed: ValueRangeResponse =
            serde_json::from_str(r#"{"range": "Compliance!A1:E1", "majorDimension": "ROWS"}"#)
                .unwrap();
        assert!(parsed.values.is_empty());
    }
}
