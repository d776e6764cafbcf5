//! JSON documents exchanged with the report service

use serde::{Deserialize, Serialize};

/// Body of `POST /user-report/v1/create-report`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub user_email: String,
    /// Names of the files the reporter intends to upload, never their bytes
    pub file_names: Vec<String>,
}

/// A server-issued destination for one attachment upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub file_name: String,
    pub url: String,
    /// Form fields the storage provider expects alongside the file, in the
    /// order the server sent them
    pub fields: Vec<(String, String)>,
}

impl UploadTarget {
    /// Value of the first field called `name`
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Read one `uploadUrls` entry
    ///
    /// `fileName` and `url` must be strings. Field values are taken as text:
    /// numbers and booleans are written out, `null` and nested values
    /// become empty strings.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the entry is unusable.
    pub fn from_json(entry: &serde_json::Value) -> Result<Self, String> {
        let entry = entry
            .as_object()
            .ok_or_else(|| "upload target is not an object".to_string())?;
        let text = |key: &str| {
            entry
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| format!("upload target has no string '{key}'"))
        };
        let file_name = text("fileName")?;
        let url = text("url")?;

        let fields = match entry.get("fields") {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(serde_json::Value::Object(fields)) => fields
                .iter()
                .map(|(name, value)| (name.clone(), field_text(value)))
                .collect(),
            Some(_) => return Err(format!("fields of '{file_name}' are not an object")),
        };

        Ok(Self {
            file_name,
            url,
            fields,
        })
    }
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            String::new()
        }
    }
}

/// Parsed metadata response
///
/// Only `uploadUrls` is interpreted; the full document is kept in `raw` so it
/// can be handed back to the caller untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateReportResponse {
    pub upload_urls: Option<Vec<UploadTarget>>,
    /// `uploadUrls` entries that could not be used, as `(index, reason)`
    pub rejected: Vec<(usize, String)>,
    pub raw: serde_json::Value,
}

impl CreateReportResponse {
    /// Parse a response body
    ///
    /// Bodies that are not JSON objects are treated as an empty object with
    /// no upload targets. Each `uploadUrls` entry is read on its own, so one
    /// malformed entry only loses that target.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let raw = match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value @ serde_json::Value::Object(_)) => value,
            _ => serde_json::Value::Object(serde_json::Map::new()),
        };

        let mut rejected = Vec::new();
        let upload_urls = raw
            .get("uploadUrls")
            .and_then(serde_json::Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| match UploadTarget::from_json(entry) {
                        Ok(target) => Some(target),
                        Err(reason) => {
                            rejected.push((index, reason));
                            None
                        }
                    })
                    .collect()
            });

        Self {
            upload_urls,
            rejected,
            raw,
        }
    }

    /// Upload targets in server order; empty when none were returned
    #[must_use]
    pub fn targets(&self) -> &[UploadTarget] {
        self.upload_urls.as_deref().unwrap_or_default()
    }
}
