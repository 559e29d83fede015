//! services/reader/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `LibraryService` and `ProgressStore` ports from the `core` crate. It
//! talks to the library REST API using `reqwest`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use library_reader_core::domain::{
    Document, ProgressRecord, ProgressUpdate, TranslationUnit, UserProfile,
};
use library_reader_core::ports::{LibraryService, PortError, PortResult, ProgressStore};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReaderError;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the library ports over the REST API.
#[derive(Clone)]
pub struct HttpLibraryAdapter {
    client: Client,
    base_url: Url,
}

impl HttpLibraryAdapter {
    /// Creates a new `HttpLibraryAdapter` rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReaderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ReaderError::Internal(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ReaderError::Internal(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| PortError::Unexpected("API base URL cannot carry a path".to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> PortResult<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        let response = check_status(&url, response)?;
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        serde_json::from_str(&body)
            .map_err(|e| PortError::MalformedResponse(format!("{}: {}", url.path(), e)))
    }
}

/// Maps 404 to `NotFound` and every other non-success status to `Network`.
fn check_status(url: &Url, response: Response) -> PortResult<Response> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(PortError::NotFound(url.path().to_string())),
        status => Err(PortError::Network(format!(
            "HTTP {} from {}",
            status.as_u16(),
            url.path()
        ))),
    }
}

/// Parses RFC 3339, or a naive ISO 8601 timestamp taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct DocumentRecord {
    id: String,
    filename: Option<String>,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    #[serde(rename = "publishedYear")]
    published_year: Option<i32>,
    #[serde(rename = "coverImage")]
    cover_image: Option<String>,
    rating: Option<f64>,
    page_count: Option<u32>,
    pages_processed: Option<u32>,
    status: Option<String>,
    translation_count: Option<usize>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            filename: self.filename.unwrap_or_default(),
            title: self.title,
            author: self.author,
            description: self.description,
            genre: self.genre,
            published_year: self.published_year,
            cover_image: self.cover_image,
            rating: self.rating.map(|r| r.round().clamp(0.0, 5.0) as u8),
            page_count: self.page_count.unwrap_or_default(),
            pages_processed: self.pages_processed.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            translation_count: self.translation_count.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct TranslationRecord {
    id: i64,
    #[serde(default)]
    pages: Vec<u32>,
    #[serde(default)]
    text: String,
    created_at: Option<String>,
    updated_at: Option<String>,
}
impl TranslationRecord {
    fn to_domain(self) -> TranslationUnit {
        TranslationUnit {
            id: self.id,
            pages: self.pages,
            text: self.text,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            updated_at: self.updated_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Deserialize)]
struct TranslationsEnvelope {
    #[serde(default)]
    translations: Option<Vec<TranslationRecord>>,
}

#[derive(Deserialize)]
struct ProgressEntryRecord {
    current_page: Option<i64>,
    last_read: Option<String>,
}

#[derive(Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    avatar: String,
    #[serde(default)]
    reading_progress: Option<HashMap<String, ProgressEntryRecord>>,
}
impl UserRecord {
    fn to_domain(self) -> UserProfile {
        let reading_progress = self
            .reading_progress
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(document_id, entry)| {
                let current_page = usize::try_from(entry.current_page.unwrap_or(0)).ok()?;
                let last_read = entry.last_read.as_deref().and_then(parse_timestamp);
                Some((document_id, ProgressRecord { current_page, last_read }))
            })
            .collect();
        UserProfile {
            id: self.id,
            name: self.name,
            avatar: self.avatar,
            reading_progress,
        }
    }
}

#[derive(Deserialize)]
struct ProgressReadRecord {
    current_page: Option<i64>,
}

#[derive(Serialize)]
struct ProgressWriteBody<'a> {
    document_id: &'a str,
    current_page: usize,
    timestamp: String,
}

//=========================================================================================
// Port Implementations
//=========================================================================================

#[async_trait]
impl LibraryService for HttpLibraryAdapter {
    async fn list_documents(&self) -> PortResult<Vec<Document>> {
        let url = self.endpoint(&["api", "documents"])?;
        let records: Vec<DocumentRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_translations(&self, document_id: &str) -> PortResult<Vec<TranslationUnit>> {
        let url = self.endpoint(&["api", "documents", document_id, "translations"])?;
        let envelope: TranslationsEnvelope = self.get_json(url).await?;
        Ok(envelope
            .translations
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.to_domain())
            .collect())
    }

    async fn list_users(&self) -> PortResult<Vec<UserProfile>> {
        let url = self.endpoint(&["api", "users"])?;
        let records: Vec<UserRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

#[async_trait]
impl ProgressStore for HttpLibraryAdapter {
    async fn fetch_progress(&self, user_id: &str, document_id: &str) -> PortResult<Option<i64>> {
        let url = self.endpoint(&["api", "users", user_id, "progress", document_id])?;
        let record: ProgressReadRecord = self.get_json(url).await?;
        Ok(record.current_page)
    }

    async fn save_progress(&self, update: &ProgressUpdate) -> PortResult<()> {
        let url = self.endpoint(&["api", "users", &update.user_id, "progress"])?;
        let body = ProgressWriteBody {
            document_id: &update.document_id,
            current_page: update.current_page,
            timestamp: update.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        debug!("POST {} current_page={}", url, update.current_page);
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        check_status(&url, response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn adapter(server: &Server) -> HttpLibraryAdapter {
        HttpLibraryAdapter::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn lists_documents_with_missing_and_null_fields() {
        let mut server = Server::new_async().await;
        let body = json!([
            {
                "id": "doc-1",
                "filename": "la_mansion.pdf",
                "title": "La Mansión",
                "author": "Elena",
                "genre": "Horror",
                "publishedYear": 2019,
                "rating": 4.6,
                "page_count": 120,
                "pages_processed": 80,
                "status": "processing",
                "translation_count": 12
            },
            {
                "id": "doc-2",
                "filename": "scan_02.pdf",
                "title": null,
                "page_count": null,
                "pages_processed": null,
                "status": "pending",
                "translation_count": 0
            }
        ]);
        let mock = server
            .mock("GET", "/api/documents")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let docs = adapter(&server).list_documents().await.unwrap();
        mock.assert_async().await;

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title.as_deref(), Some("La Mansión"));
        assert_eq!(docs[0].published_year, Some(2019));
        assert_eq!(docs[0].rating, Some(5));
        assert_eq!(docs[0].translation_count, 12);
        assert_eq!(docs[1].page_count, 0);
        assert_eq!(docs[1].display_title(), "scan 02");
    }

    #[tokio::test]
    async fn translations_keep_sequence_order_and_parse_timestamps() {
        let mut server = Server::new_async().await;
        let body = json!({
            "document_id": "doc-1",
            "filename": "la_mansion.pdf",
            "translations": [
                {"id": 7, "pages": [3, 4], "text": "third and fourth", "created_at": "2024-05-01T10:00:00.250000", "updated_at": "2024-05-02T08:30:00Z"},
                {"id": 2, "pages": [1], "text": "first", "created_at": "yesterday", "updated_at": null}
            ]
        });
        server
            .mock("GET", "/api/documents/doc-1/translations")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let units = adapter(&server).get_translations("doc-1").await.unwrap();
        assert_eq!(units.iter().map(|u| u.id).collect::<Vec<_>>(), vec![7, 2]);
        assert_eq!(units[0].pages, vec![3, 4]);
        assert_eq!(units[0].created_at.map(|t| t.hour()), Some(10));
        assert_eq!(units[0].updated_at.map(|t| t.minute()), Some(30));
        assert!(units[1].created_at.is_none());
        assert!(units[1].updated_at.is_none());
    }

    #[tokio::test]
    async fn missing_translations_field_defaults_to_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/documents/doc-9/translations")
            .with_status(200)
            .with_body(r#"{"document_id": "doc-9"}"#)
            .create_async()
            .await;

        let units = adapter(&server).get_translations("doc-9").await.unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn classifies_failures() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/documents/missing/translations")
            .with_status(404)
            .with_body(r#"{"error": "not found"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/documents/broken/translations")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("GET", "/api/documents/garbled/translations")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let adapter = adapter(&server);
        assert!(matches!(
            adapter.get_translations("missing").await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            adapter.get_translations("broken").await,
            Err(PortError::Network(msg)) if msg.contains("500")
        ));
        assert!(matches!(
            adapter.get_translations("garbled").await,
            Err(PortError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_failure() {
        let adapter = HttpLibraryAdapter::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert!(matches!(adapter.list_documents().await, Err(PortError::Network(_))));
    }

    #[tokio::test]
    async fn lists_users_with_progress_maps() {
        let mut server = Server::new_async().await;
        let body = json!([
            {
                "id": "user_1",
                "name": "Ana",
                "avatar": "🦉",
                "reading_progress": {
                    "doc-1": {"current_page": 4, "last_read": "2024-06-01T12:00:00.000Z"},
                    "doc-2": {"current_page": -1, "last_read": ""}
                }
            },
            {"id": "user_2", "name": "Luis", "avatar": "🐺"}
        ]);
        server
            .mock("GET", "/api/users")
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let users = adapter(&server).list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        let ana = &users[0];
        assert_eq!(ana.progress_for("doc-1").map(|p| p.current_page), Some(4));
        assert!(ana.progress_for("doc-1").unwrap().last_read.is_some());
        assert!(ana.progress_for("doc-2").is_none());
        assert!(users[1].reading_progress.is_empty());
    }

    #[tokio::test]
    async fn fetches_raw_progress() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/users/user_1/progress/doc-1")
            .with_status(200)
            .with_body(r#"{"current_page": 3, "last_read": "2024-06-01T12:00:00Z"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/users/user_1/progress/doc-2")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        server
            .mock("GET", "/api/users/ghost/progress/doc-1")
            .with_status(404)
            .create_async()
            .await;

        let adapter = adapter(&server);
        assert_eq!(adapter.fetch_progress("user_1", "doc-1").await.unwrap(), Some(3));
        assert_eq!(adapter.fetch_progress("user_1", "doc-2").await.unwrap(), None);
        assert!(matches!(
            adapter.fetch_progress("ghost", "doc-1").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn saves_progress_with_client_timestamp() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/users/user_1/progress")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "document_id": "doc-1",
                "current_page": 6,
                "timestamp": "2024-06-01T12:00:00.000Z"
            })))
            .with_status(200)
            .with_body(r#"{"status": "ok"}"#)
            .create_async()
            .await;

        let update = ProgressUpdate {
            user_id: "user_1".to_string(),
            document_id: "doc-1".to_string(),
            current_page: 6,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        };
        adapter(&server).save_progress(&update).await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let adapter =
            HttpLibraryAdapter::new("http://library.local/reader/", Duration::from_secs(1)).unwrap();
        let url = adapter.endpoint(&["api", "documents", "a b", "translations"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://library.local/reader/api/documents/a%20b/translations"
        );
    }
}
