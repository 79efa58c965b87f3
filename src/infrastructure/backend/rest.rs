// src/infrastructure/backend/rest.rs
use super::BackendClient;
use crate::application::{NoteRepository, ProfileRepository};
use crate::domain::{DomainError, NewNote, Note, NoteChanges, Profile, ProfileChanges};
use reqwest::blocking::RequestBuilder;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const REST_PREFIX: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT_MERGE: &str = "resolution=merge-duplicates,return=representation";
const PROFILE_COLUMNS: &str = "display_name,avatar_url,phone";

pub(crate) fn eq_filter(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

pub(crate) fn in_filter(ids: &[i64]) -> String {
    let list: Vec<String> = ids.iter().map(i64::to_string).collect();
    format!("in.({})", list.join(","))
}

fn table_path(table: &str) -> String {
    format!("{}/{}", REST_PREFIX, table)
}

/// Notes table accessed through PostgREST.
#[derive(Debug, Clone)]
pub struct RestNoteRepository {
    client: BackendClient,
    path: String,
}

impl RestNoteRepository {
    pub fn new(client: BackendClient, table: &str) -> Self {
        Self {
            client,
            path: table_path(table),
        }
    }

    fn list_request(&self) -> RequestBuilder {
        self.client
            .request(Method::GET, &self.path)
            .query(&[("select", "*"), ("order", "id.asc")])
    }

    fn insert_request(&self, note: &NewNote) -> RequestBuilder {
        self.client
            .request(Method::POST, &self.path)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(note)
    }

    fn update_request(&self, id: i64, changes: &NoteChanges) -> RequestBuilder {
        self.client
            .request(Method::PATCH, &self.path)
            .query(&[("id", eq_filter(id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes)
    }

    fn delete_request(&self, ids: &[i64]) -> RequestBuilder {
        self.client
            .request(Method::DELETE, &self.path)
            .query(&[("id", in_filter(ids)), ("select", "id".to_string())])
            .header("Prefer", RETURN_REPRESENTATION)
    }
}

#[derive(Deserialize)]
struct IdRow {
    id: i64,
}

impl NoteRepository for RestNoteRepository {
    #[instrument(level = "debug", skip(self))]
    fn list_notes(&mut self) -> Result<Vec<Note>, DomainError> {
        let request = self.list_request();
        self.client.send_json(request)
    }

    #[instrument(level = "debug", skip(self))]
    fn insert_note(&mut self, note: &NewNote) -> Result<Note, DomainError> {
        let request = self.insert_request(note);
        let rows: Vec<Note> = self.client.send_json(request)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DomainError::Backend("insert returned no row".to_string()))
    }

    #[instrument(level = "debug", skip(self))]
    fn update_note(&mut self, id: i64, changes: &NoteChanges) -> Result<Note, DomainError> {
        let request = self.update_request(id, changes);
        let rows: Vec<Note> = self.client.send_json(request)?;
        // Zero matched rows is how PostgREST reports a missing id
        rows.into_iter().next().ok_or(DomainError::NoteNotFound(id))
    }

    #[instrument(level = "debug", skip(self))]
    fn delete_notes(&mut self, ids: &[i64]) -> Result<Vec<i64>, DomainError> {
        let request = self.delete_request(ids);
        let rows: Vec<IdRow> = self.client.send_json(request)?;
        debug!(deleted = rows.len(), "Delete acknowledged");
        Ok(rows.into_iter().map(|row| row.id).collect())
    }
}

/// Profiles table, one row per auth user.
#[derive(Debug, Clone)]
pub struct RestProfileRepository {
    client: BackendClient,
    path: String,
}

impl RestProfileRepository {
    pub fn new(client: BackendClient, table: &str) -> Self {
        Self {
            client,
            path: table_path(table),
        }
    }

    fn upsert_request(&self, user_id: &str, changes: &ProfileChanges) -> RequestBuilder {
        self.client
            .request(Method::POST, &self.path)
            .query(&[("on_conflict", "id")])
            .header("Prefer", UPSERT_MERGE)
            .json(&ProfileRow {
                id: user_id,
                changes,
            })
    }
}

#[derive(Serialize)]
struct ProfileRow<'a> {
    id: &'a str,
    #[serde(flatten)]
    changes: &'a ProfileChanges,
}

impl ProfileRepository for RestProfileRepository {
    #[instrument(level = "debug", skip(self))]
    fn get_profile(&mut self, user_id: &str) -> Result<Option<Profile>, DomainError> {
        let request = self
            .client
            .request(Method::GET, &self.path)
            .query(&[("id", eq_filter(user_id)), ("select", PROFILE_COLUMNS.to_string())]);
        let rows: Vec<Profile> = self.client.send_json(request)?;
        Ok(rows.into_iter().next())
    }

    #[instrument(level = "debug", skip(self))]
    fn upsert_profile(
        &mut self,
        user_id: &str,
        changes: &ProfileChanges,
    ) -> Result<Profile, DomainError> {
        let request = self.upsert_request(user_id, changes);
        let rows: Vec<Profile> = self.client.send_json(request)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DomainError::Backend("upsert returned no row".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::BackendConfig;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: "https://abc.example.co".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn given_ids_when_building_in_filter_then_parenthesized_list() {
        assert_eq!(in_filter(&[3, 1, 2]), "in.(3,1,2)");
        assert_eq!(in_filter(&[7]), "in.(7)");
    }

    #[test]
    fn given_value_when_building_eq_filter_then_prefixed() {
        assert_eq!(eq_filter(42), "eq.42");
        assert_eq!(eq_filter("abc-123"), "eq.abc-123");
    }

    #[test]
    fn given_table_when_creating_repository_then_rest_path() {
        let repo = RestNoteRepository::new(client(), "todos");
        assert_eq!(repo.path, "rest/v1/todos");
    }

    #[test]
    fn given_backend_rows_when_deserializing_then_nullable_image_handled() {
        let body = r#"[
            {"id": 1, "text": "milk", "done": false, "timestamp": 1700000000000, "image": null},
            {"id": 2, "text": "", "done": true, "timestamp": 1700000000001,
             "image": "https://abc.example.co/storage/v1/object/public/product-images/x.png",
             "user_id": "ignored"}
        ]"#;

        let rows: Vec<Note> = serde_json::from_str(body).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].image, None);
        assert!(rows[1].done);
        assert!(rows[1].image.as_deref().unwrap().ends_with("x.png"));
    }

    #[test]
    fn given_profile_changes_when_serializing_row_then_flattened_with_id() {
        let changes = ProfileChanges {
            display_name: Some("Ploy".to_string()),
            ..ProfileChanges::default()
        };
        let json = serde_json::to_value(ProfileRow {
            id: "u1",
            changes: &changes,
        })
        .unwrap();

        assert_eq!(json, serde_json::json!({"id": "u1", "display_name": "Ploy"}));
    }

    #[test]
    fn given_delete_request_when_built_then_uses_in_filter_and_representation() {
        let repo = RestNoteRepository::new(client(), "todos");
        let request = repo.delete_request(&[1, 2]).build().unwrap();

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/todos?id=in.%281%2C2%29&select=id"
        );
        assert_eq!(request.headers()["prefer"], "return=representation");
    }

    #[test]
    fn given_done_change_when_building_update_then_patch_by_id_with_partial_body() {
        let repo = RestNoteRepository::new(client(), "todos");
        let request = repo
            .update_request(5, &NoteChanges::done(true))
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/todos?id=eq.5"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"done":true}"#);
    }

    #[test]
    fn given_note_repository_when_building_list_then_selects_all_ordered_by_id() {
        let repo = RestNoteRepository::new(client(), "todos");
        let request = repo.list_request().build().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/todos?select=*&order=id.asc"
        );
        assert_eq!(request.headers()["apikey"], "anon");
        assert_eq!(request.headers()["authorization"], "Bearer anon");
    }

    #[test]
    fn given_new_note_when_building_insert_then_post_with_representation() {
        // Arrange
        let repo = RestNoteRepository::new(client(), "todos");
        let mut new_note = NewNote::new("milk", None);
        new_note.timestamp = 1_700_000_000_000;

        // Act
        let request = repo.insert_request(&new_note).build().unwrap();

        // Assert
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://abc.example.co/rest/v1/todos");
        assert_eq!(request.headers()["prefer"], "return=representation");
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["text"], "milk");
        assert_eq!(json["done"], false);
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn given_profile_changes_when_building_upsert_then_merges_on_id_conflict() {
        // Arrange
        let repo = RestProfileRepository::new(client(), "profiles");
        let changes = ProfileChanges {
            phone: Some("0812345678".to_string()),
            ..ProfileChanges::default()
        };

        // Act
        let request = repo.upsert_request("u1", &changes).build().unwrap();

        // Assert
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/profiles?on_conflict=id"
        );
        assert_eq!(
            request.headers()["prefer"],
            "resolution=merge-duplicates,return=representation"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"id":"u1","phone":"0812345678"}"#);
    }
}
