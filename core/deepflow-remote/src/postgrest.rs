use async_trait::async_trait;
use deepflow_core::{FocusError, RemoteStore, Result, UserIdentity};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

const REST_PREFIX: &str = "rest/v1";
const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=minimal";

/// Remote store speaking the PostgREST dialect.
///
/// Requests carry the project api key in `apikey`. The bearer token is the
/// signed-in user's access token when one is available, otherwise the api key
/// itself; row-level security on the server is what actually scopes rows, the
/// `user_id` filters here only mirror it.
///
/// Calls are single attempts with no client-side timeout.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base: Url,
    api_key: String,
    access_token: Option<String>,
}

impl PostgrestStore {
    pub fn new(url: &str, api_key: impl Into<String>) -> Result<Self> {
        let base = parse_base(url)?;
        Ok(Self {
            client: Client::new(),
            base,
            api_key: api_key.into(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token.filter(|t| !t.is_empty());
        self
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(REST_PREFIX.split('/')).push(table);
        }
        url
    }

    fn select_url(&self, table: &str, user: &UserIdentity, order_by: &str) -> Url {
        let mut url = self.table_url(table);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &format!("eq.{}", user.id))
            .append_pair("order", &format!("{}.desc", order_by));
        url
    }

    fn delete_url(&self, table: &str, user: &UserIdentity, id: &str) -> Url {
        let mut url = self.table_url(table);
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", id))
            .append_pair("user_id", &format!("eq.{}", user.id));
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    fn select_request(&self, table: &str, user: &UserIdentity, order_by: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.select_url(table, user, order_by)))
    }

    fn write_request(&self, table: &str, rows: &[Value], prefer: &str) -> RequestBuilder {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", prefer)
            .json(rows);
        self.authorize(request)
    }

    fn delete_request(&self, table: &str, user: &UserIdentity, id: &str) -> RequestBuilder {
        self.authorize(self.client.delete(self.delete_url(table, user, id)))
    }

    async fn send(&self, operation: String, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| FocusError::remote(operation.clone(), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(operation = %operation, status = status.as_u16(), "Remote call ok");
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(operation = %operation, status = status.as_u16(), body = %body, "Remote call rejected");
        Err(FocusError::RemoteStatus {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn write(&self, operation: String, table: &str, rows: Vec<Value>, prefer: &str) -> Result<()> {
        let request = self.write_request(table, &rows, prefer);
        self.send(operation, request).await.map(|_| ())
    }
}

fn parse_base(url: &str) -> Result<Url> {
    let base = Url::parse(url.trim())
        .map_err(|e| FocusError::remote("client setup", format!("invalid url {:?}: {}", url, e)))?;
    if base.cannot_be_a_base() {
        return Err(FocusError::remote(
            "client setup",
            format!("url {:?} cannot be a base", url),
        ));
    }
    Ok(base)
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn select(&self, table: &str, user: &UserIdentity, order_by: &str) -> Result<Vec<Value>> {
        let operation = format!("select {}", table);
        let request = self.select_request(table, user, order_by);
        let response = self.send(operation.clone(), request).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| FocusError::remote(operation, format!("decoding rows: {}", e)))
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.write(format!("insert {}", table), table, rows, PREFER_MINIMAL)
            .await
    }

    async fn upsert(&self, table: &str, rows: Vec<Value>) -> Result<()> {
        self.write(format!("upsert {}", table), table, rows, PREFER_MERGE)
            .await
    }

    async fn delete(&self, table: &str, user: &UserIdentity, id: &str) -> Result<()> {
        let request = self.delete_request(table, user, id);
        self.send(format!("delete {}", table), request)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, Request};
    use serde_json::json;

    fn store(url: &str) -> PostgrestStore {
        PostgrestStore::new(url, "anon-key").unwrap()
    }

    #[test]
    fn test_table_url_joins_rest_prefix() {
        assert_eq!(
            store("https://abc.supabase.co").table_url("sessions").as_str(),
            "https://abc.supabase.co/rest/v1/sessions"
        );
        assert_eq!(
            store("https://abc.supabase.co/").table_url("notes").as_str(),
            "https://abc.supabase.co/rest/v1/notes"
        );
    }

    #[test]
    fn test_select_url_filters_by_owner_and_orders_desc() {
        let url = store("https://abc.supabase.co").select_url(
            "notes",
            &UserIdentity::new("user-1"),
            "updated_at",
        );
        assert_eq!(
            url.query(),
            Some("select=*&user_id=eq.user-1&order=updated_at.desc")
        );
    }

    #[test]
    fn test_delete_url_is_owner_scoped() {
        let url = store("https://abc.supabase.co").delete_url(
            "notes",
            &UserIdentity::new("user-1"),
            "01HNOTE",
        );
        assert_eq!(url.query(), Some("id=eq.01HNOTE&user_id=eq.user-1"));
    }

    #[test]
    fn test_query_values_are_encoded() {
        let url = store("https://abc.supabase.co").select_url(
            "sessions",
            &UserIdentity::new("a&b"),
            "timestamp",
        );
        assert!(url.query().unwrap().contains("user_id=eq.a%26b"));
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn body_json(request: &Request) -> Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_upsert_request_merges_duplicates() {
        let rows = vec![
            json!({"id": "a", "user_id": "u1", "title": "A"}),
            json!({"id": "b", "user_id": "u1", "title": "B"}),
        ];
        let request = store("https://abc.supabase.co")
            .write_request("notes", &rows, PREFER_MERGE)
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), "https://abc.supabase.co/rest/v1/notes");
        assert_eq!(
            header(&request, "prefer"),
            Some("resolution=merge-duplicates,return=minimal")
        );
        assert_eq!(header(&request, "content-type"), Some("application/json"));
        assert_eq!(body_json(&request), Value::Array(rows));
    }

    #[test]
    fn test_insert_request_is_minimal_post() {
        let rows = vec![json!({"id": "s1", "user_id": "u1", "duration": 600})];
        let request = store("https://abc.supabase.co")
            .write_request("sessions", &rows, PREFER_MINIMAL)
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(header(&request, "prefer"), Some("return=minimal"));
        assert_eq!(body_json(&request), json!([{"id": "s1", "user_id": "u1", "duration": 600}]));
    }

    #[test]
    fn test_delete_request_uses_delete_verb() {
        let request = store("https://abc.supabase.co")
            .delete_request("notes", &UserIdentity::new("user-1"), "01HNOTE")
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://abc.supabase.co/rest/v1/notes?id=eq.01HNOTE&user_id=eq.user-1"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_requests_carry_api_key_and_bearer() {
        let anon = store("https://abc.supabase.co")
            .select_request("sessions", &UserIdentity::new("u"), "timestamp")
            .build()
            .unwrap();
        assert_eq!(anon.method(), &Method::GET);
        assert_eq!(header(&anon, "apikey"), Some("anon-key"));
        assert_eq!(header(&anon, "authorization"), Some("Bearer anon-key"));

        let signed_in = store("https://abc.supabase.co")
            .with_access_token(Some("user-jwt".to_string()))
            .write_request("notes", &[], PREFER_MERGE)
            .build()
            .unwrap();
        assert_eq!(header(&signed_in, "apikey"), Some("anon-key"));
        assert_eq!(header(&signed_in, "authorization"), Some("Bearer user-jwt"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(PostgrestStore::new("not a url", "k").is_err());
        assert!(PostgrestStore::new("mailto:someone@example.com", "k").is_err());
    }

    #[test]
    fn test_empty_access_token_is_ignored() {
        let s = store("https://abc.supabase.co").with_access_token(Some(String::new()));
        assert!(s.access_token.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_remote_error() {
        // Nothing listens on the discard port.
        let s = store("http://127.0.0.1:9");
        let err = s
            .select("sessions", &UserIdentity::new("u"), "timestamp")
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(matches!(err, FocusError::Remote { .. }));
    }
}
