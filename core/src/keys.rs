//! Public key endpoints.
//!
//! Each operation comes as a `build_*` / `parse_*` pair for callers that run
//! their own I/O, plus a method that drives the pair through a transport.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::client::{KeysClient, Reply};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Response};
use crate::transport::Transport;
use crate::types::KeyRecord;

/// Everything but RFC 3986 unreserved characters is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path of the key list for `user`, or for the authenticated user when
/// `user` is empty.
///
/// `user` always stays one path segment: reserved characters are
/// percent-encoded and the dot segments `.` and `..` are rejected.
pub fn keys_path(user: &str) -> Result<String> {
    match user {
        "" => Ok("user/keys".to_string()),
        "." | ".." => Err(Error::PathSegment(user.to_string())),
        _ => Ok(format!("users/{}/keys", utf8_percent_encode(user, SEGMENT))),
    }
}

pub fn key_path(id: i64) -> String {
    format!("user/keys/{id}")
}

impl KeysClient {
    pub fn build_list_keys(&self, user: &str) -> Result<HttpRequest> {
        self.new_request::<()>(HttpMethod::Get, &keys_path(user)?, None)
    }

    pub fn build_get_key(&self, id: i64) -> Result<HttpRequest> {
        self.new_request::<()>(HttpMethod::Get, &key_path(id), None)
    }

    pub fn build_create_key(&self, key: &KeyRecord) -> Result<HttpRequest> {
        self.new_request(HttpMethod::Post, &keys_path("")?, Some(key))
    }

    pub fn build_edit_key(&self, id: i64, key: &KeyRecord) -> Result<HttpRequest> {
        self.new_request(HttpMethod::Patch, &key_path(id), Some(key))
    }

    pub fn build_delete_key(&self, id: i64) -> Result<HttpRequest> {
        self.new_request::<()>(HttpMethod::Delete, &key_path(id), None)
    }

    pub fn parse_list_keys(&self, response: HttpResponse) -> Result<Reply<Vec<KeyRecord>>> {
        self.parse_response(response)
    }

    pub fn parse_get_key(&self, response: HttpResponse) -> Result<Reply<KeyRecord>> {
        self.parse_response(response)
    }

    pub fn parse_create_key(&self, response: HttpResponse) -> Result<Reply<KeyRecord>> {
        self.parse_response(response)
    }

    pub fn parse_edit_key(&self, response: HttpResponse) -> Result<Reply<KeyRecord>> {
        self.parse_response(response)
    }

    /// Only the status is checked; the body is never decoded.
    pub fn parse_delete_key(&self, response: HttpResponse) -> Result<Response> {
        self.check_response(&response)
    }

    /// List the public keys of `user`; an empty `user` lists the keys of the
    /// authenticated caller.
    pub fn list_keys<R>(&self, transport: &R, user: &str) -> Result<Reply<Vec<KeyRecord>>>
    where
        R: Transport + ?Sized,
    {
        self.send(transport, self.build_list_keys(user)?)
    }

    pub fn get_key<R>(&self, transport: &R, id: i64) -> Result<Reply<KeyRecord>>
    where
        R: Transport + ?Sized,
    {
        self.send(transport, self.build_get_key(id)?)
    }

    /// Add a key for the authenticated user. Not safe to retry blindly: a
    /// repeated call may register the key twice or fail as a duplicate.
    pub fn create_key<R>(&self, transport: &R, key: &KeyRecord) -> Result<Reply<KeyRecord>>
    where
        R: Transport + ?Sized,
    {
        self.send(transport, self.build_create_key(key)?)
    }

    pub fn edit_key<R>(&self, transport: &R, id: i64, key: &KeyRecord) -> Result<Reply<KeyRecord>>
    where
        R: Transport + ?Sized,
    {
        self.send(transport, self.build_edit_key(id, key)?)
    }

    pub fn delete_key<R>(&self, transport: &R, id: i64) -> Result<Response>
    where
        R: Transport + ?Sized,
    {
        self.send_discarding(transport, self.build_delete_key(id)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;

    const BASE: &str = "http://localhost:3000";

    fn client() -> KeysClient {
        KeysClient::new(BASE).unwrap()
    }

    /// Replays one canned response and records the request it was given.
    struct Canned {
        response: std::result::Result<HttpResponse, TransportError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                }),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(TransportError::new(message)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    #[test]
    fn list_for_named_user() {
        let req = client().build_list_keys("octocat").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{BASE}/users/octocat/keys"));
        assert!(req.body.is_none());
    }

    #[test]
    fn list_for_authenticated_user() {
        let req = client().build_list_keys("").unwrap();
        assert_eq!(req.url, format!("{BASE}/user/keys"));
        assert!(!req.url.contains("users//keys"));
    }

    #[test]
    fn user_stays_a_single_segment() {
        let c = client();
        let url = |user: &str| c.build_list_keys(user).unwrap().url;
        assert_eq!(url("a?b"), format!("{BASE}/users/a%3Fb/keys"));
        assert_eq!(url("a/b"), format!("{BASE}/users/a%2Fb/keys"));
        assert_eq!(url("a#b c"), format!("{BASE}/users/a%23b%20c/keys"));
        assert_eq!(url("%2e%2e"), format!("{BASE}/users/%252e%252e/keys"));
        assert_eq!(url("dev-user_1.x~"), format!("{BASE}/users/dev-user_1.x~/keys"));
    }

    #[test]
    fn dot_segments_are_rejected() {
        for user in [".", ".."] {
            let err = client().build_list_keys(user).unwrap_err();
            assert!(matches!(err, Error::PathSegment(ref s) if s == user), "{user}");
        }
    }

    #[test]
    fn single_key_paths_and_methods() {
        let c = client();
        let record = KeyRecord::titled("t");
        for id in [0, 1, 42, i64::MAX] {
            let expected = format!("{BASE}/user/keys/{id}");
            let get = c.build_get_key(id).unwrap();
            let edit = c.build_edit_key(id, &record).unwrap();
            let delete = c.build_delete_key(id).unwrap();
            assert_eq!((get.method, get.url.as_str()), (HttpMethod::Get, expected.as_str()));
            assert_eq!((edit.method, edit.url.as_str()), (HttpMethod::Patch, expected.as_str()));
            assert_eq!((delete.method, delete.url.as_str()), (HttpMethod::Delete, expected.as_str()));
            assert!(get.body.is_none());
            assert!(delete.body.is_none());
        }
    }

    #[test]
    fn create_body_has_only_present_fields() {
        let record = KeyRecord::new("ssh-rsa AAA", "laptop");
        let req = client().build_create_key(&record).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, format!("{BASE}/user/keys"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"key": "ssh-rsa AAA", "title": "laptop"}));
        let decoded: KeyRecord = serde_json::from_value(body).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn list_keys_decodes_in_order() {
        let transport = Canned::new(200, r#"[{"id":2,"key":"b"},{"id":1,"key":"a"}]"#);
        let reply = client().list_keys(&transport, "").unwrap();
        let ids: Vec<_> = reply.value.iter().map(|k| k.id).collect();
        assert_eq!(ids, vec![Some(2), Some(1)]);
        assert_eq!(transport.last().url, format!("{BASE}/user/keys"));
    }

    #[test]
    fn create_key_returns_server_record() {
        let transport = Canned::new(
            201,
            r#"{"id":9,"key":"ssh-rsa AAA","url":"http://localhost:3000/user/keys/9","title":"laptop"}"#,
        );
        let reply = client()
            .create_key(&transport, &KeyRecord::new("ssh-rsa AAA", "laptop"))
            .unwrap();
        assert_eq!(reply.value.id, Some(9));
        assert_eq!(reply.value.url.as_deref(), Some("http://localhost:3000/user/keys/9"));
        assert_eq!(reply.response.status, 201);
        assert_eq!(transport.last().method, HttpMethod::Post);
    }

    #[test]
    fn edit_key_sends_patch() {
        let transport = Canned::new(200, r#"{"id":3,"title":"renamed"}"#);
        let reply = client().edit_key(&transport, 3, &KeyRecord::titled("renamed")).unwrap();
        assert_eq!(reply.value.title.as_deref(), Some("renamed"));
        let sent = transport.last();
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.body.as_deref(), Some(r#"{"title":"renamed"}"#));
    }

    #[test]
    fn delete_ignores_response_body() {
        let transport = Canned::new(200, "this is not json");
        let response = client().delete_key(&transport, 42).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(transport.last().url, format!("{BASE}/user/keys/42"));
    }

    #[test]
    fn not_found_is_api_error() {
        let transport = Canned::new(404, r#"{"message":"Not Found"}"#);
        let err = client().get_key(&transport, 5).unwrap_err();
        match &err {
            Error::Api { response, detail } => {
                assert_eq!(response.status, 404);
                assert_eq!(detail.message, "Not Found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn delete_not_found_is_api_error() {
        let transport = Canned::new(404, r#"{"message":"Not Found"}"#);
        let err = client().delete_key(&transport, 5).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = Canned::failing("connection reset");
        let err = client().list_keys(&transport, "octocat").unwrap_err();
        assert!(matches!(err, Error::Transport(ref e) if e.message == "connection reset"));
        assert!(err.response().is_none());
    }

    #[test]
    fn works_through_trait_object() {
        let transport: Box<dyn Transport> = Box::new(Canned::new(200, "[]"));
        let reply = client().list_keys(transport.as_ref(), "").unwrap();
        assert!(reply.value.is_empty());
    }
}
