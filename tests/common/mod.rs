#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use StudyChatAgent::models::auth_user::AuthSession;
use StudyChatAgent::models::chat_message::ChatMessage;
use StudyChatAgent::services::completion_service::CompletionApi;
use StudyChatAgent::services::docstore_service::{DocStoreApi, Document};
use StudyChatAgent::services::identity_service::{AccountInfo, IdentityApi, TokenBundle};
use StudyChatAgent::services::storage_service::ObjectStoreApi;
use StudyChatAgent::services::{GatewayError, GatewayResult};

pub fn fixed_today() -> String {
    "2024-03-07".to_string()
}

pub fn test_auth_session(uid: &str) -> AuthSession {
    AuthSession {
        uid: uid.to_string(),
        email: format!("{}@example.com", uid),
        display_name: "Student".to_string(),
        email_verified: true,
        id_token: format!("tok-{}", uid),
        refresh_token: "refresh".to_string(),
    }
}

struct StoredDoc {
    fields: Value,
    seq: u64,
}

/// In-memory document store with the same observable behavior as the
/// REST client: server-stamped writes, ordered listing, absent
/// collections reading as empty.
#[derive(Clone)]
pub struct FakeDocStore {
    docs: Arc<Mutex<HashMap<String, StoredDoc>>>,
    seq: Arc<AtomicU64>,
    pub fail_add: Arc<AtomicBool>,
}

impl FakeDocStore {
    pub fn new() -> Self {
        FakeDocStore {
            docs: Arc::new(Mutex::new(HashMap::new())),
            seq: Arc::new(AtomicU64::new(1)),
            fail_add: Arc::new(AtomicBool::new(false)),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    fn stamped(fields: &Value, seq: u64) -> Value {
        let mut stamped = fields.clone();
        if let Some(map) = stamped.as_object_mut() {
            map.insert("timestamp".to_string(), json!(format!("ts-{:08}", seq)));
        }
        stamped
    }
}

#[async_trait]
impl DocStoreApi for FakeDocStore {
    async fn get_document(&self, _id_token: &str, path: &str) -> GatewayResult<Option<Document>> {
        let docs = self.docs.lock().unwrap();
        Ok(docs.get(path).map(|doc| Document {
            id: path.rsplit('/').next().unwrap_or_default().to_string(),
            fields: Self::stamped(&doc.fields, doc.seq),
        }))
    }

    async fn set_document(&self, _id_token: &str, path: &str, fields: Value) -> GatewayResult<()> {
        let seq = self.next_seq();
        let mut docs = self.docs.lock().unwrap();
        docs.insert(path.to_string(), StoredDoc { fields, seq });
        Ok(())
    }

    async fn update_fields(&self, _id_token: &str, path: &str, fields: Value) -> GatewayResult<()> {
        let mut docs = self.docs.lock().unwrap();
        let Some(doc) = docs.get_mut(path) else {
            return Err(GatewayError::Backend {
                status: 404,
                message: "document missing".to_string(),
            });
        };
        if let (Some(existing), Some(patch)) = (doc.fields.as_object_mut(), fields.as_object()) {
            for (key, value) in patch {
                existing.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn add_document(
        &self,
        _id_token: &str,
        collection: &str,
        fields: Value,
    ) -> GatewayResult<String> {
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let seq = self.next_seq();
        let id = format!("m{:08}", seq);
        let mut docs = self.docs.lock().unwrap();
        docs.insert(format!("{}/{}", collection, id), StoredDoc { fields, seq });
        Ok(id)
    }

    async fn list_documents(
        &self,
        _id_token: &str,
        collection: &str,
        order_by_timestamp: bool,
    ) -> GatewayResult<Vec<Document>> {
        let docs = self.docs.lock().unwrap();
        let prefix = format!("{}/", collection);
        let mut matched: Vec<(&String, &StoredDoc)> = docs
            .iter()
            .filter(|(path, _)| {
                path.starts_with(&prefix) && !path[prefix.len()..].contains('/')
            })
            .collect();
        if order_by_timestamp {
            matched.sort_by_key(|(_, doc)| doc.seq);
        } else {
            matched.sort_by_key(|(path, _)| path.to_string());
        }
        Ok(matched
            .into_iter()
            .map(|(path, doc)| Document {
                id: path[prefix.len()..].to_string(),
                fields: Self::stamped(&doc.fields, doc.seq),
            })
            .collect())
    }
}

/// In-memory object store keyed by object name.
#[derive(Clone)]
pub struct FakeObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        FakeObjectStore {
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn url_for(object: &str) -> String {
        format!("https://store.example/o/{}?alt=media&token=t1", object.replace('/', "%2F"))
    }
}

#[async_trait]
impl ObjectStoreApi for FakeObjectStore {
    async fn upload(
        &self,
        _id_token: &str,
        object: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> GatewayResult<String> {
        let mut objects = self.objects.lock().unwrap();
        objects.insert(object.to_string(), bytes);
        Ok(Self::url_for(object))
    }

    async fn list(&self, _id_token: &str, prefix: &str) -> GatewayResult<Vec<String>> {
        let objects = self.objects.lock().unwrap();
        let mut names: Vec<String> = objects
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn download_url(&self, _id_token: &str, object: &str) -> GatewayResult<String> {
        let objects = self.objects.lock().unwrap();
        if objects.contains_key(object) {
            Ok(Self::url_for(object))
        } else {
            Err(GatewayError::Backend {
                status: 404,
                message: "object missing".to_string(),
            })
        }
    }

    async fn delete(&self, _id_token: &str, object: &str) -> GatewayResult<()> {
        let mut objects = self.objects.lock().unwrap();
        if objects.remove(object).is_some() {
            Ok(())
        } else {
            Err(GatewayError::Backend {
                status: 404,
                message: "object missing".to_string(),
            })
        }
    }
}

/// Completion stub: answers every query with a deterministic structured
/// message, or fails when told to.
#[derive(Clone)]
pub struct FakeCompletion {
    pub fail: Arc<AtomicBool>,
}

impl FakeCompletion {
    pub fn new() -> Self {
        FakeCompletion {
            fail: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl CompletionApi for FakeCompletion {
    async fn complete(
        &self,
        query: &str,
        files: &[String],
        _user_id: &str,
    ) -> GatewayResult<ChatMessage> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Backend {
                status: 500,
                message: "completion failed".to_string(),
            });
        }
        let mut points = HashMap::new();
        points.insert(
            "Overview".to_string(),
            vec![format!("{} with {} files", query, files.len())],
        );
        Ok(ChatMessage {
            query: query.to_string(),
            heading1: format!("About {}", query),
            heading2: vec!["Overview".to_string()],
            key_takeaways: "remember this".to_string(),
            points,
            example: vec!["an example".to_string()],
            summary: "a summary".to_string(),
        })
    }
}

struct Account {
    uid: String,
    email: String,
    password: String,
    display_name: String,
    verified: bool,
}

/// In-memory identity backend: accounts by email, live tokens by value.
#[derive(Clone)]
pub struct FakeIdentity {
    accounts: Arc<Mutex<Vec<Account>>>,
    tokens: Arc<Mutex<HashMap<String, String>>>,
    seq: Arc<AtomicU64>,
    pub verification_emails: Arc<AtomicU64>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        FakeIdentity {
            accounts: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(HashMap::new())),
            seq: Arc::new(AtomicU64::new(1)),
            verification_emails: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Seeds an account directly, bypassing signup.
    pub fn register(&self, email: &str, password: &str, name: &str, verified: bool) -> String {
        let uid = format!("u{}", self.seq.fetch_add(1, Ordering::SeqCst));
        self.accounts.lock().unwrap().push(Account {
            uid: uid.clone(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: name.to_string(),
            verified,
        });
        uid
    }

    pub fn mark_verified(&self, email: &str) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(account) = accounts.iter_mut().find(|a| a.email == email) {
            account.verified = true;
        }
    }

    fn issue_token(&self, uid: &str) -> String {
        let token = format!("tok-{}-{}", uid, self.seq.fetch_add(1, Ordering::SeqCst));
        self.tokens.lock().unwrap().insert(token.clone(), uid.to_string());
        token
    }

    fn bundle_for(&self, account: &Account) -> TokenBundle {
        TokenBundle {
            local_id: account.uid.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            id_token: self.issue_token(&account.uid),
            refresh_token: "refresh".to_string(),
        }
    }

    fn uid_for_token(&self, token: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(token).cloned()
    }
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> GatewayResult<TokenBundle> {
        let accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
        else {
            return Err(GatewayError::Validation("INVALID_LOGIN_CREDENTIALS".to_string()));
        };
        Ok(self.bundle_for(account))
    }

    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<TokenBundle> {
        {
            let accounts = self.accounts.lock().unwrap();
            if accounts.iter().any(|a| a.email == email) {
                return Err(GatewayError::Validation("EMAIL_EXISTS".to_string()));
            }
        }
        let uid = self.register(email, password, "", false);
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.iter().find(|a| a.uid == uid).unwrap();
        Ok(self.bundle_for(account))
    }

    async fn send_verification_email(&self, _id_token: &str) -> GatewayResult<()> {
        self.verification_emails.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn lookup(&self, id_token: &str) -> GatewayResult<AccountInfo> {
        let Some(uid) = self.uid_for_token(id_token) else {
            return Err(GatewayError::Validation("INVALID_ID_TOKEN".to_string()));
        };
        let accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.iter().find(|a| a.uid == uid) else {
            return Err(GatewayError::Validation("USER_NOT_FOUND".to_string()));
        };
        Ok(AccountInfo {
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            email_verified: account.verified,
        })
    }

    async fn update_password(
        &self,
        id_token: &str,
        new_password: &str,
    ) -> GatewayResult<TokenBundle> {
        let Some(uid) = self.uid_for_token(id_token) else {
            return Err(GatewayError::Validation("INVALID_ID_TOKEN".to_string()));
        };
        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.iter_mut().find(|a| a.uid == uid) else {
            return Err(GatewayError::Validation("USER_NOT_FOUND".to_string()));
        };
        account.password = new_password.to_string();
        let bundle = self.bundle_for(account);
        Ok(bundle)
    }

    async fn sign_in_with_idp(&self, _provider_token: &str) -> GatewayResult<TokenBundle> {
        let email = "google-user@example.com";
        let uid = {
            let accounts = self.accounts.lock().unwrap();
            accounts.iter().find(|a| a.email == email).map(|a| a.uid.clone())
        };
        let uid = uid.unwrap_or_else(|| self.register(email, "", "Google User", true));
        let accounts = self.accounts.lock().unwrap();
        let account = accounts.iter().find(|a| a.uid == uid).unwrap();
        Ok(self.bundle_for(account))
    }
}
