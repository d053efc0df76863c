// src/client/api.rs

use std::fmt;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{
    session::{AuthState, SessionHub},
    votes::VoteSink,
};
use crate::{
    admin::{dashboard::DashboardStats, post_list::PostSource},
    comments::ThreadView,
    models::{
        category::{Category, CategoryPosts, CreateCategoryRequest},
        comment::{Comment, VoteCounts, VoteKind},
        post::{Post, PostInput, PostPage, PostWriteResponse},
        user::{LoginResponse, RedirectResult, SessionUser, SignedIn},
    },
};

#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response, or its body was unreadable.
    Transport(reqwest::Error),
    /// The server answered with a non-success status.
    Api { status: u16, message: String },
    /// The call needs a session and there is none.
    NotSignedIn,
    /// The base URL given at construction cannot carry an API path.
    BadBaseUrl(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "transport error: {e}"),
            ClientError::Api { status, message } => write!(f, "api error {status}: {message}"),
            ClientError::NotSignedIn => write!(f, "not signed in"),
            ClientError::BadBaseUrl(url) => write!(f, "bad base url: {url}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err)
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a sign-in call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Popup flow: the session is live.
    SignedIn(SessionUser),
    /// Redirect flow: pass the code to [`ApiClient::complete_redirect`] on the
    /// next start.
    Redirect(String),
}

/// One client per reader. Clones share the HTTP pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHub,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// A client announcing itself with `user_agent`, which decides the
    /// sign-in mode.
    pub fn with_user_agent(
        base_url: impl Into<String>,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_http(http, base_url))
    }

    fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: SessionHub::new(),
        }
    }

    pub fn session(&self) -> &SessionHub {
        &self.session
    }

    // ==========================================
    // Identity
    // ==========================================

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionUser, ClientError> {
        let body = json!({ "email": email, "password": password, "display_name": display_name });
        let request = self.request(Method::POST, &["auth", "register"])?;
        read(request.json(&body)).await
    }

    /// Signs in. A failed attempt leaves the previous session as it was.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, ClientError> {
        let request = self.request(Method::POST, &["auth", "login"])?;
        let before = self.session.current();
        self.session.begin_loading();

        let body = json!({ "email": email, "password": password });
        let response = match read::<LoginResponse>(request.json(&body)).await {
            Ok(response) => response,
            Err(e) => {
                self.restore(before);
                return Err(e);
            }
        };

        match response {
            LoginResponse::Popup { token, user } => {
                let session = SignedIn {
                    token,
                    user: user.clone(),
                };
                self.establish(session).await;
                Ok(SignInOutcome::SignedIn(user))
            }
            LoginResponse::Redirect { redirect_code } => {
                self.session.settle();
                Ok(SignInOutcome::Redirect(redirect_code))
            }
        }
    }

    /// The startup check: completes a pending redirect sign-in, if any.
    /// Always ends the loading phase.
    pub async fn complete_redirect(
        &self,
        code: Option<&str>,
    ) -> Result<Option<SessionUser>, ClientError> {
        let Some(code) = code else {
            self.session.settle();
            return Ok(None);
        };

        let request = match self.request(Method::GET, &["auth", "redirect-result"]) {
            Ok(request) => request.query(&[("code", code)]),
            Err(e) => {
                self.session.settle();
                return Err(e);
            }
        };
        self.session.begin_loading();

        match read::<RedirectResult>(request).await {
            Ok(RedirectResult {
                token: Some(token),
                user: Some(user),
            }) => {
                let session = SignedIn {
                    token,
                    user: user.clone(),
                };
                self.establish(session).await;
                Ok(Some(user))
            }
            Ok(_) => {
                self.session.settle();
                Ok(None)
            }
            Err(e) => {
                self.session.settle();
                Err(e)
            }
        }
    }

    /// Sessions are stateless bearer tokens; dropping the token is enough.
    pub fn sign_out(&self) {
        self.session.signed_out();
    }

    pub async fn me(&self) -> Result<SessionUser, ClientError> {
        read(self.authed(Method::GET, &["auth", "me"])?).await
    }

    pub async fn admin_status(&self) -> Result<bool, ClientError> {
        let request = self.authed(Method::GET, &["auth", "admin-status"])?;
        let body: Value = read(request).await?;
        Ok(body["isAdmin"].as_bool().unwrap_or(false))
    }

    // ==========================================
    // Reading
    // ==========================================

    pub async fn posts(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PostPage, ClientError> {
        let request = self.request(Method::GET, &["posts"])?;
        read(paged(request, cursor, page_size)).await
    }

    pub async fn post(&self, id: &str) -> Result<Post, ClientError> {
        read(self.request(Method::GET, &["posts", id])?).await
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Post, ClientError> {
        read(self.request(Method::GET, &["posts", "by-slug", slug])?).await
    }

    pub async fn comments(&self, post_id: &str) -> Result<Vec<Comment>, ClientError> {
        read(self.request(Method::GET, &["posts", post_id, "comments"])?).await
    }

    /// The thread after `pages` "load more comments" clicks and one "load
    /// more replies" click per entry of `expand`.
    pub async fn thread(
        &self,
        post_id: &str,
        pages: usize,
        expand: &[&str],
    ) -> Result<ThreadView, ClientError> {
        let query = [("pages", pages.to_string()), ("expand", expand.join(","))];
        let request = self.request(Method::GET, &["posts", post_id, "thread"])?;
        read(request.query(&query)).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        read(self.request(Method::GET, &["categories"])?).await
    }

    pub async fn category_posts(
        &self,
        name: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<CategoryPosts, ClientError> {
        let request = self.request(Method::GET, &["categories", name, "posts"])?;
        read(paged(request, cursor, page_size)).await
    }

    // ==========================================
    // Commenting
    // ==========================================

    pub async fn create_comment(
        &self,
        post_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, ClientError> {
        let body = json!({ "content": content, "parentId": parent_id });
        let request = self.authed(Method::POST, &["posts", post_id, "comments"])?;
        read(request.json(&body)).await
    }

    pub async fn vote(&self, comment_id: &str, kind: VoteKind) -> Result<VoteCounts, ClientError> {
        let path = ["comments", comment_id, "vote"];
        let request = self.request(Method::POST, &path)?;
        read(request.json(&json!({ "kind": kind }))).await
    }

    // ==========================================
    // Administration
    // ==========================================

    pub async fn admin_posts(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PostPage, ClientError> {
        let request = self.authed(Method::GET, &["admin", "posts"])?;
        read(paged(request, cursor, page_size)).await
    }

    pub async fn admin_post(&self, id: &str) -> Result<Post, ClientError> {
        read(self.authed(Method::GET, &["admin", "posts", id])?).await
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<PostWriteResponse, ClientError> {
        read(self.authed(Method::POST, &["admin", "posts"])?.json(input)).await
    }

    pub async fn update_post(
        &self,
        id: &str,
        input: &PostInput,
    ) -> Result<PostWriteResponse, ClientError> {
        let request = self.authed(Method::PUT, &["admin", "posts", id])?;
        read(request.json(input)).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<PostWriteResponse, ClientError> {
        read(self.authed(Method::DELETE, &["admin", "posts", id])?).await
    }

    pub async fn dashboard(&self) -> Result<DashboardStats, ClientError> {
        read(self.authed(Method::GET, &["admin", "dashboard"])?).await
    }

    pub async fn create_category(
        &self,
        req: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        let request = self.authed(Method::POST, &["admin", "categories"])?;
        read(request.json(req)).await
    }

    pub async fn reconcile_categories(&self) -> Result<Vec<Category>, ClientError> {
        let path = ["admin", "categories", "reconcile"];
        read(self.authed(Method::POST, &path)?).await
    }

    // ==========================================
    // Helpers
    // ==========================================

    /// `{base}/api/{segments...}`, each segment percent-encoded on its own,
    /// so names such as `C#` or `a/b` stay one path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let bad_base = || ClientError::BadBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| bad_base())?;
        url.path_segments_mut()
            .map_err(|_| bad_base())?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    /// Like `request`, carrying the session token.
    fn authed(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotSignedIn)?;
        Ok(self.request(method, segments)?.bearer_auth(token))
    }

    /// Publishes a fresh session. A failed admin lookup counts as "not admin".
    async fn establish(&self, signed_in: SignedIn) {
        let lookup = match self.request(Method::GET, &["auth", "admin-status"]) {
            Ok(request) => read::<Value>(request.bearer_auth(&signed_in.token)).await,
            Err(e) => Err(e),
        };
        let is_admin = match lookup {
            Ok(body) => body["isAdmin"].as_bool().unwrap_or(false),
            Err(e) => {
                tracing::warn!("Admin status lookup failed: {}", e);
                false
            }
        };
        self.session.signed_in(signed_in, is_admin);
    }

    fn restore(&self, before: AuthState) {
        let token = before.token().map(str::to_string);
        match (before.user, token) {
            (Some(user), Some(token)) => {
                let is_admin = before.is_admin;
                self.session.signed_in(SignedIn { token, user }, is_admin);
            }
            _ => self.session.signed_out(),
        }
    }
}

fn paged(request: RequestBuilder, cursor: Option<&str>, page_size: u32) -> RequestBuilder {
    let request = request.query(&[("page_size", page_size)]);
    match cursor {
        Some(cursor) => request.query(&[("cursor", cursor)]),
        None => request,
    }
}

/// Sends the request and decodes a success body, or turns the error body
/// (`{"error": msg}`, possibly empty) into `ClientError::Api`.
async fn read<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(api_error(response).await)
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| reason(status));
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

fn reason(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown error");
    reason.to_string()
}

#[async_trait]
impl PostSource for ApiClient {
    type Error = ClientError;

    async fn fetch_page(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PostPage, ClientError> {
        self.admin_posts(cursor, page_size).await
    }
}

#[async_trait]
impl VoteSink for ApiClient {
    type Error = ClientError;

    async fn send_vote(&self, comment_id: &str, kind: VoteKind) -> Result<VoteCounts, ClientError> {
        self.vote(comment_id, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authed_calls_need_a_session() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.me().await.unwrap_err();
        assert!(matches!(err, ClientError::NotSignedIn));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn path_segments_are_encoded_one_by_one() {
        let client = ApiClient::new("http://127.0.0.1:9/");
        let url = client.url(&["categories", "C#", "posts"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/api/categories/C%23/posts");

        let url = client.url(&["categories", "Q&A? a/b", "posts"]).unwrap();
        assert_eq!(url.path(), "/api/categories/Q&A%3F%20a%2Fb/posts");
    }

    #[test]
    fn base_path_is_kept() {
        let client = ApiClient::new("http://127.0.0.1:9/blog/");
        let url = client.url(&["posts", "abc"]).unwrap();
        assert_eq!(url.path(), "/blog/api/posts/abc");
    }

    #[tokio::test]
    async fn unusable_base_url_is_reported() {
        let client = ApiClient::new("not a url");
        let err = client.post("abc").await.unwrap_err();
        assert!(matches!(err, ClientError::BadBaseUrl(_)));
    }

    #[tokio::test]
    async fn startup_without_code_ends_loading() {
        let client = ApiClient::new("http://127.0.0.1:9/");
        assert!(client.session().current().loading);

        assert_eq!(client.complete_redirect(None).await.unwrap(), None);
        let state = client.session().current();
        assert!(!state.loading);
        assert!(!state.is_signed_in());
    }
}
