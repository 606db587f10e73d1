//! [`RemoteGateway`] over the 123pan web API.

use crate::config::{ClientConfig, Credentials};
use crate::error::{ClientError, http_status, transport};
use crate::wire::{
    CODE_LOGIN_OK, CODE_OK, DownloadInfo, DriveDownloadRequest, Envelope, FileInfo, ListPage,
    LoginData, LoginRequest, ShareDownloadRequest, ShareInfo,
};
use async_trait::async_trait;
use panshare_core::model::LAST_PAGE;
use panshare_core::{Entry, FileNode, GatewayError, RemoteGateway, SharePage, ShareScope};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, trace};
use url::Url;

const SIGN_IN: &str = "/b/api/user/sign_in";
const DRIVE_LIST: &str = "/api/file/list/new";
const SHARE_LIST: &str = "/b/api/share/get";
const MY_SHARES: &str = "/api/share/list";
const DRIVE_DOWNLOAD: &str = "/api/file/download_info";
const SHARE_DOWNLOAD: &str = "/b/api/share/download/info";

/// Cursor of every listing's first page.
const FIRST_CURSOR: &str = "0";

/// Authenticated 123pan API client.
///
/// Password credentials are exchanged for a token on the first call that
/// needs one; concurrent first calls share a single sign-in.
pub struct PanClient {
    http: reqwest::Client,
    base: Url,
    page_size: u32,
    credentials: Credentials,
    token: OnceCell<String>,
}

impl std::fmt::Debug for PanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanClient")
            .field("base", &self.base.as_str())
            .field("page_size", &self.page_size)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl PanClient {
    /// Build a client. No network traffic happens until the first call.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url).map_err(|source| ClientError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let token = match &credentials {
            Credentials::Token(token) => OnceCell::new_with(Some(token.clone())),
            Credentials::Password { .. } => OnceCell::new(),
        };
        Ok(Self {
            http,
            base,
            page_size: config.page_size,
            credentials,
            token,
        })
    }

    /// Make sure a token is available, signing in if needed.
    pub async fn login(&self) -> Result<(), GatewayError> {
        self.token().await.map(|_| ())
    }

    async fn token(&self) -> Result<&str, GatewayError> {
        self.token
            .get_or_try_init(|| async {
                match &self.credentials {
                    Credentials::Token(token) => Ok(token.clone()),
                    Credentials::Password { passport, password } => {
                        self.sign_in(passport, password).await
                    }
                }
            })
            .await
            .map(String::as_str)
    }

    #[instrument(level = "debug", skip(self, password))]
    async fn sign_in(&self, passport: &str, password: &str) -> Result<String, GatewayError> {
        let request = self.http.post(self.endpoint(SIGN_IN)?).json(&LoginRequest {
            passport,
            password,
            remember: true,
        });
        let data: LoginData = self
            .send(with_client_headers(request), &[CODE_OK, CODE_LOGIN_OK])
            .await
            .map_err(|e| match e {
                GatewayError::Status { code, message } => {
                    GatewayError::Auth(format!("sign-in rejected ({code}): {message}"))
                }
                other => other,
            })?;
        info!("signed in");
        Ok(data.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Decode(format!("bad endpoint {path}: {e}")))
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, GatewayError> {
        let token = self.token().await?;
        Ok(with_client_headers(request).bearer_auth(token))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, GatewayError> {
        let request = self.http.get(self.endpoint(path)?).query(query);
        let request = self.authorized(request).await?;
        self.send(request, &[CODE_OK]).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let request = self.http.post(self.endpoint(path)?).json(body);
        let request = self.authorized(request).await?;
        self.send(request, &[CODE_OK]).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        ok: &[i64],
    ) -> Result<T, GatewayError> {
        let response = request.send().await.map_err(|e| transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(http_status(status));
        }
        let envelope: Envelope<T> = response.json().await.map_err(|e| transport(&e))?;
        trace!(code = envelope.code, "response");
        envelope.into_data(ok)
    }

    /// Fetch every page of a directory listing.
    async fn list_all(
        &self,
        path: &str,
        fixed: &[(&str, String)],
    ) -> Result<Vec<Entry>, GatewayError> {
        let mut entries = Vec::new();
        let mut next = FIRST_CURSOR.to_string();
        let mut page: u32 = 1;
        loop {
            let mut query = fixed.to_vec();
            query.push(("limit", self.page_size.to_string()));
            query.push(("next", next.clone()));
            query.push(("Page", page.to_string()));

            let data: ListPage<FileInfo> = self.get(path, &query).await?;
            entries.extend(data.info_list.into_iter().map(Entry::from));
            if is_final_page(&data.next, &next) {
                break;
            }
            next = data.next;
            page += 1;
        }
        debug!(path, count = entries.len(), pages = page, "listing complete");
        Ok(entries)
    }
}

/// Paging ends at the `-1` sentinel or when the remote hands back the cursor
/// it was given. Empty pages in between do not end it.
fn is_final_page(next: &str, cursor: &str) -> bool {
    next == LAST_PAGE || next.is_empty() || next == cursor
}

fn with_client_headers(request: RequestBuilder) -> RequestBuilder {
    request.header("platform", "web").header("app-version", "3")
}

#[async_trait]
impl RemoteGateway for PanClient {
    #[instrument(level = "debug", skip(self))]
    async fn list_drive(&self, parent_id: u64) -> Result<Vec<Entry>, GatewayError> {
        self.list_all(
            DRIVE_LIST,
            &[
                ("driveId", "0".to_string()),
                ("orderBy", "file_id".to_string()),
                ("orderDirection", "asc".to_string()),
                ("parentFileId", parent_id.to_string()),
                ("trashed", "false".to_string()),
            ],
        )
        .await
    }

    #[instrument(level = "debug", skip(self, share), fields(share = %share))]
    async fn list_share(
        &self,
        share: &ShareScope,
        parent_id: u64,
    ) -> Result<Vec<Entry>, GatewayError> {
        self.list_all(
            SHARE_LIST,
            &[
                ("orderBy", "file_id".to_string()),
                ("orderDirection", "asc".to_string()),
                ("parentFileId", parent_id.to_string()),
                ("shareKey", share.key.clone()),
                ("SharePwd", share.password.clone()),
            ],
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_my_shares(&self, cursor: &str) -> Result<SharePage, GatewayError> {
        let data: ListPage<ShareInfo> = self
            .get(
                MY_SHARES,
                &[
                    ("driveId", "0".to_string()),
                    ("limit", self.page_size.to_string()),
                    ("next", cursor.to_string()),
                    ("orderBy", "fileId".to_string()),
                    ("orderDirection", "desc".to_string()),
                ],
            )
            .await?;
        Ok(SharePage::from(data))
    }

    #[instrument(level = "debug", skip_all, fields(path = %file.path()))]
    async fn signed_download_url(&self, file: &FileNode) -> Result<String, GatewayError> {
        let entry = file.entry();
        let info: DownloadInfo = match file.share() {
            None => {
                self.post(
                    DRIVE_DOWNLOAD,
                    &DriveDownloadRequest {
                        etag: &entry.content_hash,
                        file_id: entry.id,
                        file_name: &entry.name,
                        s3_key_flag: &entry.storage_flag,
                        size: entry.byte_size,
                        kind: 0,
                        drive_id: 0,
                    },
                )
                .await?
            }
            Some(share) => {
                self.post(
                    SHARE_DOWNLOAD,
                    &ShareDownloadRequest {
                        share_key: &share.key,
                        share_pwd: &share.password,
                        etag: &entry.content_hash,
                        file_id: entry.id,
                        s3_key_flag: &entry.storage_flag,
                        size: entry.byte_size,
                    },
                )
                .await?
            }
        };
        Ok(info.download_url)
    }
}
