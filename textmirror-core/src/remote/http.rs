// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Blocking HTTP implementation of [`RemoteApi`] and [`BlobStore`].
//!
//! Endpoints, relative to `ApiConfig::base_url`:
//! - `GET  /{collection}?account_id=..[&limit=..][&offset=..]`
//! - `GET  /messages/recent?account_id=..&limit=..`
//! - `POST /{collection}/add` with an [`AddRequest`] JSON body
//! - `GET|PUT /media/{account_id}/{message_id}` for attachment ciphertext

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    AddRequest, BlacklistBody, BlobStore, ContactBody, ConversationBody, DraftBody, EntityKind,
    MessageBody, RemoteApi, ScheduledMessageBody, TransportError, TransportResult,
};
use crate::config::ApiConfig;

fn build_client(config: &ApiConfig) -> TransportResult<Client> {
    let mut builder = Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone());
    if let Some(proxy_url) = &config.proxy_url {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| TransportError::Network(format!("invalid proxy: {}", e)))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| TransportError::Network(e.to_string()))
}

fn network_error(e: reqwest::Error) -> TransportError {
    TransportError::Network(e.to_string())
}

fn check_status(resp: Response, what: &str) -> TransportResult<Response> {
    let status = resp.status();
    if status.as_u16() == 404 {
        return Err(TransportError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let text = resp.text().unwrap_or_default();
        return Err(TransportError::Http {
            status: status.as_u16(),
            message: text,
        });
    }
    Ok(resp)
}

/// REST client for the server of record.
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(config: &ApiConfig) -> TransportResult<Self> {
        Ok(HttpRemote {
            client: build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> TransportResult<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(network_error)?;
        check_status(resp, path)?
            .json::<Vec<T>>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn list_all<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        account_id: &str,
    ) -> TransportResult<Vec<T>> {
        self.list(kind.collection(), &[("account_id", account_id.to_string())])
    }

    fn add<T: Serialize>(&self, kind: EntityKind, request: &AddRequest<T>) -> TransportResult<()> {
        let url = format!("{}/{}/add", self.base_url, kind.collection());
        tracing::debug!(url = %url, count = request.entities.len(), "POST");
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .map_err(network_error)?;
        check_status(resp, kind.collection())?;
        Ok(())
    }
}

impl RemoteApi for HttpRemote {
    fn list_messages(
        &self,
        account_id: &str,
        limit: usize,
        offset: usize,
    ) -> TransportResult<Vec<MessageBody>> {
        self.list(
            EntityKind::Messages.collection(),
            &[
                ("account_id", account_id.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
    }

    fn list_recent_messages(
        &self,
        account_id: &str,
        limit: usize,
    ) -> TransportResult<Vec<MessageBody>> {
        self.list(
            "messages/recent",
            &[
                ("account_id", account_id.to_string()),
                ("limit", limit.to_string()),
            ],
        )
    }

    fn list_conversations(&self, account_id: &str) -> TransportResult<Vec<ConversationBody>> {
        self.list_all(EntityKind::Conversations, account_id)
    }

    fn list_contacts(&self, account_id: &str) -> TransportResult<Vec<ContactBody>> {
        self.list_all(EntityKind::Contacts, account_id)
    }

    fn list_blacklists(&self, account_id: &str) -> TransportResult<Vec<BlacklistBody>> {
        self.list_all(EntityKind::Blacklists, account_id)
    }

    fn list_scheduled_messages(
        &self,
        account_id: &str,
    ) -> TransportResult<Vec<ScheduledMessageBody>> {
        self.list_all(EntityKind::ScheduledMessages, account_id)
    }

    fn list_drafts(&self, account_id: &str) -> TransportResult<Vec<DraftBody>> {
        self.list_all(EntityKind::Drafts, account_id)
    }

    fn add_messages(&self, request: &AddRequest<MessageBody>) -> TransportResult<()> {
        self.add(EntityKind::Messages, request)
    }

    fn add_conversations(&self, request: &AddRequest<ConversationBody>) -> TransportResult<()> {
        self.add(EntityKind::Conversations, request)
    }

    fn add_contacts(&self, request: &AddRequest<ContactBody>) -> TransportResult<()> {
        self.add(EntityKind::Contacts, request)
    }

    fn add_blacklists(&self, request: &AddRequest<BlacklistBody>) -> TransportResult<()> {
        self.add(EntityKind::Blacklists, request)
    }

    fn add_scheduled_messages(
        &self,
        request: &AddRequest<ScheduledMessageBody>,
    ) -> TransportResult<()> {
        self.add(EntityKind::ScheduledMessages, request)
    }

    fn add_drafts(&self, request: &AddRequest<DraftBody>) -> TransportResult<()> {
        self.add(EntityKind::Drafts, request)
    }
}

/// Blob store served under `/media` of the same API.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
}

impl HttpBlobStore {
    pub fn new(config: &ApiConfig) -> TransportResult<Self> {
        Ok(HttpBlobStore {
            client: build_client(config)?,
            base_url: format!("{}/media", config.base_url.trim_end_matches('/')),
        })
    }
}

impl BlobStore for HttpBlobStore {
    fn get(&self, path: &str) -> TransportResult<Vec<u8>> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self.client.get(&url).send().map_err(network_error)?;
        let bytes = check_status(resp, path)?.bytes().map_err(network_error)?;
        Ok(bytes.to_vec())
    }

    fn put(&self, path: &str, ciphertext: &[u8]) -> TransportResult<()> {
        let url = format!("{}/{}", self.base_url, path);
        let resp = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(ciphertext.to_vec())
            .send()
            .map_err(network_error)?;
        check_status(resp, path)?;
        Ok(())
    }
}
