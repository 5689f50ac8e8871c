//! reqwest-backed implementation of [`SyncApi`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use inkstream_shared::{
    Comment, Conversation, ConversationId, Message, Notification, NotificationId, Post, PostId,
    UserId,
};

use crate::{ApiError, Result, SyncApi};

/// HTTP client for the application backend.
///
/// All requests carry `Authorization: Bearer <token>`; the token is the one
/// issued at login and is fixed for the lifetime of the client.
pub struct HttpApi {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CreateConversationBody<'a> {
    participant_ids: &'a [UserId],
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    content: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Serialize)]
struct MarkNotificationBody {
    id: NotificationId,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "POST");
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn put_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "PUT");
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        debug!(path, "PATCH");
        let resp = self
            .client
            .patch(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::decode(path, resp).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        debug!(path, "DELETE");
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SyncApi for HttpApi {
    async fn fetch_conversations(&self) -> Result<Vec<Conversation>> {
        self.get_json("/conversations").await
    }

    async fn fetch_conversation(&self, id: ConversationId) -> Result<Conversation> {
        self.get_json(&format!("/conversations/{id}")).await
    }

    async fn create_conversation(
        &self,
        participant_ids: &[UserId],
        name: Option<&str>,
    ) -> Result<Conversation> {
        self.post_json(
            "/conversations",
            &CreateConversationBody {
                participant_ids,
                name,
            },
        )
        .await
    }

    async fn send_message(&self, conversation: ConversationId, content: &str) -> Result<Message> {
        self.post_json(
            &format!("/conversations/{conversation}/message"),
            &SendMessageBody {
                content,
                kind: "text",
            },
        )
        .await
    }

    async fn mark_conversation_read(&self, id: ConversationId) -> Result<Vec<Message>> {
        self.put_json(&format!("/conversations/{id}/message/read")).await
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.get_json("/notifications").await
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<Notification> {
        self.patch_json("/notifications/read", &MarkNotificationBody { id })
            .await
    }

    async fn mark_all_notifications_read(&self) -> Result<()> {
        let path = "/notifications/read-all";
        debug!(path, "PATCH");
        let resp = self
            .client
            .patch(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(())
    }

    async fn delete_notification(&self, id: NotificationId) -> Result<()> {
        self.delete(&format!("/notifications/{id}")).await
    }

    async fn fetch_post(&self, id: PostId) -> Result<Post> {
        self.get_json(&format!("/posts/{id}")).await
    }

    async fn fetch_comments(&self, post: PostId) -> Result<Vec<Comment>> {
        self.get_json(&format!("/posts/{post}/comments")).await
    }
}
