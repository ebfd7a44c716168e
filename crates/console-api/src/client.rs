use crate::envelope::{
    Envelope, LoginData, MessageData, NotificationsData, RecordsData, TasksData, UsersData,
    parse_error_body,
};
use crate::error::ApiError;
use crate::http::{AuthTransport, RawResponse, RequestOptions};
use console_core::model::{Notification, RedemptionRecord, Task, User};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use tracing::info;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Operations the console performs against the admin backend.
pub trait AdminBackend: Send + Sync {
    fn login<'a>(&'a self, username: &'a str, password: &'a str) -> ApiFuture<'a, LoginData>;
    fn list_users(&self) -> ApiFuture<'_, Vec<User>>;
    fn add_user<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, String>;
    fn user_records<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, Vec<RedemptionRecord>>;
    fn list_tasks(&self) -> ApiFuture<'_, Vec<Task>>;
    fn add_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String>;
    fn completed_tasks(&self, limit: u32) -> ApiFuture<'_, Vec<Task>>;
    fn delete_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String>;
    fn list_notifications(&self, limit: u32) -> ApiFuture<'_, Vec<Notification>>;
}

#[derive(Clone)]
pub struct AdminClient {
    transport: AuthTransport,
}

impl AdminClient {
    pub fn new(transport: AuthTransport) -> Self {
        Self { transport }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.transport.request(segments, options).await?;
        decode_data(&response)
    }

    async fn mutate(
        &self,
        segments: &[&str],
        options: RequestOptions,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let response = self.transport.request(segments, options).await?;
        let message = decode_message(&response)?;
        Ok(message.unwrap_or_else(|| fallback.to_string()))
    }
}

impl AdminBackend for AdminClient {
    fn login<'a>(&'a self, username: &'a str, password: &'a str) -> ApiFuture<'a, LoginData> {
        Box::pin(async move {
            let options = RequestOptions::with_method(Method::POST)
                .json(json!({ "username": username, "password": password }));
            let response = self.transport.request_unchecked(&["login"], options).await?;
            let data: LoginData = decode_data(&response)?;
            info!(username, "Admin login succeeded");
            Ok(data)
        })
    }

    fn list_users(&self) -> ApiFuture<'_, Vec<User>> {
        Box::pin(async move {
            let data: UsersData = self.fetch(&["users"], RequestOptions::get()).await?;
            Ok(data.users)
        })
    }

    fn add_user<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let options = RequestOptions::with_method(Method::POST).json(json!({
                "fid": fid,
                "nickname": "",
                "kid": 0,
                "avatar_image": "",
            }));
            self.mutate(&["users"], options, "User added").await
        })
    }

    fn user_records<'a>(&'a self, fid: &'a str) -> ApiFuture<'a, Vec<RedemptionRecord>> {
        Box::pin(async move {
            let data: RecordsData = self
                .fetch(&["users", fid, "codes"], RequestOptions::get())
                .await?;
            Ok(data.records)
        })
    }

    fn list_tasks(&self) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let data: TasksData = self.fetch(&["tasks"], RequestOptions::get()).await?;
            Ok(data.tasks)
        })
    }

    fn add_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let options = RequestOptions::with_method(Method::POST).json(json!({ "code": code }));
            self.mutate(&["tasks"], options, "Gift code task created").await
        })
    }

    fn completed_tasks(&self, limit: u32) -> ApiFuture<'_, Vec<Task>> {
        Box::pin(async move {
            let options = RequestOptions::get().query("limit", limit);
            let data: TasksData = self.fetch(&["tasks", "completed"], options).await?;
            Ok(data.tasks)
        })
    }

    fn delete_task<'a>(&'a self, code: &'a str) -> ApiFuture<'a, String> {
        Box::pin(async move {
            let options = RequestOptions::with_method(Method::DELETE);
            self.mutate(&["tasks", code], options, "Task deleted").await
        })
    }

    fn list_notifications(&self, limit: u32) -> ApiFuture<'_, Vec<Notification>> {
        Box::pin(async move {
            let options = RequestOptions::get().query("limit", limit);
            let data: NotificationsData = self.fetch(&["notifications"], options).await?;
            Ok(data.notifications)
        })
    }
}

fn status_error(response: &RawResponse) -> ApiError {
    let error = parse_error_body(&response.body);
    ApiError::Status {
        status: response.status.as_u16(),
        code: error.as_ref().and_then(|e| e.code()).map(str::to_string),
        message: error.map(|e| e.message().to_string()),
    }
}

fn decode_data<T: DeserializeOwned>(response: &RawResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(status_error(response));
    }
    let envelope: Envelope<T> = response
        .json()
        .map_err(|err| ApiError::Decode(err.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Status {
            status: response.status.as_u16(),
            code: envelope.error.as_ref().and_then(|e| e.code()).map(str::to_string),
            message: envelope.error.map(|e| e.message().to_string()),
        });
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Decode("response is missing data".to_string()))
}

/// Mutations answer either `data.message` or a top-level `message`.
fn decode_message(response: &RawResponse) -> Result<Option<String>, ApiError> {
    if !response.is_success() {
        return Err(status_error(response));
    }
    let envelope: Envelope<MessageData> = match response.json() {
        Ok(envelope) => envelope,
        Err(_) if response.body.trim().is_empty() => return Ok(None),
        Err(err) => return Err(ApiError::Decode(err.to_string())),
    };
    if !envelope.success {
        return Err(ApiError::Status {
            status: response.status.as_u16(),
            code: envelope.error.as_ref().and_then(|e| e.code()).map(str::to_string),
            message: envelope.error.map(|e| e.message().to_string()),
        });
    }
    Ok(envelope
        .data
        .and_then(|data| data.message)
        .or(envelope.message)
        .filter(|message| !message.is_empty()))
}
