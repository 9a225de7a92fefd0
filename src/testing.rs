//! Shared fixtures for handler tests.

use std::sync::Arc;

use mockito::{Matcher, Mock, ServerGuard};

use crate::bot::AppState;
use crate::config::{Config, GofileConfig, ServerConfig, StoreConfig, TelegramConfig, UploadConfig};
use crate::store::SqliteTokenStore;

pub fn test_config(telegram_url: &str, gofile_url: &str) -> Config {
    Config {
        telegram: TelegramConfig {
            bot_token: "TEST".to_string(),
            api_url: telegram_url.to_string(),
        },
        gofile: GofileConfig {
            api_url: gofile_url.to_string(),
            upload_url: format!("{}/{{server}}/uploadfile", gofile_url),
            download_page_url: "https://gofile.io/d".to_string(),
        },
        server: ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            webhook_path: "/webhook".to_string(),
        },
        store: StoreConfig {
            database_path: ":memory:".into(),
        },
        upload: UploadConfig::default(),
    }
}

/// State pointed at the given mock servers, with an empty in-memory token store.
pub async fn test_state(telegram_url: &str, gofile_url: &str) -> AppState {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    AppState::new(&test_config(telegram_url, gofile_url), Arc::new(store))
}

/// Mocks that fail `assert_async` if the server sees any GET or POST.
pub async fn catch_all(server: &mut ServerGuard) -> Vec<Mock> {
    let mut mocks = Vec::new();
    for method in ["GET", "POST"] {
        let mock = server
            .mock(method, Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        mocks.push(mock);
    }
    mocks
}

/// Base URL of a local port with nothing listening on it.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
