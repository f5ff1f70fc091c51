use super::models::CreatedEvent;
use crate::components::ics::{generate_uid, CalendarEvent, IcsEncoder};
use crate::error::{config_error, AppResult, Error};
use crate::settings::Settings;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::{Client, Method};
use tracing::{info, warn};
use url::Url;

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop>
    <d:resourcetype/>
  </d:prop>
</d:propfind>"#;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Writes events into a CalDAV collection
#[derive(Debug, Clone)]
pub struct CalDavClient {
    client: Client,
    encoder: IcsEncoder,
}

impl Default for CalDavClient {
    fn default() -> Self {
        Self::new(IcsEncoder::default())
    }
}

impl CalDavClient {
    pub fn new(encoder: IcsEncoder) -> Self {
        Self {
            client: Client::new(),
            encoder,
        }
    }

    pub fn encoder(&self) -> &IcsEncoder {
        &self.encoder
    }

    /// Probe the collection with `PROPFIND`; true only for a 2xx answer
    pub async fn check_connection(&self, settings: &Settings) -> bool {
        let url = match collection_url(&settings.server_url) {
            Ok(url) => url,
            Err(e) => {
                warn!("Connection check skipped: {}", e);
                return false;
            }
        };

        let method = match Method::from_bytes(b"PROPFIND") {
            Ok(method) => method,
            Err(e) => {
                warn!("Connection check skipped: {}", e);
                return false;
            }
        };

        let response = self
            .client
            .request(method, url.clone())
            .header(AUTHORIZATION, basic_auth(&settings.username, &settings.password))
            .header("Depth", "0")
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(PROPFIND_BODY)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!("Calendar server reachable at {} ({})", url, response.status());
                true
            }
            Ok(response) => {
                warn!("Calendar server at {} answered {}", url, response.status());
                false
            }
            Err(e) => {
                warn!("Connection check to {} failed: {}", url, e);
                false
            }
        }
    }

    /// Encode `event` and `PUT` it as a new resource, refusing to overwrite
    pub async fn create_event(
        &self,
        event: &CalendarEvent,
        settings: &Settings,
    ) -> AppResult<CreatedEvent> {
        let uid = generate_uid();
        let body = self.encoder.encode(event, &uid)?;
        let url = event_url(&settings.server_url, &uid)?;

        info!("Creating event '{}' at {}", event.title, url);

        let response = self
            .client
            .put(url.clone())
            .header(AUTHORIZATION, basic_auth(&settings.username, &settings.password))
            .header(CONTENT_TYPE, CALENDAR_CONTENT_TYPE)
            .header(IF_NONE_MATCH, "*")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Calendar server rejected event {}: {}", uid, status);
            return Err(Error::Protocol {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        info!("Created event {} ({})", uid, status);
        Ok(CreatedEvent {
            uid,
            href: url.to_string(),
        })
    }
}

/// `Authorization` value for HTTP Basic, base64 over the UTF-8 bytes of `user:password`
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

/// The collection URL, always ending in `/`
pub fn collection_url(server_url: &str) -> AppResult<Url> {
    let trimmed = server_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| config_error(&format!("Invalid server URL '{}': {}", server_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(config_error(&format!(
            "Unsupported server URL scheme '{}'",
            other
        ))),
    }
}

/// Resource URL for an event: collection URL + `UID.ics`
pub fn event_url(server_url: &str, uid: &str) -> AppResult<Url> {
    collection_url(server_url)?
        .join(&format!("{}.ics", uid))
        .map_err(|e| config_error(&format!("Invalid event URL for '{}': {}", uid, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_handles_utf8() {
        assert_eq!(basic_auth("user", "pass"), "Basic dXNlcjpwYXNz");
        assert_eq!(basic_auth("jörg", "pässword"), format!("Basic {}", STANDARD.encode("jörg:pässword".as_bytes())));
    }

    #[test]
    fn test_collection_url_forces_trailing_slash() {
        assert_eq!(
            collection_url("https://dav.example.com/cal/home").unwrap().as_str(),
            "https://dav.example.com/cal/home/"
        );
        assert_eq!(
            collection_url("https://dav.example.com/cal/home/").unwrap().as_str(),
            "https://dav.example.com/cal/home/"
        );
    }

    #[test]
    fn test_event_url_appends_uid() {
        assert_eq!(
            event_url("https://dav.example.com/cal/home", "abc-123").unwrap().as_str(),
            "https://dav.example.com/cal/home/abc-123.ics"
        );
    }

    #[test]
    fn test_invalid_server_urls() {
        assert!(matches!(collection_url("not a url"), Err(Error::Config(_))));
        assert!(matches!(collection_url("ftp://example.com/"), Err(Error::Config(_))));
    }
}
