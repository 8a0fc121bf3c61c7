use axum::response::Html;
use rust_embed::RustEmbed;
use std::fmt::Write;

use crate::constants::MAPS_SCRIPT_URL;
use crate::settings::Settings;

#[derive(RustEmbed)]
#[folder = "frontend/"]
pub struct FrontendAsset;

const API_KEY_WARNING: &str = r#"<div class="config-warning">
            ⚠️ No Google Maps API key configured - the map will not load
            <br><small>Set MAPS_API_KEY or maps.api_key in sikkim.toml</small>
        </div>"#;

// Percent-encodes everything outside the RFC 3986 unreserved set
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        }
    }
    encoded
}

/// SDK script URL with the key and the enabled feature modules.
pub fn sdk_script_url(settings: &Settings) -> String {
    let mut url = format!(
        "{}?key={}",
        MAPS_SCRIPT_URL,
        encode_query_value(settings.maps.api_key.as_deref().unwrap_or_default())
    );
    if !settings.maps.libraries.is_empty() {
        let libraries: Vec<String> = settings
            .maps
            .libraries
            .iter()
            .map(|library| encode_query_value(library))
            .collect();
        url.push_str("&libraries=");
        url.push_str(&libraries.join(","));
    }
    url
}

pub fn get_map_html(settings: &Settings) -> Option<Html<String>> {
    let template = FrontendAsset::get("index.html")?;
    let template = String::from_utf8_lossy(&template.data);

    let warning = if settings.maps.api_key.is_none() {
        API_KEY_WARNING
    } else {
        ""
    };

    let html = template
        .replace("<!-- API_KEY_WARNING_PLACEHOLDER -->", warning)
        .replace("{{PANEL_WIDTH}}", &settings.panel_width.to_string());
    Some(Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_url_carries_key_and_libraries() {
        let mut settings = Settings::default();
        settings.maps.api_key = Some("abc123".to_string());
        assert_eq!(
            sdk_script_url(&settings),
            "https://maps.googleapis.com/maps/api/js?key=abc123&libraries=places"
        );

        settings.maps.libraries.clear();
        assert_eq!(
            sdk_script_url(&settings),
            "https://maps.googleapis.com/maps/api/js?key=abc123"
        );
    }

    #[test]
    fn script_url_escapes_reserved_characters() {
        let mut settings = Settings::default();
        settings.maps.api_key = Some("a b&c=d#é".to_string());
        assert_eq!(
            sdk_script_url(&settings),
            "https://maps.googleapis.com/maps/api/js?key=a%20b%26c%3Dd%23%C3%A9&libraries=places"
        );

        settings.maps.api_key = Some("AIza-Sy_0.9~".to_string());
        assert!(sdk_script_url(&settings).contains("?key=AIza-Sy_0.9~&"));
    }

    #[test]
    fn warns_when_key_is_missing() {
        let settings = Settings::default();
        let Html(page) = get_map_html(&settings).unwrap();
        assert!(page.contains("No Google Maps API key configured"));
        assert!(page.contains("width: 320px"));

        let mut keyed = Settings::default();
        keyed.maps.api_key = Some("k".to_string());
        let Html(page) = get_map_html(&keyed).unwrap();
        assert!(!page.contains("No Google Maps API key configured"));
    }
}
