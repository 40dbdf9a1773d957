//! The detail box shown beside the map.

use crate::page::escape_html;
use crate::selection::{Attr, SelectionState};
use serde::Serialize;

pub const PLACEHOLDER: &str = "no point selected yet";
pub const UNKNOWN_NAME: &str = "unknown name";
pub const UNKNOWN_DISTRICT: &str = "unknown district";
pub const UNKNOWN_LAT: &str = "unknown latitude";
pub const UNKNOWN_LON: &str = "unknown longitude";
pub const LINK_LABEL: &str = "open related album";
pub const NO_LINK: &str = "none";
pub const BAD_LINK: &str = "no related link";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Link {
    /// Opens in a new tab.
    Href { url: String, label: &'static str },
    None { text: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailFragment {
    Placeholder {
        text: &'static str,
    },
    Point {
        name: String,
        district: String,
        lat: String,
        lon: String,
        link: Link,
    },
}

pub fn render(state: &SelectionState) -> DetailFragment {
    let event = match state {
        SelectionState::Empty => return DetailFragment::Placeholder { text: PLACEHOLDER },
        SelectionState::Selected(event) => event,
    };

    let text_or = |attr: &Attr<String>, fallback: &str| match attr {
        Attr::Present(s) => s.clone(),
        _ => fallback.to_string(),
    };
    let coord_or = |attr: &Attr<f64>, fallback: &str| match attr {
        Attr::Present(v) => format!("{:.4}", v),
        _ => fallback.to_string(),
    };

    let link = match &event.attrs.url {
        Attr::Present(url) if !url.trim().is_empty() => Link::Href {
            url: url.clone(),
            label: LINK_LABEL,
        },
        Attr::Malformed => Link::None { text: BAD_LINK },
        _ => Link::None { text: NO_LINK },
    };

    DetailFragment::Point {
        name: text_or(&event.text, UNKNOWN_NAME),
        district: text_or(&event.attrs.district, UNKNOWN_DISTRICT),
        lat: coord_or(&event.lat, UNKNOWN_LAT),
        lon: coord_or(&event.lon, UNKNOWN_LON),
        link,
    }
}

impl DetailFragment {
    pub fn to_html(&self) -> String {
        match self {
            DetailFragment::Placeholder { text } => {
                format!(r#"<p class="placeholder">{}</p>"#, escape_html(text))
            }
            DetailFragment::Point {
                name,
                district,
                lat,
                lon,
                link,
            } => {
                let link = match link {
                    Link::Href { url, label } => format!(
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                        escape_html(url),
                        escape_html(label)
                    ),
                    Link::None { text } => escape_html(text),
                };
                format!(
                    "<dl class=\"detail\">\
                     <dt>Name</dt><dd>{}</dd>\
                     <dt>District</dt><dd>{}</dd>\
                     <dt>Latitude</dt><dd>{}</dd>\
                     <dt>Longitude</dt><dd>{}</dd>\
                     <dt>Link</dt><dd>{}</dd>\
                     </dl>",
                    escape_html(name),
                    escape_html(district),
                    escape_html(lat),
                    escape_html(lon),
                    link
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ClickEvent;
    use serde_json::json;

    fn selected(payload: serde_json::Value) -> SelectionState {
        SelectionState::Selected(ClickEvent::from_json(&payload))
    }

    #[test]
    fn empty_state_is_placeholder() {
        assert_eq!(
            render(&SelectionState::Empty),
            DetailFragment::Placeholder { text: PLACEHOLDER }
        );
    }

    #[test]
    fn coordinates_have_four_decimals() {
        let fragment = render(&selected(json!({
            "case": "C-1", "lat": 22.6, "lon": 120.312345,
            "district": "Lingya", "url": "https://example.com/a"
        })));
        assert_eq!(
            fragment,
            DetailFragment::Point {
                name: "C-1".into(),
                district: "Lingya".into(),
                lat: "22.6000".into(),
                lon: "120.3123".into(),
                link: Link::Href {
                    url: "https://example.com/a".into(),
                    label: LINK_LABEL,
                },
            }
        );
    }

    #[test]
    fn missing_fields_use_fallbacks() {
        let DetailFragment::Point {
            name,
            district,
            lat,
            lon,
            link,
        } = render(&selected(json!({})))
        else {
            panic!("expected point fragment");
        };
        assert_eq!(name, UNKNOWN_NAME);
        assert_eq!(district, UNKNOWN_DISTRICT);
        assert_eq!(lat, UNKNOWN_LAT);
        assert_eq!(lon, UNKNOWN_LON);
        assert_eq!(link, Link::None { text: NO_LINK });
    }

    #[test]
    fn empty_and_malformed_urls() {
        let empty = render(&selected(json!({ "url": "" })));
        let malformed = render(&selected(json!({ "url": ["a"] })));
        let script = render(&selected(json!({ "url": "javascript:alert(1)" })));
        assert!(matches!(
            empty,
            DetailFragment::Point { link: Link::None { text: NO_LINK }, .. }
        ));
        assert!(matches!(
            malformed,
            DetailFragment::Point { link: Link::None { text: BAD_LINK }, .. }
        ));
        assert!(matches!(
            &script,
            DetailFragment::Point { link: Link::None { text: BAD_LINK }, .. }
        ));
        assert!(!script.to_html().contains("href"));
    }

    #[test]
    fn html_is_escaped_and_link_opens_new_tab() {
        let html = render(&selected(json!({
            "case": "<b>x</b>", "lat": 1, "lon": 2, "district": "A&B",
            "url": "https://example.com/?a=1&b=2"
        })))
        .to_html();
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=2" target="_blank""#));
        assert!(html.contains(LINK_LABEL));
    }
}
