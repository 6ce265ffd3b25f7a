//! Site configuration.
//!
//! Every field has a default matching the stock page layout, so a page only
//! needs to ship a `<script type="application/json" id="site-config">` block
//! when it wants to change something.

use serde::Deserialize;

use crate::error::Result;

/// Id of the optional inline JSON config element.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(alias = "src")]
    pub source_path: String,
}

impl Track {
    pub fn new(title: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_path: source_path.into(),
        }
    }
}

/// Ids and selectors of the DOM elements the page must provide.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub audio_player: String,
    pub visualizer: String,
    pub track_title: String,
    pub playlist: String,
    pub contact_form: String,
    pub form_status: String,
    pub header_selector: String,
    pub nav_link_selector: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            audio_player: "audio-player".to_string(),
            visualizer: "visualizer".to_string(),
            track_title: "track-title".to_string(),
            playlist: "playlist".to_string(),
            contact_form: "contact-form".to_string(),
            form_status: "form-status".to_string(),
            header_selector: "header".to_string(),
            nav_link_selector: "nav ul li a".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Section whose link is active when the URL has no fragment.
    pub default_section: String,
    pub active_class: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            default_section: "home".to_string(),
            active_class: "active".to_string(),
        }
    }
}

/// RGB triple used for the bar gradient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn css_with_alpha(self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.0, self.1, self.2, alpha)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Analysis window in samples; the bin count is half of it.
    pub fft_size: u32,
    /// Bar width multiplier applied to `canvas_width / bin_count`.
    pub bar_scale: f64,
    /// Horizontal gap between bars, in pixels.
    pub bar_gap: f64,
    /// Magnitudes are divided by this to get the bar height.
    pub height_divisor: f64,
    pub top_color: Rgb,
    pub bottom_color: Rgb,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            bar_scale: 2.5,
            bar_gap: 1.0,
            height_divisor: 2.0,
            top_color: Rgb(255, 0, 255),
            bottom_color: Rgb(0, 255, 255),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub sending_message: String,
    pub success_message: String,
    pub failure_message: String,
    pub network_error_message: String,
    pub sending_color: String,
    pub success_color: String,
    pub error_color: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            sending_message: "Sending...".to_string(),
            success_message: "Message sent successfully! I'll get back to you soon.".to_string(),
            failure_message: "Oops! There was a problem sending your message.".to_string(),
            network_error_message: "Network error. Please try again later.".to_string(),
            sending_color: "var(--accent-color-blue)".to_string(),
            success_color: "var(--accent-color-magenta)".to_string(),
            error_color: "red".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub elements: ElementIds,
    pub nav: NavConfig,
    pub tracks: Vec<Track>,
    pub visualizer: VisualizerConfig,
    pub contact: ContactConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            elements: ElementIds::default(),
            nav: NavConfig::default(),
            tracks: default_tracks(),
            visualizer: VisualizerConfig::default(),
            contact: ContactConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the inline config element, falling back to defaults when it is
    /// absent or malformed.
    pub fn load(document: &web_sys::Document) -> Self {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        match Self::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}; using default configuration");
                Self::default()
            }
        }
    }
}

pub fn default_tracks() -> Vec<Track> {
    vec![
        Track::new(
            "Melodic Voyage",
            "assets/audio/melodic-voyage-by-dj-nacho-pereira.mp3",
        ),
        Track::new("Cybernetic Dreams", "assets/audio/cybernetic-dreams.mp3"),
        Track::new("Neon Pulse", "assets/audio/neon-pulse.mp3"),
        Track::new(
            "Cyberpunk Plattforms",
            "assets/audio/cyberpunk-plattforms.mp3",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_page() {
        let c = SiteConfig::default();
        assert_eq!(c.tracks.len(), 4);
        assert_eq!(c.tracks[0].title, "Melodic Voyage");
        assert_eq!(c.elements.audio_player, "audio-player");
        assert_eq!(c.elements.nav_link_selector, "nav ul li a");
        assert_eq!(c.visualizer.fft_size, 256);
        assert_eq!(c.nav.default_section, "home");
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let json = r#"{
            "tracks": [{ "title": "Solo", "src": "assets/audio/solo.mp3" }],
            "contact": { "error_color": "crimson" }
        }"#;
        let c = SiteConfig::from_json(json).unwrap();
        assert_eq!(c.tracks, vec![Track::new("Solo", "assets/audio/solo.mp3")]);
        assert_eq!(c.contact.error_color, "crimson");
        assert_eq!(c.contact.sending_message, "Sending...");
        assert_eq!(c.visualizer.bar_scale, 2.5);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SiteConfig::from_json("{ tracks: ").is_err());
    }

    #[test]
    fn rgb_formats_as_css_rgba() {
        assert_eq!(Rgb(0, 255, 255).css_with_alpha(0.5), "rgba(0, 255, 255, 0.5)");
    }
}
