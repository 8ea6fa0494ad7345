use serde::{Deserialize, Serialize};

/// A quote as the session and the store see it. `id` stays `None` until the
/// store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Option<i64>,
    pub text: String,
    pub author: String,
    pub category: String,
}

impl Quote {
    pub fn new(
        text: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            text: text.into(),
            author: author.into(),
            category: category.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Deletion identity: by id once persisted, by full value before.
    pub fn same_record(&self, other: &Quote) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            (None, _) | (_, None) => {
                self.text == other.text
                    && self.author == other.author
                    && self.category == other.category
            }
        }
    }
}

/// One item of the quote API's JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: String,
    pub author: String,
    pub category: String,
}

impl From<QuoteResponse> for Quote {
    fn from(response: QuoteResponse) -> Self {
        Quote::new(response.quote, response.author, response.category)
    }
}

/// Opaque RGB color, channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn alpha(&self) -> f32 {
        1.0
    }

    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn foreground_ansi(self) -> String {
        let (r, g, b) = self.to_u8();
        format!("\x1b[38;2;{};{};{}m", r, g, b)
    }

    pub fn background_ansi(self) -> String {
        let (r, g, b) = self.to_u8();
        format!("\x1b[48;2;{};{};{}m", r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub current_quote: Option<Quote>,
    pub saved_quotes: Vec<Quote>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub background_color: Rgb,
    pub text_color: Rgb,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_quote: None,
            saved_quotes: Vec::new(),
            is_loading: false,
            error: None,
            background_color: Rgb::WHITE,
            text_color: Rgb::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_converts_to_unpersisted_quote() {
        let response: QuoteResponse = serde_json::from_str(
            r#"{"quote": "Q", "author": "A", "category": "C"}"#,
        )
        .unwrap();
        let quote = Quote::from(response);

        assert_eq!(quote, Quote::new("Q", "A", "C"));
        assert!(!quote.is_persisted());
    }

    #[test]
    fn test_same_record_uses_id_once_persisted() {
        let mut a = Quote::new("Q", "A", "C");
        let mut b = Quote::new("Q", "A", "C");
        assert!(a.same_record(&b));

        a.id = Some(1);
        b.id = Some(2);
        assert!(!a.same_record(&b));

        b.id = Some(1);
        b.text = "different".to_string();
        assert!(a.same_record(&b));
    }

    #[test]
    fn test_rgb_ansi_sequences() {
        assert_eq!(Rgb::WHITE.to_u8(), (255, 255, 255));
        assert_eq!(Rgb::BLACK.foreground_ansi(), "\x1b[38;2;0;0;0m");
        assert_eq!(Rgb::new(1.0, 0.0, 0.0).background_ansi(), "\x1b[48;2;255;0;0m");
    }

    #[test]
    fn test_default_session_state() {
        let state = SessionState::default();
        assert!(state.current_quote.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.background_color, Rgb::WHITE);
        assert_eq!(state.text_color, Rgb::BLACK);
    }
}
