//! Core data model for the image viewer.
//! Plain values shared by the geometry helpers, the state machines and the components.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Live rendering transform of one image.
///
/// `translate` places the unscaled image box; `scale` is applied around the
/// box centre (CSS `transform-origin: center`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate: Position,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Position::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSource {
    /// Bundled asset handle.
    Asset(u32),
    Remote {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
    },
}

impl ImageSource {
    pub fn uri(uri: impl Into<String>) -> Self {
        ImageSource::Remote {
            uri: uri.into(),
            width: None,
            height: None,
        }
    }

    /// Identity used for list keys and the dimension cache.
    pub fn cache_key(&self) -> String {
        match self {
            ImageSource::Asset(id) => id.to_string(),
            ImageSource::Remote { uri, .. } => uri.clone(),
        }
    }

    /// Dimensions declared by the caller, when both sides are present and usable.
    pub fn declared_dimensions(&self) -> Option<Dimensions> {
        match self {
            ImageSource::Remote {
                width: Some(w),
                height: Some(h),
                ..
            } => Some(Dimensions::new(*w, *h)).filter(Dimensions::is_drawable),
            _ => None,
        }
    }

    /// URL handed to the `<img>` element; assets resolve under `asset_base`.
    pub fn render_uri(&self, asset_base: &str) -> String {
        match self {
            ImageSource::Asset(id) => format!("{}/{}", asset_base.trim_end_matches('/'), id),
            ImageSource::Remote { uri, .. } => uri.clone(),
        }
    }
}

/// One touch point. Coordinates are optional because platform touch lists can
/// hand back partial entries; a missing coordinate means "no movement".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Touch {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Touch {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    pub fn position(&self) -> Option<Position> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(Position::new(x, y)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single touch event as seen by a gesture engine.
///
/// `touches` lists the points still on the surface after the event;
/// `changed` lists the points the event is about (lifted points for `Up`).
#[derive(Clone, Debug, PartialEq)]
pub struct TouchFrame {
    pub phase: TouchPhase,
    pub touches: Vec<Touch>,
    pub changed: Vec<Touch>,
    pub at_ms: f64,
}

impl TouchFrame {
    pub fn new(phase: TouchPhase, touches: Vec<Touch>, changed: Vec<Touch>, at_ms: f64) -> Self {
        Self {
            phase,
            touches,
            changed,
            at_ms,
        }
    }
}
