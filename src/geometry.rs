//! Fit, centering and touch geometry.
//!
//! Everything here is a pure function of its arguments. Degenerate input
//! (zero-sized images, missing touches) maps to an empty or neutral result
//! instead of an error.

use crate::model::{Dimensions, Position, Touch};

/// "Contain" fit of `image` into `viewport`: the centering translate of the
/// unscaled image box and the scale that makes it fit.
pub fn fit_transform(image: Option<Dimensions>, viewport: Dimensions) -> Option<(Position, f64)> {
    let image = image.filter(Dimensions::is_drawable)?;
    let w_scale = viewport.width / image.width;
    let h_scale = viewport.height / image.height;
    let scale = w_scale.min(h_scale);
    if !scale.is_finite() {
        return None;
    }
    Some((center_translate(image, viewport), scale))
}

/// Translate that centers a box of `image` size inside `viewport`.
pub fn center_translate(image: Dimensions, viewport: Dimensions) -> Position {
    Position::new(
        (viewport.width - image.width) / 2.0,
        (viewport.height - image.height) / 2.0,
    )
}

/// Inverse of [`center_translate`]: the box size a centering translate implies.
pub fn dimensions_from_translate(translate: Position, viewport: Dimensions) -> Dimensions {
    Dimensions::new(
        viewport.width - translate.x * 2.0,
        viewport.height - translate.y * 2.0,
    )
}

/// Centering translate for the box implied by `current` once scaled by `target_scale`.
pub fn translate_for_scale(current: Position, target_scale: f64, viewport: Dimensions) -> Position {
    let size = dimensions_from_translate(current, viewport);
    center_translate(size.scaled(target_scale), viewport)
}

/// How far the scaled image centre may move away from the viewport centre on
/// each axis. Zero on an axis where the scaled image fits the viewport.
pub fn pan_limits(
    initial_translate: Position,
    scale: f64,
    viewport: Dimensions,
    margin: f64,
) -> Position {
    let centered = translate_for_scale(initial_translate, scale, viewport);
    let limit = |overflow: f64| {
        if overflow < 0.0 {
            -overflow + margin.max(0.0)
        } else {
            0.0
        }
    };
    Position::new(limit(centered.x), limit(centered.y))
}

/// Keep `translate` inside the pan limits for `scale`.
pub fn clamp_translate(
    translate: Position,
    initial_translate: Position,
    scale: f64,
    viewport: Dimensions,
    margin: f64,
) -> Position {
    let limits = pan_limits(initial_translate, scale, viewport, margin);
    let offset = translate - initial_translate;
    initial_translate
        + Position::new(
            offset.x.clamp(-limits.x, limits.x),
            offset.y.clamp(-limits.y, limits.y),
        )
}

/// Euclidean distance between the first two touches; 0 when either is missing.
pub fn touch_distance(touches: &[Touch]) -> f64 {
    match first_two(touches) {
        Some((a, b)) => a.distance_to(b),
        None => 0.0,
    }
}

pub fn touch_midpoint(touches: &[Touch]) -> Option<Position> {
    let (a, b) = first_two(touches)?;
    Some(Position::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
}

fn first_two(touches: &[Touch]) -> Option<(Position, Position)> {
    let a = touches.first()?.position()?;
    let b = touches.get(1)?.position()?;
    Some((a, b))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformOp {
    TranslateX(f64),
    TranslateY(f64),
    Scale(f64),
}

/// Size and transform list handed to the renderer for one image.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderAttributes {
    pub width: f64,
    pub height: f64,
    pub transform: Vec<TransformOp>,
}

impl RenderAttributes {
    pub fn placeholder() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            transform: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn to_css(&self) -> String {
        let mut css = format!("width:{}px;height:{}px;", self.width, self.height);
        if !self.transform.is_empty() {
            let ops: Vec<String> = self
                .transform
                .iter()
                .map(|op| match op {
                    TransformOp::TranslateX(v) => format!("translateX({v}px)"),
                    TransformOp::TranslateY(v) => format!("translateY({v}px)"),
                    TransformOp::Scale(v) => format!("scale({v})"),
                })
                .collect();
            css.push_str(&format!("transform:{};", ops.join(" ")));
        }
        css
    }
}

pub fn style_for(image: Option<Dimensions>, translate: Position, scale: Option<f64>) -> RenderAttributes {
    let image = match image.filter(Dimensions::is_drawable) {
        Some(d) => d,
        None => return RenderAttributes::placeholder(),
    };
    let mut transform = vec![
        TransformOp::TranslateX(translate.x),
        TransformOp::TranslateY(translate.y),
    ];
    if let Some(s) = scale {
        transform.push(TransformOp::Scale(s));
    }
    RenderAttributes {
        width: image.width,
        height: image.height,
        transform,
    }
}
