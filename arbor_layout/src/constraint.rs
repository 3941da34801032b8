// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout constraint passed from parent to child during measure.

use kurbo::{Insets, Size};

use crate::geometry::{Axis, OptionalSize};
use crate::types::{Dimension, NodeStyle};

/// Bounds and size hints for measuring one node.
///
/// A resolved size always lies within `[min_size, max_size]` component-wise. An ideal size,
/// when present, replaces the content size but is still clamped into that range.
///
/// The same type is used for the constraint a node receives (its *own* constraint) and for
/// the constraint a parent hands down for its content box; [`LayoutConstraint::for_child`]
/// turns the latter into the former by applying the child's [`NodeStyle`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConstraint {
    /// Smallest allowed size.
    pub min_size: Size,
    /// Largest allowed size. Components may be infinite.
    pub max_size: Size,
    /// Size the node should take regardless of content, per axis.
    pub self_ideal_size: OptionalSize,
    /// The parent's ideal content size, per axis.
    pub parent_ideal_size: OptionalSize,
    /// Base for [`Dimension::Percent`].
    pub percent_reference: Size,
}

impl Default for LayoutConstraint {
    fn default() -> Self {
        Self {
            min_size: Size::ZERO,
            max_size: Size::new(f64::INFINITY, f64::INFINITY),
            self_ideal_size: OptionalSize::NONE,
            parent_ideal_size: OptionalSize::NONE,
            percent_reference: Size::ZERO,
        }
    }
}

impl LayoutConstraint {
    /// A constraint between `min` and `max`. If `min` exceeds `max` on an axis, `max` is raised.
    #[must_use]
    pub fn new(min: Size, max: Size) -> Self {
        let min = Size::new(sanitize(min.width), sanitize(min.height));
        let max = Size::new(
            sanitize_max(max.width).max(min.width),
            sanitize_max(max.height).max(min.height),
        );
        Self {
            min_size: min,
            max_size: max,
            percent_reference: finite_or_zero(max),
            ..Self::default()
        }
    }

    /// A constraint from zero up to `max`.
    #[must_use]
    pub fn loose(max: Size) -> Self {
        Self::new(Size::ZERO, max)
    }

    /// A constraint that admits exactly `size`.
    #[must_use]
    pub fn tight(size: Size) -> Self {
        Self {
            self_ideal_size: OptionalSize::from_size(size),
            ..Self::new(size, size)
        }
    }

    /// The constraint a root node's parent would hand down for a viewport of `size`.
    #[must_use]
    pub fn root(size: Size) -> Self {
        Self {
            self_ideal_size: OptionalSize::from_size(size),
            ..Self::loose(size)
        }
    }

    /// Clamps `size` into `[min_size, max_size]`. NaN components become the minimum.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            clamp_axis(size.width, self.min_size.width, self.max_size.width),
            clamp_axis(size.height, self.min_size.height, self.max_size.height),
        )
    }

    /// Resolves the final frame size from a computed content size.
    ///
    /// Ideal components win over content components; the result is clamped.
    #[must_use]
    pub fn resolve(&self, content: Size) -> Size {
        self.clamp(self.self_ideal_size.unwrap_or(content))
    }

    /// The ideal size if known on `axis`, else the maximum if finite.
    #[must_use]
    pub fn main_limit(&self, axis: Axis) -> Option<f64> {
        self.self_ideal_size
            .main(axis)
            .or_else(|| Some(axis.main(self.max_size)).filter(|v| v.is_finite()))
    }

    /// Shrinks the constraint by `insets`, producing the constraint for the content box.
    #[must_use]
    pub fn deflate(&self, insets: Insets) -> Self {
        let dw = insets.x_value().max(0.0);
        let dh = insets.y_value().max(0.0);
        let shrink = |v: f64, d: f64| (v - d).max(0.0);
        let ideal = OptionalSize {
            width: self.self_ideal_size.width.map(|w| shrink(w, dw)),
            height: self.self_ideal_size.height.map(|h| shrink(h, dh)),
        };
        let max = Size::new(shrink(self.max_size.width, dw), shrink(self.max_size.height, dh));
        let percent = |ideal: Option<f64>, max: f64, reference: f64, d: f64| {
            ideal.unwrap_or(if max.is_finite() { max } else { shrink(reference, d) })
        };
        Self {
            min_size: Size::new(shrink(self.min_size.width, dw), shrink(self.min_size.height, dh)),
            max_size: max,
            self_ideal_size: ideal,
            parent_ideal_size: self.parent_ideal_size,
            percent_reference: Size::new(
                percent(ideal.width, max.width, self.percent_reference.width, dw),
                percent(ideal.height, max.height, self.percent_reference.height, dh),
            ),
        }
    }

    /// Drops the minimum size, so children may be smaller than their container.
    #[must_use]
    pub fn loosened(&self) -> Self {
        Self {
            min_size: Size::ZERO,
            ..*self
        }
    }

    /// Removes the bound along `axis`, for content that scrolls on that axis.
    #[must_use]
    pub fn unbounded(&self, axis: Axis) -> Self {
        let mut out = *self;
        out.max_size = axis.with_main(out.max_size, f64::INFINITY);
        out.self_ideal_size.set_main(axis, None);
        out
    }

    /// Forces the size along `axis` to exactly `value`.
    #[must_use]
    pub fn tight_on(&self, axis: Axis, value: f64) -> Self {
        let value = sanitize(value);
        let mut out = *self;
        out.min_size = axis.with_main(out.min_size, value);
        out.max_size = axis.with_main(out.max_size, value);
        out.self_ideal_size.set_main(axis, Some(value));
        out
    }

    /// Derives a child's own constraint from this content constraint and the child's style.
    ///
    /// The child's margin is taken out of the bounds, the content ideal size becomes the
    /// child's parent ideal size, and the child's [`Dimension`]s produce its self ideal size.
    #[must_use]
    pub fn for_child(&self, style: &NodeStyle) -> Self {
        let outer = Self {
            self_ideal_size: OptionalSize::NONE,
            parent_ideal_size: self.self_ideal_size,
            ..*self
        };
        let margin = style.margin;
        let shrink = |v: f64, d: f64| (v - d.max(0.0)).max(0.0);
        let mut out = Self {
            min_size: Size::new(
                shrink(outer.min_size.width, margin.x_value()),
                shrink(outer.min_size.height, margin.y_value()),
            ),
            max_size: Size::new(
                shrink(outer.max_size.width, margin.x_value()),
                shrink(outer.max_size.height, margin.y_value()),
            ),
            ..outer
        };
        // A tight parent axis stays tight regardless of the child's own policy.
        let tight_w = self.self_ideal_size.width.is_some() && self.min_size.width >= self.max_size.width;
        let tight_h =
            self.self_ideal_size.height.is_some() && self.min_size.height >= self.max_size.height;
        out.self_ideal_size = OptionalSize {
            width: if tight_w {
                Some(out.max_size.width)
            } else {
                self.ideal_for(style.width, Axis::Horizontal, margin.x_value())
            },
            height: if tight_h {
                Some(out.max_size.height)
            } else {
                self.ideal_for(style.height, Axis::Vertical, margin.y_value())
            },
        };
        out.self_ideal_size = OptionalSize {
            width: out.self_ideal_size.width.map(|w| {
                clamp_axis(w, out.min_size.width, out.max_size.width)
            }),
            height: out.self_ideal_size.height.map(|h| {
                clamp_axis(h, out.min_size.height, out.max_size.height)
            }),
        };
        out
    }

    fn ideal_for(&self, dimension: Dimension, axis: Axis, margin: f64) -> Option<f64> {
        match dimension {
            Dimension::Auto => None,
            Dimension::Fixed(v) => Some(sanitize(v)),
            Dimension::Percent(p) => Some(sanitize(p * axis.main(self.percent_reference))),
            Dimension::MatchParent => self
                .self_ideal_size
                .main(axis)
                .or_else(|| Some(axis.main(self.max_size)).filter(|v| v.is_finite()))
                .map(|v| (v - margin.max(0.0)).max(0.0)),
        }
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.min(max).max(min)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn sanitize_max(value: f64) -> f64 {
    if value.is_nan() { f64::INFINITY } else { value.max(0.0) }
}

fn finite_or_zero(size: Size) -> Size {
    Size::new(
        if size.width.is_finite() { size.width } else { 0.0 },
        if size.height.is_finite() { size.height } else { 0.0 },
    )
}

#[cfg(test)]
mod tests {
    use super::LayoutConstraint;
    use crate::geometry::{Axis, OptionalSize};
    use crate::types::{Dimension, NodeStyle};
    use kurbo::{Insets, Size};

    #[test]
    fn new_normalizes_inverted_bounds() {
        let c = LayoutConstraint::new(Size::new(50.0, 10.0), Size::new(20.0, 30.0));
        assert_eq!(c.max_size, Size::new(50.0, 30.0));
        assert_eq!(c.resolve(Size::new(0.0, 100.0)), Size::new(50.0, 30.0));
    }

    #[test]
    fn ideal_size_wins_but_is_clamped() {
        let mut c = LayoutConstraint::loose(Size::new(100.0, 100.0));
        c.self_ideal_size = OptionalSize {
            width: Some(250.0),
            height: None,
        };
        assert_eq!(c.resolve(Size::new(10.0, 40.0)), Size::new(100.0, 40.0));
    }

    #[test]
    fn child_dimensions_produce_ideal_sizes() {
        let content = LayoutConstraint::root(Size::new(200.0, 100.0));
        let style = NodeStyle {
            width: Dimension::Percent(0.5),
            height: Dimension::MatchParent,
            ..NodeStyle::default()
        };
        let child = content.for_child(&style);
        assert_eq!(child.self_ideal_size.width, Some(100.0));
        assert_eq!(child.self_ideal_size.height, Some(100.0));
        assert_eq!(child.parent_ideal_size, content.self_ideal_size);

        let auto = content.for_child(&NodeStyle::default());
        assert_eq!(auto.self_ideal_size, OptionalSize::NONE);
    }

    #[test]
    fn fixed_size_is_clamped_to_parent_max() {
        let content = LayoutConstraint::loose(Size::new(50.0, 50.0));
        let child = content.for_child(&NodeStyle::fixed(80.0, 20.0));
        assert_eq!(child.resolve(Size::ZERO), Size::new(50.0, 20.0));
    }

    #[test]
    fn margin_is_taken_out_of_child_bounds() {
        let content = LayoutConstraint::root(Size::new(100.0, 100.0));
        let style = NodeStyle {
            width: Dimension::MatchParent,
            margin: Insets::uniform(10.0),
            ..NodeStyle::default()
        };
        let child = content.for_child(&style);
        assert_eq!(child.max_size, Size::new(80.0, 80.0));
        assert_eq!(child.self_ideal_size.width, Some(80.0));
    }

    #[test]
    fn deflate_subtracts_padding_and_sets_percent_reference() {
        let c = LayoutConstraint::root(Size::new(100.0, 60.0)).deflate(Insets::uniform(5.0));
        assert_eq!(c.max_size, Size::new(90.0, 50.0));
        assert_eq!(c.self_ideal_size.width, Some(90.0));
        assert_eq!(c.percent_reference, Size::new(90.0, 50.0));
    }

    #[test]
    fn unbounded_and_tight_axes() {
        let c = LayoutConstraint::root(Size::new(100.0, 60.0)).unbounded(Axis::Vertical);
        assert!(c.max_size.height.is_infinite());
        assert_eq!(c.main_limit(Axis::Vertical), None);
        let t = c.tight_on(Axis::Horizontal, 30.0);
        assert_eq!(t.resolve(Size::new(5.0, 5.0)), Size::new(30.0, 5.0));
    }
}
