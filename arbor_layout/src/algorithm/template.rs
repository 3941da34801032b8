// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column and row templates: parsing and track resolution.

use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;
use thiserror::Error;

/// Resolved track sizes. Most templates have only a handful of tracks.
pub type TrackSizes = SmallVec<[f64; 8]>;

/// Upper bound on the number of tracks a template may expand to.
pub const MAX_TRACKS: usize = 4096;

/// One track of a template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Track {
    /// A fixed length in logical pixels.
    Fixed(f64),
    /// A share of the space left after fixed tracks and gaps. `auto` parses as `Fr(1.0)`.
    Fr(f64),
}

/// Error from parsing a [`GridTemplate`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template has no tracks.
    #[error("template has no tracks")]
    Empty,
    /// A token is not a length, an `fr` value, or `auto`.
    #[error("invalid track `{0}`")]
    InvalidTrack(String),
    /// A `repeat(..)` is malformed or expands past [`MAX_TRACKS`].
    #[error("invalid repeat `{0}`")]
    InvalidRepeat(String),
}

/// A list of tracks, parsed from text such as `"100px 1fr auto repeat(2, 2fr)"`.
///
/// Accepted tokens are `<n>px`, a bare `<n>` (pixels), `<n>fr`, `auto`, and
/// `repeat(<count>, <tracks>)`.
///
/// ```rust
/// use arbor_layout::{GridTemplate, Track};
///
/// let template: GridTemplate = "50px repeat(2, 1fr)".parse().unwrap();
/// assert_eq!(template.tracks(), [Track::Fixed(50.0), Track::Fr(1.0), Track::Fr(1.0)]);
/// assert_eq!(template.resolve(250.0, 10.0).as_slice(), [50.0, 90.0, 90.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GridTemplate {
    tracks: Vec<Track>,
}

impl Default for GridTemplate {
    fn default() -> Self {
        Self::uniform(1)
    }
}

impl GridTemplate {
    /// `count` equal `1fr` tracks. Zero is treated as one.
    #[must_use]
    pub fn uniform(count: usize) -> Self {
        Self {
            tracks: vec![Track::Fr(1.0); count.max(1)],
        }
    }

    /// A template from explicit tracks. An empty list becomes a single `1fr` track.
    #[must_use]
    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        if tracks.is_empty() {
            return Self::default();
        }
        Self { tracks }
    }

    /// Parses `text`, falling back to a single `1fr` track when it is invalid.
    #[must_use]
    pub fn parse_or_default(text: &str) -> Self {
        match text.parse() {
            Ok(template) => template,
            Err(error) => {
                tracing::warn!(%error, text, "invalid grid template, using 1fr");
                Self::default()
            }
        }
    }

    /// The tracks in order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns `true` if there are no tracks. Never the case for a constructed template.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Resolves track sizes against `available` space with `gap` between tracks.
    ///
    /// Fixed tracks keep their size. What remains after fixed tracks and gaps is split between
    /// `fr` tracks in proportion to their factors. With unbounded or insufficient space, `fr`
    /// tracks resolve to zero.
    #[must_use]
    pub fn resolve(&self, available: f64, gap: f64) -> TrackSizes {
        let gap = gap.max(0.0);
        let gaps = gap * self.tracks.len().saturating_sub(1) as f64;
        let mut fixed = 0.0;
        let mut fr_total = 0.0;
        for track in &self.tracks {
            match *track {
                Track::Fixed(v) => fixed += v,
                Track::Fr(f) => fr_total += f,
            }
        }
        let remaining = if available.is_finite() {
            (available - fixed - gaps).max(0.0)
        } else {
            0.0
        };
        let unit = if fr_total > 0.0 {
            remaining / fr_total
        } else {
            0.0
        };
        self.tracks
            .iter()
            .map(|track| match *track {
                Track::Fixed(v) => v,
                Track::Fr(f) => f * unit,
            })
            .collect()
    }
}

/// Start offset of each track given resolved `sizes` and `gap`.
pub(crate) fn track_offsets(sizes: &[f64], gap: f64) -> TrackSizes {
    let mut out = TrackSizes::with_capacity(sizes.len());
    let mut pos = 0.0;
    for size in sizes {
        out.push(pos);
        pos += size + gap.max(0.0);
    }
    out
}

/// Total length of resolved `sizes` with `gap` between them.
pub(crate) fn track_total(sizes: &[f64], gap: f64) -> f64 {
    sizes.iter().sum::<f64>() + gap.max(0.0) * sizes.len().saturating_sub(1) as f64
}

impl FromStr for GridTemplate {
    type Err = TemplateError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tracks = Vec::new();
        parse_tracks(text, &mut tracks)?;
        if tracks.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(Self { tracks })
    }
}

impl fmt::Display for GridTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, track) in self.tracks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match track {
                Track::Fixed(v) => write!(f, "{v}px")?,
                Track::Fr(v) => write!(f, "{v}fr")?,
            }
        }
        Ok(())
    }
}

fn parse_tracks(text: &str, out: &mut Vec<Track>) -> Result<(), TemplateError> {
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix("repeat(") {
            let close = body
                .find(')')
                .ok_or_else(|| TemplateError::InvalidRepeat(rest.to_owned()))?;
            parse_repeat(&body[..close], out)?;
            rest = body[close + 1..].trim_start();
            continue;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if out.len() >= MAX_TRACKS {
            return Err(TemplateError::InvalidTrack(rest[..end].to_owned()));
        }
        out.push(parse_track(&rest[..end])?);
        rest = rest[end..].trim_start();
    }
    Ok(())
}

fn parse_repeat(body: &str, out: &mut Vec<Track>) -> Result<(), TemplateError> {
    let invalid = || TemplateError::InvalidRepeat(format!("repeat({body})"));
    let (count, tracks) = body.split_once(',').ok_or_else(invalid)?;
    let count: usize = count.trim().parse().map_err(|_| invalid())?;
    let mut inner = Vec::new();
    parse_tracks(tracks, &mut inner)?;
    if count == 0 || inner.is_empty() {
        return Err(invalid());
    }
    let total = count
        .checked_mul(inner.len())
        .and_then(|n| n.checked_add(out.len()))
        .ok_or_else(invalid)?;
    if total > MAX_TRACKS {
        return Err(invalid());
    }
    out.reserve(total - out.len());
    for _ in 0..count {
        out.extend_from_slice(&inner);
    }
    Ok(())
}

fn parse_track(token: &str) -> Result<Track, TemplateError> {
    let invalid = || TemplateError::InvalidTrack(token.to_owned());
    if token.eq_ignore_ascii_case("auto") {
        return Ok(Track::Fr(1.0));
    }
    let (number, fr) = match token.strip_suffix("fr") {
        Some(number) => (number, true),
        None => (token.strip_suffix("px").unwrap_or(token), false),
    };
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(if fr { Track::Fr(value) } else { Track::Fixed(value) })
}
