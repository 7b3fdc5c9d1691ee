//! Frame selection policies.
//!
//! A [`FramePolicy`] decides which frame of an animation stands in for the
//! whole asset. The choice is a heuristic: nothing checks that the chosen
//! frame is visually representative.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::ThumbnailError;

/// Which frame of a GIF to turn into the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePolicy {
    /// Always frame 0.
    #[default]
    First,
    /// Frame `floor(frame_count / 2)`.
    Middle,
    /// A specific frame index. Animations too short to contain it fall back
    /// to frame 0.
    Fixed(usize),
}

impl FramePolicy {
    /// Resolve the frame index for an animation with `frame_count` frames.
    ///
    /// Returns `None` only when `frame_count` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use stillframe::FramePolicy;
    ///
    /// assert_eq!(FramePolicy::First.select_index(5), Some(0));
    /// assert_eq!(FramePolicy::Middle.select_index(5), Some(2));
    /// assert_eq!(FramePolicy::Middle.select_index(4), Some(2));
    /// assert_eq!(FramePolicy::Fixed(10).select_index(4), Some(0));
    /// assert_eq!(FramePolicy::Middle.select_index(0), None);
    /// ```
    pub fn select_index(self, frame_count: usize) -> Option<usize> {
        if frame_count == 0 {
            return None;
        }
        let index = match self {
            FramePolicy::First => 0,
            FramePolicy::Middle => frame_count / 2,
            FramePolicy::Fixed(index) if index < frame_count => index,
            FramePolicy::Fixed(_) => 0,
        };
        Some(index)
    }

    /// `true` if the policy can be resolved without knowing the frame count.
    pub(crate) fn needs_frame_count(self) -> bool {
        !matches!(self, FramePolicy::First)
    }
}

impl Display for FramePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FramePolicy::First => f.write_str("first"),
            FramePolicy::Middle => f.write_str("middle"),
            FramePolicy::Fixed(index) => write!(f, "{index}"),
        }
    }
}

impl FromStr for FramePolicy {
    type Err = ThumbnailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "first" | "start" => Ok(FramePolicy::First),
            "middle" | "mid" => Ok(FramePolicy::Middle),
            other => other
                .parse::<usize>()
                .map(FramePolicy::Fixed)
                .map_err(|_| ThumbnailError::InvalidPolicy(trimmed.to_string())),
        }
    }
}
