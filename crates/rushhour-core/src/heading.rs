//! Cardinal headings for grid-aligned movement.

use std::fmt;

use cobble::HeadingExt;
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One of the four grid directions.
///
/// Screen convention: `Up` is `-y`, `Down` is `+y`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Toward `-y`
    Up,
    /// Toward `+x`
    Right,
    /// Toward `+y`
    Down,
    /// Toward `-x`
    Left,
}

impl Heading {
    /// All headings in clockwise order starting from `Up`.
    pub const ALL: [Heading; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Unit vector for this heading.
    #[must_use]
    pub const fn unit(self) -> IVec2 {
        match self {
            Self::Up => IVec2::new(0, -1),
            Self::Right => IVec2::new(1, 0),
            Self::Down => IVec2::new(0, 1),
            Self::Left => IVec2::new(-1, 0),
        }
    }

    /// Heading of a movement vector, by its dominant axis.
    ///
    /// Returns `None` for the zero vector. Ties go to the horizontal axis.
    #[must_use]
    pub fn of(v: IVec2) -> Option<Self> {
        if v.is_zero() {
            None
        } else if v.x.abs() >= v.y.abs() {
            Some(if v.x > 0 { Self::Right } else { Self::Left })
        } else {
            Some(if v.y > 0 { Self::Down } else { Self::Up })
        }
    }

    /// Rotate 90° clockwise.
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
        }
    }

    /// Rotate 90° counter-clockwise.
    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        match self {
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
            Self::Right => Self::Up,
        }
    }

    /// The reverse heading.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.rotated_cw().rotated_cw()
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Right => write!(f, "right"),
            Self::Down => write!(f, "down"),
            Self::Left => write!(f, "left"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_vectors_match_vector_rotation() {
        for heading in Heading::ALL {
            assert_eq!(heading.rotated_cw().unit(), heading.unit().rotated_cw());
            assert_eq!(heading.rotated_ccw().unit(), heading.unit().rotated_ccw());
        }
    }

    #[test]
    fn of_uses_dominant_axis() {
        assert_eq!(Heading::of(IVec2::new(0, 2)), Some(Heading::Down));
        assert_eq!(Heading::of(IVec2::new(-3, 1)), Some(Heading::Left));
        assert_eq!(Heading::of(IVec2::new(2, -2)), Some(Heading::Right));
        assert_eq!(Heading::of(IVec2::ZERO), None);
    }

    #[test]
    fn of_inverts_scaled_unit() {
        for heading in Heading::ALL {
            assert_eq!(Heading::of(heading.unit() * 5), Some(heading));
        }
    }

    #[test]
    fn opposite_and_display() {
        assert_eq!(Heading::Up.opposite(), Heading::Down);
        assert_eq!(Heading::Left.opposite(), Heading::Right);
        assert_eq!(Heading::Down.to_string(), "down");
    }
}
