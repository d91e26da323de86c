//! Colors and color sets.

/// A single color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    fn bit(self) -> u8 {
        match self {
            Color::White => 1 << 0,
            Color::Blue => 1 << 1,
            Color::Black => 1 << 2,
            Color::Red => 1 << 3,
            Color::Green => 1 << 4,
        }
    }
}

/// A set of colors, packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSet(u8);

impl ColorSet {
    /// The empty (colorless) set.
    pub fn colorless() -> Self {
        Self(0)
    }

    /// A set containing a single color.
    pub fn of(color: Color) -> Self {
        Self(color.bit())
    }

    /// A set from a list of colors.
    pub fn from_colors(colors: &[Color]) -> Self {
        Self(colors.iter().fold(0, |acc, c| acc | c.bit()))
    }

    pub fn contains(self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    pub fn is_colorless(self) -> bool {
        self.0 == 0
    }

    /// Union of two sets.
    pub fn union(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    /// Colors in this set but not the other.
    pub fn difference(self, other: ColorSet) -> ColorSet {
        ColorSet(self.0 & !other.0)
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_contains() {
        let azorius = ColorSet::of(Color::White).union(ColorSet::of(Color::Blue));
        assert!(azorius.contains(Color::White));
        assert!(azorius.contains(Color::Blue));
        assert!(!azorius.contains(Color::Red));
        assert_eq!(azorius.count(), 2);
    }

    #[test]
    fn test_colorless() {
        assert!(ColorSet::colorless().is_colorless());
        assert!(!ColorSet::of(Color::Green).is_colorless());
    }
}
