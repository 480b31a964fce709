//! Bit-encoded container contents and the discrete transfer operator.
//!
//! A [Contents] is a 12-bit mask. Tea and coffee are one bit each; milk and
//! sugar have three graduated levels, water four:
//!
//! ```text
//! bit   0    1      2-4     5-7      8-11
//!       TEA  COFFEE MILK1-3 SUGAR1-3 WATER1-4
//! ```
//!
//! A substance's level is the number of its bits that are set. Levels are
//! written back as the lowest `level` bits of the substance's field.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Substance {
    Tea,
    Coffee,
    Milk,
    Sugar,
    Water,
}

impl Substance {
    /// Order in which [transfer_some] drains a source
    pub const TRANSFER_ORDER: [Substance; 5] = [
        Substance::Water,
        Substance::Coffee,
        Substance::Tea,
        Substance::Sugar,
        Substance::Milk,
    ];

    const fn shift(self) -> u16 {
        match self {
            Substance::Tea => 0,
            Substance::Coffee => 1,
            Substance::Milk => 2,
            Substance::Sugar => 5,
            Substance::Water => 8,
        }
    }

    /// Number of levels (bits) this substance occupies
    pub const fn capacity(self) -> u8 {
        match self {
            Substance::Tea | Substance::Coffee => 1,
            Substance::Milk | Substance::Sugar => 3,
            Substance::Water => 4,
        }
    }

    const fn mask(self) -> u16 {
        ((1 << self.capacity()) - 1) << self.shift()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Contents(u16);

impl Contents {
    pub const EMPTY: Contents = Contents(0);
    pub const MASK: u16 = 0x0fff;

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Builder form of [Contents::set_level]
    pub fn with(mut self, substance: Substance, level: u8) -> Self {
        self.set_level(substance, level);
        self
    }

    pub fn level(self, substance: Substance) -> u8 {
        (self.0 & substance.mask()).count_ones() as u8
    }

    /// Set a level, saturating at the substance's capacity
    pub fn set_level(&mut self, substance: Substance, level: u8) {
        let level = level.min(substance.capacity());
        let bits = ((1u16 << level) - 1) << substance.shift();
        self.0 = (self.0 & !substance.mask()) | bits;
    }

    pub fn water_level(self) -> u8 {
        self.level(Substance::Water)
    }

    pub fn milk_level(self) -> u8 {
        self.level(Substance::Milk)
    }

    pub fn sugar_level(self) -> u8 {
        self.level(Substance::Sugar)
    }

    pub fn has_tea(self) -> bool {
        self.level(Substance::Tea) > 0
    }

    pub fn has_coffee(self) -> bool {
        self.level(Substance::Coffee) > 0
    }

    pub fn has_water(self) -> bool {
        self.water_level() > 0
    }

    pub fn has_milk(self) -> bool {
        self.milk_level() > 0
    }

    pub fn has_sugar(self) -> bool {
        self.sugar_level() > 0
    }

    /// Total substance units held
    pub fn units(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty");
        }
        let mut parts = Vec::new();
        if self.has_water() {
            parts.push(format!("water {}", self.water_level()));
        }
        if self.has_coffee() {
            parts.push("coffee".to_string());
        }
        if self.has_tea() {
            parts.push("tea".to_string());
        }
        if self.has_sugar() {
            parts.push(format!("sugar {}", self.sugar_level()));
        }
        if self.has_milk() {
            parts.push(format!("milk {}", self.milk_level()));
        }
        f.write_str(&parts.join(", "))
    }
}

/// How many units one pour/scoop moves from a level of `level`: everything if
/// only one unit is left, otherwise at most three and never the last unit.
fn portion(level: u8) -> u8 {
    if level <= 1 {
        level
    } else {
        (level - 1).min(3)
    }
}

/// Move one portion of a single substance from `source` into `target`.
///
/// Water leaves first; coffee, tea, sugar and milk follow in that order once
/// the source holds no water. Whatever the target cannot hold is spilled, and
/// a `None` target consumes the portion. Returns whether the source changed.
pub fn transfer_some(source: &mut Contents, target: Option<&mut Contents>) -> bool {
    let Some(substance) = Substance::TRANSFER_ORDER
        .into_iter()
        .find(|s| source.level(*s) > 0)
    else {
        return false;
    };

    let level = source.level(substance);
    let moved = portion(level);
    source.set_level(substance, level - moved);
    if let Some(target) = target {
        let have = target.level(substance);
        target.set_level(substance, have.saturating_add(moved));
    }
    true
}

/// Repeat [transfer_some] until `source` is empty. Returns the number of calls.
pub fn transfer_all(source: &mut Contents, mut target: Option<&mut Contents>) -> usize {
    let mut calls = 0;
    while transfer_some(source, target.as_deref_mut()) {
        calls += 1;
    }
    calls
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_levels() {
        let c = Contents::EMPTY
            .with(Substance::Water, 4)
            .with(Substance::Sugar, 2)
            .with(Substance::Coffee, 1);
        assert_eq!(c.water_level(), 4);
        assert_eq!(c.sugar_level(), 2);
        assert_eq!(c.milk_level(), 0);
        assert!(c.has_coffee());
        assert!(!c.has_tea());
        assert_eq!(c.units(), 7);
        assert_eq!(c.bits(), 0b1111_0110_0010);
    }

    #[test]
    fn test_set_level_saturates() {
        let c = Contents::EMPTY.with(Substance::Milk, 9);
        assert_eq!(c.milk_level(), 3);
        assert_eq!(c.units(), 3);
    }

    #[test]
    fn test_water_drains_first() {
        let mut mug = Contents::EMPTY
            .with(Substance::Water, 4)
            .with(Substance::Coffee, 1);
        let mut out = Contents::EMPTY;
        assert!(transfer_some(&mut mug, Some(&mut out)));
        assert_eq!(mug.water_level(), 1);
        assert!(mug.has_coffee());
        assert_eq!(out.water_level(), 3);
        assert!(!out.has_coffee());

        assert!(transfer_some(&mut mug, Some(&mut out)));
        assert_eq!(mug.water_level(), 0);
        assert_eq!(out.water_level(), 4);

        assert!(transfer_some(&mut mug, Some(&mut out)));
        assert!(mug.is_empty());
        assert!(out.has_coffee());
    }

    #[test]
    fn test_portion_never_empties_multi_unit_source() {
        for level in 2..=4 {
            let mut src = Contents::EMPTY.with(Substance::Water, level);
            transfer_some(&mut src, None);
            assert!(src.has_water(), "level {level} emptied in one call");
        }
        let mut src = Contents::EMPTY.with(Substance::Sugar, 1);
        transfer_some(&mut src, None);
        assert!(src.is_empty());
    }

    #[test]
    fn test_transfer_order_after_water() {
        let mut src = Contents::EMPTY
            .with(Substance::Milk, 2)
            .with(Substance::Sugar, 2)
            .with(Substance::Tea, 1);
        let mut dst = Contents::EMPTY;
        transfer_some(&mut src, Some(&mut dst));
        assert!(dst.has_tea() && dst.sugar_level() == 0);
        transfer_some(&mut src, Some(&mut dst));
        assert_eq!(dst.sugar_level(), 1);
        assert_eq!(dst.milk_level(), 0);
    }

    #[test]
    fn test_empty_source_moves_nothing() {
        let mut src = Contents::EMPTY;
        let mut dst = Contents::EMPTY.with(Substance::Water, 2);
        assert!(!transfer_some(&mut src, Some(&mut dst)));
        assert_eq!(dst.water_level(), 2);
    }

    #[test]
    fn test_transfer_conserves_units() {
        for src_bits in 0..=Contents::MASK {
            for dst_bits in 0..=Contents::MASK {
                let mut src = Contents::from_bits(src_bits);
                let mut dst = Contents::from_bits(dst_bits);
                let before = src.units() + dst.units();
                let moved = transfer_some(&mut src, Some(&mut dst));
                assert!(src.units() + dst.units() <= before);
                assert_eq!(moved, src_bits != 0);
                if moved {
                    assert!(src.units() < Contents::from_bits(src_bits).units());
                }
            }
        }
    }

    #[test]
    fn test_transfer_all_terminates() {
        for src_bits in 0..=Contents::MASK {
            let mut src = Contents::from_bits(src_bits);
            let mut dst = Contents::EMPTY;
            let calls = transfer_all(&mut src, Some(&mut dst));
            assert!(src.is_empty());
            assert!(calls <= 12);
            assert_eq!(dst.units(), Contents::from_bits(src_bits).units());
        }
    }
}
