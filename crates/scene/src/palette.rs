//! Marker accent colors.

use catalog::EventType;

/// 0xRRGGBB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Accent(pub u32);

impl Accent {
    pub fn rgb(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0)
    }
}

/// Neutral gray for anything without its own identity.
pub const NEUTRAL_ACCENT: Accent = Accent(0x6b7280);
pub const SELECTED_ACCENT: Accent = Accent(0xffcc00);

/// Accent for an event kind. Total over `EventType`; the compiler rejects a
/// new variant without a color.
pub fn accent_for(ty: EventType) -> Accent {
    match ty {
        EventType::Battles => Accent(0xdc2626),
        EventType::Attacks => Accent(0xea580c),
        EventType::Agreements => Accent(0x2563eb),
        EventType::Conferences => Accent(0x7c3aed),
        EventType::Declarations => Accent(0x0891b2),
        EventType::Invasions => Accent(0xca8a04),
        EventType::Developments => Accent(0x16a34a),
        EventType::Assassinations => Accent(0xbe123c),
        EventType::Mutinies => Accent(0xdb2777),
        EventType::Operations => Accent(0x0d9488),
        EventType::Surrender | EventType::Surrenders => Accent(0x4b5563),
        EventType::Threats => Accent(0xd97706),
        EventType::Trials => Accent(0x0284c7),
        EventType::Uprisings => Accent(0xbe185d),
        EventType::Unclassified => NEUTRAL_ACCENT,
    }
}

#[cfg(test)]
mod tests {
    use super::{Accent, NEUTRAL_ACCENT, SELECTED_ACCENT, accent_for};
    use catalog::EventType;
    use std::collections::HashSet;

    #[test]
    fn every_known_type_has_a_non_neutral_accent() {
        for ty in EventType::KNOWN {
            assert_ne!(accent_for(ty), NEUTRAL_ACCENT, "{ty}");
            assert_ne!(accent_for(ty), SELECTED_ACCENT, "{ty}");
        }
        assert_eq!(accent_for(EventType::Unclassified), NEUTRAL_ACCENT);
    }

    #[test]
    fn accents_are_distinct_except_surrender_spellings() {
        let distinct: HashSet<Accent> = EventType::KNOWN.into_iter().map(accent_for).collect();
        assert_eq!(distinct.len(), EventType::KNOWN.len() - 1);
        assert_eq!(accent_for(EventType::Surrender), accent_for(EventType::Surrenders));
    }

    #[test]
    fn hex_and_rgb() {
        assert_eq!(Accent(0xdc2626).to_hex(), "#dc2626");
        assert_eq!(Accent(0x0284c7).rgb(), [0x02, 0x84, 0xc7]);
    }
}
