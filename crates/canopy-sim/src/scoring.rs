use crate::entities::{AnimalKind, TreasureTier};

/// Points for collecting a treasure of the given tier.
///
/// Scoring: money bag = 2000, silver bar = 3000, gold bar = 4000, diamond ring = 5000.
pub fn treasure_value(tier: TreasureTier) -> u64 {
    match tier {
        TreasureTier::MoneyBag => 2000,
        TreasureTier::SilverBar => 3000,
        TreasureTier::GoldBar => 4000,
        TreasureTier::DiamondRing => 5000,
    }
}

/// Points for defeating an animal. Animals that cannot be hurt award nothing.
pub fn defeat_points(kind: AnimalKind) -> u64 {
    match kind {
        AnimalKind::Snake => 300,
        AnimalKind::Frog => 0,
        AnimalKind::Panther => 800,
        AnimalKind::Scorpion => 500,
        AnimalKind::Bat => 400,
    }
}
