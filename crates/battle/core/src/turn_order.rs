//! Per-round action order.

use crate::buff;
use crate::env::RandomSource;
use crate::state::{Roster, StatKind, UnitId};

/// Units sorted by effective speed for one round.
///
/// `order` lists every unit (defeated ones included, for display); `active`
/// keeps only the units alive when the order was computed. Neither changes
/// until the next [`TurnOrder::compute`], even if speeds change mid-round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnOrder {
    order: Vec<UnitId>,
    active: Vec<UnitId>,
}

impl TurnOrder {
    /// Sorts by effective speed descending; ties are broken by a random key
    /// drawn per unit.
    pub fn compute(roster: &Roster, rng: &mut dyn RandomSource) -> Self {
        let mut entries: Vec<(f64, u32, &UnitId, bool)> = roster
            .iter()
            .map(|unit| {
                (
                    buff::effective_stat(unit, StatKind::Speed),
                    rng.next_u32(),
                    &unit.id,
                    unit.is_alive(),
                )
            })
            .collect();
        entries.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        let order: Vec<UnitId> = entries.iter().map(|(_, _, id, _)| (*id).clone()).collect();
        let active = entries
            .iter()
            .filter(|(_, _, _, alive)| *alive)
            .map(|(_, _, id, _)| (*id).clone())
            .collect();
        Self { order, active }
    }

    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    pub fn active(&self) -> &[UnitId] {
        &self.active
    }

    pub fn is_active(&self, unit: &UnitId) -> bool {
        self.active.contains(unit)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::apply_buff;
    use crate::env::{BuffDefinition, PcgRng};
    use crate::state::{BattleSetup, EffectType, Stats, UnitSpec};

    fn with_speed(speed: u32) -> UnitSpec {
        UnitSpec::new(
            "Unit",
            Stats {
                speed,
                ..Stats::default()
            },
        )
    }

    fn roster() -> Roster {
        Roster::from_setup(
            BattleSetup::new()
                .player("fast", with_speed(30))
                .player("slow", with_speed(5))
                .enemy("mid", with_speed(15)),
        )
        .unwrap()
    }

    fn ids(list: &[&str]) -> Vec<UnitId> {
        list.iter().map(|s| UnitId::new(*s)).collect()
    }

    #[test]
    fn sorts_by_speed_descending() {
        let order = TurnOrder::compute(&roster(), &mut PcgRng::seeded(1));
        assert_eq!(order.order(), ids(&["fast", "mid", "slow"]).as_slice());
    }

    #[test]
    fn defeated_units_stay_in_display_only() {
        let mut r = roster();
        r.get_mut(&UnitId::new("mid")).unwrap().set_hp(0);
        let order = TurnOrder::compute(&r, &mut PcgRng::seeded(1));
        assert_eq!(order.order().len(), 3);
        assert_eq!(order.active(), ids(&["fast", "slow"]).as_slice());
    }

    #[test]
    fn speed_buffs_reorder() {
        let mut r = roster();
        let haste = BuffDefinition::new(
            "haste",
            "Haste",
            EffectType::StatBoost(StatKind::Speed),
            2,
            3.0,
        );
        apply_buff(
            r.get_mut(&UnitId::new("slow")).unwrap(),
            &haste,
            &UnitId::new("slow"),
            1,
            None,
        );
        let order = TurnOrder::compute(&r, &mut PcgRng::seeded(1));
        assert_eq!(order.order()[0], UnitId::new("fast"));
        assert_eq!(order.order()[1], UnitId::new("slow"));
    }

    #[test]
    fn ties_are_seed_deterministic() {
        let r = Roster::from_setup(
            BattleSetup::new()
                .player("a", with_speed(10))
                .player("b", with_speed(10))
                .enemy("c", with_speed(10)),
        )
        .unwrap();
        let first = TurnOrder::compute(&r, &mut PcgRng::seeded(77));
        let second = TurnOrder::compute(&r, &mut PcgRng::seeded(77));
        assert_eq!(first, second);
    }
}
