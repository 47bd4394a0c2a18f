use crate::state::{BattleUnit, ControlFlags, EffectType, Roster, StatKind, UnitId};

fn sum_magnitude(unit: &BattleUnit, matches: impl Fn(EffectType) -> bool) -> f64 {
    unit.status_effects
        .active()
        .filter(|e| matches(e.effect_type))
        .map(|e| e.magnitude())
        .sum()
}

fn product_of(unit: &BattleUnit, matches: impl Fn(EffectType) -> bool) -> f64 {
    unit.status_effects
        .active()
        .filter(|e| matches(e.effect_type))
        .map(|e| (1.0 + e.magnitude()).max(0.0))
        .product()
}

/// Stat value after stat-boost effects: `base × (1 + Σ magnitude)`, floored at 0.
pub fn effective_stat(unit: &BattleUnit, stat: StatKind) -> f64 {
    let bonus = sum_magnitude(unit, |t| t == EffectType::StatBoost(stat));
    (unit.stats.get(stat) * (1.0 + bonus)).max(0.0)
}

/// Multiplier on damage the unit deals.
pub fn outgoing_damage_multiplier(unit: &BattleUnit) -> f64 {
    product_of(unit, |t| t == EffectType::DamageBoost)
}

/// Multiplier on damage the unit receives, before the defend stance.
///
/// Freeze-vulnerability only counts while the unit is frozen.
pub fn incoming_damage_multiplier(unit: &BattleUnit) -> f64 {
    let frozen = unit.status_effects.control_flags().contains(ControlFlags::FROZEN);
    product_of(unit, |t| {
        t == EffectType::Vulnerability || (frozen && t == EffectType::FreezeVulnerability)
    })
}

/// Flat damage reduction granted by effects (on top of the stat).
pub fn flat_reduction_bonus(unit: &BattleUnit) -> f64 {
    sum_magnitude(unit, |t| t == EffectType::FlatReduction).max(0.0)
}

/// Multiplier on healing the unit receives.
pub fn heal_bonus(unit: &BattleUnit) -> f64 {
    (1.0 + sum_magnitude(unit, |t| t == EffectType::HealBonus)).max(0.0)
}

/// Fraction of damage taken that is returned to the attacker.
pub fn reflect_ratio(unit: &BattleUnit) -> f64 {
    sum_magnitude(unit, |t| t == EffectType::ReflectDamage).max(0.0)
}

/// False when the unit is defeated, stunned, frozen or asleep.
pub fn can_unit_act(unit: &BattleUnit) -> bool {
    unit.is_alive()
        && !unit
            .status_effects
            .control_flags()
            .intersects(ControlFlags::INCAPACITATED)
}

/// Like [`can_unit_act`], additionally false while silenced.
pub fn can_unit_use_skill(unit: &BattleUnit) -> bool {
    can_unit_act(unit)
        && !unit
            .status_effects
            .control_flags()
            .contains(ControlFlags::SILENCED)
}

/// Whether `actor` may pick `target`.
///
/// Untargetable units refuse everyone but themselves. Invisible units refuse
/// opponents unless the opponent has true sight.
pub fn can_unit_be_targeted(target: &BattleUnit, actor: &BattleUnit) -> bool {
    if target.is_defeated() {
        return false;
    }
    if target.id == actor.id {
        return true;
    }
    let flags = target.status_effects.control_flags();
    if flags.contains(ControlFlags::UNTARGETABLE) {
        return false;
    }
    if flags.contains(ControlFlags::INVISIBLE) && target.team() != actor.team() {
        return actor
            .status_effects
            .control_flags()
            .contains(ControlFlags::TRUE_SIGHT);
    }
    true
}

/// The unit a taunt forces `actor` to attack, while that unit is alive.
pub fn forced_target(actor: &BattleUnit, roster: &Roster) -> Option<UnitId> {
    actor
        .status_effects
        .active()
        .filter(|e| e.effect_type == EffectType::Taunt)
        .map(|e| &e.source_unit_id)
        .find(|source| {
            roster
                .get(source)
                .is_some_and(|u| u.is_alive() && u.team() != actor.team())
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::apply_buff;
    use crate::env::BuffDefinition;
    use crate::state::{BattleSetup, Stats, UnitSpec};

    fn roster() -> Roster {
        Roster::from_setup(
            BattleSetup::new()
                .player("p1", UnitSpec::new("Knight", Stats::default()))
                .enemy("e1", UnitSpec::new("Orc", Stats::default()))
                .enemy("e2", UnitSpec::new("Goblin", Stats::default())),
        )
        .unwrap()
    }

    fn put(roster: &mut Roster, unit: &str, def: &BuffDefinition, source: &str) {
        apply_buff(
            roster.get_mut(&UnitId::new(unit)).unwrap(),
            def,
            &UnitId::new(source),
            1,
            None,
        );
    }

    #[test]
    fn stun_blocks_acting() {
        let mut r = roster();
        let stun = BuffDefinition::new("stun", "Stun", EffectType::Stun, 1, 0.0).debuff();
        put(&mut r, "p1", &stun, "e1");
        assert!(!can_unit_act(r.get(&UnitId::new("p1")).unwrap()));
    }

    #[test]
    fn silence_blocks_skills_only() {
        let mut r = roster();
        let silence = BuffDefinition::new("silence", "Silence", EffectType::Silence, 1, 0.0);
        put(&mut r, "p1", &silence, "e1");
        let p1 = r.get(&UnitId::new("p1")).unwrap();
        assert!(can_unit_act(p1));
        assert!(!can_unit_use_skill(p1));
    }

    #[test]
    fn invisibility_yields_to_true_sight() {
        let mut r = roster();
        let invis = BuffDefinition::new("invis", "Vanish", EffectType::Invisible, 2, 0.0);
        put(&mut r, "e1", &invis, "e1");
        let e1 = r.get(&UnitId::new("e1")).unwrap().clone();
        assert!(!can_unit_be_targeted(&e1, r.get(&UnitId::new("p1")).unwrap()));
        assert!(can_unit_be_targeted(&e1, r.get(&UnitId::new("e2")).unwrap()));

        let sight = BuffDefinition::new("sight", "Eagle Eye", EffectType::TrueSight, 2, 0.0);
        put(&mut r, "p1", &sight, "p1");
        assert!(can_unit_be_targeted(&e1, r.get(&UnitId::new("p1")).unwrap()));
    }

    #[test]
    fn taunt_forces_target_while_source_lives() {
        let mut r = roster();
        let taunt = BuffDefinition::new("taunt", "Provoke", EffectType::Taunt, 2, 0.0).debuff();
        put(&mut r, "p1", &taunt, "e2");
        assert_eq!(
            forced_target(r.get(&UnitId::new("p1")).unwrap(), &r),
            Some(UnitId::new("e2"))
        );

        r.get_mut(&UnitId::new("e2")).unwrap().set_hp(0);
        assert_eq!(forced_target(r.get(&UnitId::new("p1")).unwrap(), &r), None);
    }

    #[test]
    fn stat_boosts_scale_base_value() {
        let mut r = roster();
        let haste = BuffDefinition::new(
            "haste",
            "Haste",
            EffectType::StatBoost(StatKind::Speed),
            2,
            0.5,
        );
        put(&mut r, "p1", &haste, "p1");
        let p1 = r.get(&UnitId::new("p1")).unwrap();
        assert!((effective_stat(p1, StatKind::Speed) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn freeze_vulnerability_needs_freeze() {
        let mut r = roster();
        let brittle =
            BuffDefinition::new("brittle", "Brittle", EffectType::FreezeVulnerability, 2, 0.5);
        put(&mut r, "e1", &brittle, "p1");
        assert_eq!(incoming_damage_multiplier(r.get(&UnitId::new("e1")).unwrap()), 1.0);

        let freeze = BuffDefinition::new("freeze", "Freeze", EffectType::Freeze, 1, 0.0);
        put(&mut r, "e1", &freeze, "p1");
        assert_eq!(incoming_damage_multiplier(r.get(&UnitId::new("e1")).unwrap()), 1.5);
    }
}
