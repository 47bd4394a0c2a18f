//! Hit application: accuracy, shields, HP loss, reflect and wake-up.

use crate::buff;
use crate::env::{CombatTables, RandomSource};
use crate::state::{BattleUnit, BuffId, EffectType, HitRecord, Roster, StatKind, UnitId};

use super::{CombatError, DamageInput, DamageType, calculate_damage};

/// Chance that `attacker` lands a hit on `defender`.
///
/// `hit_rate − dodge_rate`, clamped to `[min_hit_chance, 1]`.
pub fn hit_chance(attacker: &BattleUnit, defender: &BattleUnit, tables: &CombatTables) -> f64 {
    let accuracy = buff::effective_stat(attacker, StatKind::HitRate);
    let dodge = buff::effective_stat(defender, StatKind::DodgeRate);
    (accuracy - dodge).clamp(tables.min_hit_chance.clamp(0.0, 1.0), 1.0)
}

/// How a unit absorbed an amount of incoming damage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageTaken {
    pub hp_lost: u32,
    pub absorbed: u32,
    /// Shields emptied (and removed) by this damage.
    pub shields_broken: Vec<BuffId>,
    /// Sleep effects broken because HP was lost.
    pub woke_from: Vec<BuffId>,
    pub defeated: bool,
}

/// Routes `amount` through the unit's shields, then into HP.
///
/// Shields are drained smallest pool first; emptied shields are removed.
/// Losing any HP breaks sleep.
pub fn take_damage(unit: &mut BattleUnit, amount: u32) -> DamageTaken {
    let mut taken = DamageTaken::default();
    if unit.is_defeated() {
        return taken;
    }

    let mut remaining = amount;
    let mut pools: Vec<(BuffId, u32)> = unit
        .status_effects
        .active()
        .filter(|e| e.effect_type == EffectType::Shield && e.shield_remaining > 0)
        .map(|e| (e.buff_id.clone(), e.shield_remaining))
        .collect();
    pools.sort_by_key(|(_, pool)| *pool);

    for (buff_id, pool) in pools {
        if remaining == 0 {
            break;
        }
        let soaked = remaining.min(pool);
        remaining -= soaked;
        taken.absorbed += soaked;
        if let Some(effect) = unit.status_effects.get_mut(&buff_id) {
            effect.shield_remaining -= soaked;
            if effect.shield_remaining == 0 {
                taken.shields_broken.push(buff_id);
            }
        }
    }
    for buff_id in &taken.shields_broken {
        unit.status_effects.remove(buff_id);
    }

    taken.hp_lost = unit.lose_hp(remaining);
    if taken.hp_lost > 0 {
        taken.woke_from = buff::break_sleep(unit);
    }
    taken.defeated = unit.is_defeated();
    taken
}

/// Everything produced by one strike.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrikeResult {
    pub hit: HitRecord,
    /// Retaliation against the attacker from a reflect-damage effect.
    pub reflected: Option<HitRecord>,
    pub removed_buffs: Vec<(UnitId, BuffId)>,
}

/// Resolves one damaging strike from `attacker` to `defender` inside `roster`.
///
/// Order: accuracy roll, damage roll, shields, HP, reflect, defeat checks.
pub fn strike(
    roster: &mut Roster,
    attacker_id: &UnitId,
    defender_id: &UnitId,
    damage_type: DamageType,
    power: f64,
    tables: &CombatTables,
    rng: &mut (impl RandomSource + ?Sized),
) -> Result<StrikeResult, CombatError> {
    let attacker = roster
        .get(attacker_id)
        .ok_or_else(|| CombatError::UnitNotFound(attacker_id.clone()))?;
    let defender = roster
        .get(defender_id)
        .ok_or_else(|| CombatError::UnitNotFound(defender_id.clone()))?;

    let mut hit = HitRecord {
        source: attacker_id.clone(),
        target: defender_id.clone(),
        damage: 0,
        absorbed: 0,
        critical: false,
        missed: false,
        reflected: false,
        target_defeated: defender.is_defeated(),
    };

    if !rng.chance(hit_chance(attacker, defender, tables)) {
        hit.missed = true;
        return Ok(StrikeResult {
            hit,
            reflected: None,
            removed_buffs: Vec::new(),
        });
    }

    let input = DamageInput::between(attacker, defender, damage_type, power, tables);
    let roll = calculate_damage(&input, rng);
    let reflect_ratio = buff::reflect_ratio(defender);

    let defender = roster
        .get_mut(defender_id)
        .ok_or_else(|| CombatError::UnitNotFound(defender_id.clone()))?;
    let taken = take_damage(defender, roll.amount);
    hit.damage = taken.hp_lost;
    hit.absorbed = taken.absorbed;
    hit.critical = roll.critical;
    hit.target_defeated = taken.defeated;

    let mut removed_buffs: Vec<(UnitId, BuffId)> = taken
        .shields_broken
        .into_iter()
        .chain(taken.woke_from)
        .map(|buff_id| (defender_id.clone(), buff_id))
        .collect();

    let dealt = taken.hp_lost + taken.absorbed;
    let retaliation = (f64::from(dealt) * reflect_ratio).round() as u32;
    let mut reflected = None;
    if retaliation > 0 && attacker_id != defender_id {
        let attacker = roster
            .get_mut(attacker_id)
            .ok_or_else(|| CombatError::UnitNotFound(attacker_id.clone()))?;
        if attacker.is_alive() {
            let back = take_damage(attacker, retaliation);
            removed_buffs.extend(
                back.shields_broken
                    .into_iter()
                    .chain(back.woke_from)
                    .map(|buff_id| (attacker_id.clone(), buff_id)),
            );
            reflected = Some(HitRecord {
                source: defender_id.clone(),
                target: attacker_id.clone(),
                damage: back.hp_lost,
                absorbed: back.absorbed,
                critical: false,
                missed: false,
                reflected: true,
                target_defeated: back.defeated,
            });
        }
    }

    Ok(StrikeResult {
        hit,
        reflected,
        removed_buffs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::apply_buff;
    use crate::env::{BalanceTables, BuffDefinition, PcgRng, ScriptedRng, TablesOracle};
    use crate::state::{BattleSetup, Stats, UnitSpec};

    fn duel(p_atk: u32, enemy_hp: u32) -> Roster {
        let attacker = Stats {
            p_atk,
            ..Stats::default()
        };
        let defender = Stats {
            hp: enemy_hp,
            p_atk: 0,
            ..Stats::default()
        };
        Roster::from_setup(
            BattleSetup::new()
                .player("p1", UnitSpec::new("Knight", attacker))
                .enemy("e1", UnitSpec::new("Slime", defender)),
        )
        .unwrap()
    }

    fn tables() -> CombatTables {
        BalanceTables::deterministic().combat()
    }

    #[test]
    fn shields_absorb_smallest_pool_first() {
        let mut roster = duel(50, 100);
        let e1 = UnitId::new("e1");
        let small = BuffDefinition::new("small", "Small Ward", EffectType::Shield, 3, 10.0);
        let large = BuffDefinition::new("large", "Large Ward", EffectType::Shield, 3, 30.0);
        let unit = roster.get_mut(&e1).unwrap();
        apply_buff(unit, &large, &UnitId::new("p1"), 1, None);
        apply_buff(unit, &small, &UnitId::new("p1"), 1, None);

        let taken = take_damage(unit, 25);
        assert_eq!(taken.absorbed, 25);
        assert_eq!(taken.hp_lost, 0);
        assert_eq!(taken.shields_broken, vec![BuffId::new("small")]);
        assert_eq!(
            unit.status_effects.get(&BuffId::new("large")).unwrap().shield_remaining,
            15
        );
    }

    #[test]
    fn strike_defeats_and_records() {
        let mut roster = duel(50, 40);
        let result = strike(
            &mut roster,
            &UnitId::new("p1"),
            &UnitId::new("e1"),
            DamageType::Physical,
            1.0,
            &tables(),
            &mut PcgRng::seeded(1),
        )
        .unwrap();
        assert_eq!(result.hit.damage, 40);
        assert!(result.hit.target_defeated);
        assert!(roster.get(&UnitId::new("e1")).unwrap().is_defeated());
    }

    #[test]
    fn dodge_can_cause_a_miss() {
        let mut roster = duel(50, 100);
        roster.get_mut(&UnitId::new("e1")).unwrap().stats.dodge_rate = 0.5;
        let result = strike(
            &mut roster,
            &UnitId::new("p1"),
            &UnitId::new("e1"),
            DamageType::Physical,
            1.0,
            &tables(),
            &mut ScriptedRng::new(vec![0.9]),
        )
        .unwrap();
        assert!(result.hit.missed);
        assert_eq!(roster.get(&UnitId::new("e1")).unwrap().current_hp(), 100);
    }

    #[test]
    fn hit_chance_has_a_floor() {
        let roster = duel(50, 100);
        let mut defender = roster.get(&UnitId::new("e1")).unwrap().clone();
        defender.stats.dodge_rate = 5.0;
        let attacker = roster.get(&UnitId::new("p1")).unwrap();
        assert_eq!(hit_chance(attacker, &defender, &tables()), 0.05);
    }

    #[test]
    fn reflect_damages_the_attacker() {
        let mut roster = duel(50, 100);
        let thorns = BuffDefinition::new("thorns", "Thorns", EffectType::ReflectDamage, 3, 0.5);
        apply_buff(
            roster.get_mut(&UnitId::new("e1")).unwrap(),
            &thorns,
            &UnitId::new("e1"),
            1,
            None,
        );
        let result = strike(
            &mut roster,
            &UnitId::new("p1"),
            &UnitId::new("e1"),
            DamageType::Physical,
            1.0,
            &tables(),
            &mut PcgRng::seeded(1),
        )
        .unwrap();
        let reflected = result.reflected.unwrap();
        assert!(reflected.reflected);
        assert_eq!(reflected.damage, 25);
        assert_eq!(roster.get(&UnitId::new("p1")).unwrap().current_hp(), 75);
    }

    #[test]
    fn damage_breaks_sleep() {
        let mut roster = duel(50, 100);
        let sleep = BuffDefinition::new("sleep", "Sleep", EffectType::Sleep, 3, 0.0).debuff();
        let e1 = UnitId::new("e1");
        apply_buff(roster.get_mut(&e1).unwrap(), &sleep, &UnitId::new("p1"), 1, None);
        assert!(!buff::can_unit_act(roster.get(&e1).unwrap()));

        let result = strike(
            &mut roster,
            &UnitId::new("p1"),
            &e1,
            DamageType::Physical,
            1.0,
            &tables(),
            &mut PcgRng::seeded(1),
        )
        .unwrap();
        assert!(result.removed_buffs.contains(&(e1.clone(), BuffId::new("sleep"))));
        assert!(buff::can_unit_act(roster.get(&e1).unwrap()));
    }
}
