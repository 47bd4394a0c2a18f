use crate::env::BuffSelector;
use crate::state::{BattleUnit, BuffCategory, BuffId, EffectType, StatusEffect};

/// Removes one effect by id, dispellable or not.
pub fn remove_buff(unit: &mut BattleUnit, buff_id: &BuffId) -> Option<StatusEffect> {
    unit.status_effects.remove(buff_id)
}

/// Removes every dispellable effect of a category.
pub fn remove_by_category(unit: &mut BattleUnit, category: BuffCategory) -> Vec<StatusEffect> {
    unit.status_effects
        .drain_where(|e| e.dispellable && e.category == category)
}

/// Removes the effects a skill entry selects.
pub fn remove_selected(unit: &mut BattleUnit, selector: &BuffSelector) -> Vec<StatusEffect> {
    match selector {
        BuffSelector::Id(buff_id) => remove_buff(unit, buff_id).into_iter().collect(),
        BuffSelector::AllDebuffs => remove_by_category(unit, BuffCategory::Debuff),
        BuffSelector::AllBuffs => remove_by_category(unit, BuffCategory::Buff),
    }
}

/// Ends every sleep effect on the unit. Returns the ids removed.
pub fn break_sleep(unit: &mut BattleUnit) -> Vec<BuffId> {
    unit.status_effects
        .drain_where(|e| e.effect_type == EffectType::Sleep)
        .into_iter()
        .map(|e| e.buff_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::apply_buff;
    use crate::env::BuffDefinition;
    use crate::state::{GridCell, Stats, Team, UnitId, UnitSpec};

    #[test]
    fn category_removal_skips_undispellable() {
        let mut u = BattleUnit::from_spec(
            UnitId::new("u"),
            UnitSpec::new("Unit", Stats::default()),
            Team::Player,
            GridCell::new(0, 0),
        );
        let src = UnitId::new("src");
        let poison =
            BuffDefinition::new("poison", "Poison", EffectType::DamageOverTime, 3, 5.0).debuff();
        let mut curse =
            BuffDefinition::new("curse", "Curse", EffectType::Vulnerability, 3, 0.2).debuff();
        curse.dispellable = false;
        let might = BuffDefinition::new("might", "Might", EffectType::DamageBoost, 3, 0.2);
        for def in [&poison, &curse, &might] {
            apply_buff(&mut u, def, &src, 1, None);
        }

        let removed = remove_selected(&mut u, &BuffSelector::AllDebuffs);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].buff_id, BuffId::new("poison"));
        assert!(u.status_effects.contains(&BuffId::new("curse")));
        assert!(u.status_effects.contains(&BuffId::new("might")));

        assert!(remove_selected(&mut u, &BuffSelector::Id(BuffId::new("curse"))).len() == 1);
    }
}
