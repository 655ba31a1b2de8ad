use crate::model::network::{AttributeDelta, Directions, LinkRecord};

/// writes an attribute delta onto a link. `NEW_*` fields override only where
/// non-sentinel; `ADD_*` fields sum onto the existing value and clamp to
/// their valid range. when the resulting directions carry no independent
/// side-2 coding, the side-2 fields are zeroed.
///
/// adds onto a skeleton behave as absolute writes, since every skeleton
/// attribute is zero.
pub fn apply_delta(link: &mut LinkRecord, delta: &AttributeDelta) {
    let override_int = |field: &mut i32, value: i32| {
        if value != 0 {
            *field = value;
        }
    };

    if let Some(directions) = Directions::from_i32(delta.new_directions) {
        link.directions = directions;
    }
    override_int(&mut link.type1, delta.new_type1);
    override_int(&mut link.type2, delta.new_type2);
    override_int(&mut link.ampm1, delta.new_ampm1);
    override_int(&mut link.ampm2, delta.new_ampm2);
    override_int(&mut link.postedspeed1, delta.new_postedspeed1);
    override_int(&mut link.postedspeed2, delta.new_postedspeed2);
    override_int(&mut link.thrulanes1, delta.new_thrulanes1);
    override_int(&mut link.thrulanes2, delta.new_thrulanes2);
    override_int(&mut link.thrulanewidth1, delta.new_thrulanewidth1);
    override_int(&mut link.thrulanewidth2, delta.new_thrulanewidth2);
    override_int(&mut link.modes, delta.new_modes);
    if !delta.new_parkres1.is_empty() {
        link.parkres1 = delta.new_parkres1.clone();
    }
    if !delta.new_parkres2.is_empty() {
        link.parkres2 = delta.new_parkres2.clone();
    }
    if delta.new_tolldollars != 0.0 {
        link.tolldollars = delta.new_tolldollars;
    }

    // additive fields
    link.parklanes1 = (link.parklanes1 + delta.add_parklanes1).max(0);
    link.parklanes2 = (link.parklanes2 + delta.add_parklanes2).max(0);
    link.sigic = (link.sigic + delta.add_sigic).clamp(0, 1);
    link.cltl = (link.cltl + delta.add_cltl).clamp(0, 1);
    link.rrgradecross = (link.rrgradecross + delta.add_rrgradecross).clamp(0, 1);

    if !link.directions.has_side_two() {
        link.clear_side_two();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::NodeId;

    fn link() -> LinkRecord {
        LinkRecord {
            anode: NodeId(1),
            bnode: NodeId(2),
            directions: Directions::TwoWayCoded,
            type1: 1,
            type2: 1,
            ampm1: 1,
            ampm2: 1,
            postedspeed1: 30,
            postedspeed2: 30,
            thrulanes1: 2,
            thrulanes2: 2,
            thrulanewidth1: 12,
            thrulanewidth2: 12,
            parklanes1: 1,
            sigic: 1,
            modes: 1,
            miles: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_sentinel_deltas_are_noops() {
        let mut target = link();
        apply_delta(&mut target, &AttributeDelta::default());
        assert_eq!(target, link());
    }

    #[test]
    fn test_override_and_additive_fields() {
        let mut target = link();
        let delta = AttributeDelta {
            new_thrulanes1: 3,
            add_parklanes1: -5,
            add_sigic: 1,
            ..Default::default()
        };
        apply_delta(&mut target, &delta);
        assert_eq!(target.thrulanes1, 3);
        assert_eq!(target.parklanes1, 0, "parklanes clamp at zero");
        assert_eq!(target.sigic, 1, "sigic clamps to [0, 1]");
    }

    #[test]
    fn test_one_way_result_zeroes_side_two() {
        let mut target = link();
        let delta = AttributeDelta {
            new_directions: 1,
            ..Default::default()
        };
        apply_delta(&mut target, &delta);
        assert_eq!(target.directions, Directions::OneWay);
        assert_eq!(target.type2, 0);
        assert_eq!(target.postedspeed2, 0);
        assert_eq!(target.thrulanes2, 0);
    }
}
