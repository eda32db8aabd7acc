//! Property-based tests for core types.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::types::{WriteKind, key_from_id, plan_range};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_plan_range_stays_inside_rectangle(
            r0 in 1u32..20, c0 in 1u32..20, h in 0u32..6, w in 0u32..6,
            data in prop::collection::vec(prop::collection::vec("[a-z]{0,3}", 0..8), 0..8),
        ) {
            let end = (r0 + h, c0 + w);
            let writes = plan_range((r0, c0), end, &data, |r, c| (r + c) % 2 == 0);
            for write in &writes {
                prop_assert!(write.row >= r0 && write.row <= end.0);
                prop_assert!(write.col >= c0 && write.col <= end.1);
            }
        }

        #[test]
        fn test_plan_range_direct_writes_carry_data(
            h in 0u32..5, w in 0u32..5,
            data in prop::collection::vec(prop::collection::vec("[a-z]{1,3}", 0..6), 0..6),
        ) {
            let writes = plan_range((1, 1), (1 + h, 1 + w), &data, |_, _| false);
            for write in &writes {
                prop_assert_eq!(write.kind, WriteKind::Direct);
                let expected = &data[(write.row - 1) as usize][(write.col - 1) as usize];
                prop_assert_eq!(&write.value, expected);
            }
        }

        #[test]
        fn test_plan_range_covers_every_existing_cell(h in 0u32..6, w in 0u32..6) {
            let writes = plan_range((2, 3), (2 + h, 3 + w), &[], |_, _| true);
            prop_assert_eq!(writes.len() as u32, (h + 1) * (w + 1));
            prop_assert!(writes.iter().all(|w| w.value.is_empty()));
        }

        #[test]
        fn test_key_from_id_has_no_slash(id in "[a-z/]{0,40}") {
            prop_assert!(!key_from_id(&id).contains('/'));
        }
    }
}
