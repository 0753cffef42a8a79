#![allow(clippy::unwrap_used, clippy::expect_used)]

use distdiff_core::patching::paths::{
    is_in_overlays, layer_of, overlay_patch_id, to_original_path, to_overlay_path,
};
use proptest::prelude::*;

fn arb_layer_path() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,6}", prop::collection::vec("[a-z0-9]{1,6}", 0..5)).prop_map(|(layer, rest)| {
        let mut path = format!("modules/system/layers/{}", layer);
        for segment in rest {
            path.push('/');
            path.push_str(&segment);
        }
        (layer, path)
    })
}

proptest! {
    #[test]
    fn prop_overlay_round_trip((layer, path) in arb_layer_path(), patch in "[a-z0-9-]{1,12}") {
        let overlay = to_overlay_path(&path, &patch).unwrap();

        prop_assert!(is_in_overlays(&overlay));
        prop_assert_eq!(overlay_patch_id(&overlay), Some(patch.as_str()));
        prop_assert_eq!(layer_of(&overlay), Some(layer.as_str()));
        prop_assert_eq!(to_original_path(&overlay), path);
    }

    #[test]
    fn prop_original_paths_are_fixed_points((_, path) in arb_layer_path()) {
        prop_assert_eq!(to_original_path(&path), path.clone());
    }

    #[test]
    fn prop_paths_outside_layers_have_no_overlay(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        prop_assume!(!path.starts_with("modules/system/layers/"));
        prop_assert_eq!(to_overlay_path(&path, "p1"), None);
        prop_assert_eq!(layer_of(&path), None);
    }
}
