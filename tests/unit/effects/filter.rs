use super::*;

#[test]
fn resolve_is_pure() {
    for sel in FilterSelection::ALL {
        assert_eq!(FilterBank::resolve(sel), FilterBank::resolve(sel));
    }
}

#[test]
fn none_is_identity_and_leaves_pixels() {
    let spec = FilterBank::resolve(FilterSelection::None);
    assert!(spec.is_identity());
    let mut px = vec![12u8, 200, 99, 255];
    spec.apply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![12, 200, 99, 255]);
}

#[test]
fn grayscale_equalises_channels() {
    let spec = FilterBank::resolve(FilterSelection::Grayscale);
    let mut px = vec![200u8, 30, 90, 255];
    spec.apply_rgba8_in_place(&mut px);
    assert!(px[0].abs_diff(px[1]) <= 1);
    assert!(px[1].abs_diff(px[2]) <= 1);
    assert_eq!(px[3], 255);
}

#[test]
fn invert_flips_channels() {
    let spec = FilterBank::resolve(FilterSelection::Invert);
    let mut px = vec![0u8, 255, 100, 7];
    spec.apply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![255, 0, 155, 7]);
}

#[test]
fn sepia_warms_white_grey() {
    let spec = FilterBank::resolve(FilterSelection::Sepia);
    assert_eq!(spec, PixelTransformSpec::Sepia { amount: 0.8 });
    let out = spec.color_matrix().apply_rgb([128, 128, 128]);
    assert!(out[0] > out[2]);
}

#[test]
fn contrast_pushes_away_from_mid_grey() {
    let spec = FilterBank::resolve(FilterSelection::Contrast);
    let m = spec.color_matrix();
    let dark = m.apply_rgb([60, 60, 60]);
    let light = m.apply_rgb([200, 200, 200]);
    assert!(dark[0] < 60);
    assert!(light[0] > 200);
    // Mid-grey stays put (saturation has no effect on neutral colours).
    let mid = m.apply_rgb([128, 128, 128]);
    assert!(mid[0].abs_diff(128) <= 1);
}

#[test]
fn then_composes_in_order() {
    let a = ColorMatrix::invert(1.0);
    let composed = a.then(ColorMatrix::invert(1.0));
    assert_eq!(composed.apply_rgb([10, 20, 30]), [10, 20, 30]);
}
