use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_rejects_wrong_length() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
}

#[test]
fn layer_blur_spreads_a_single_pixel_and_keeps_energy() {
    let (w, h) = (9u32, 9u32);
    let mut layer = vec![0u8; (w * h * 4) as usize];
    let center = ((4 * w + 4) * 4) as usize;
    layer[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    blur_layer_in_place(&mut layer, w, h, 2).unwrap();

    let nonzero = layer.chunks_exact(4).filter(|px| px[3] != 0).count();
    assert!(nonzero > 1);
    let sum_a: u32 = layer.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 6);
    // Far corner is outside the padded region and untouched.
    assert_eq!(&layer[..4], &[0, 0, 0, 0]);
}

#[test]
fn layer_blur_of_empty_layer_is_noop() {
    let mut layer = vec![0u8; 4 * 4 * 4];
    blur_layer_in_place(&mut layer, 4, 4, 3).unwrap();
    assert!(layer.iter().all(|&b| b == 0));
}
