use super::*;
use crate::foundation::math::mul_div255_u8;

fn premul(rgb: [u8; 3], alpha: u8) -> PremulRgba8 {
    let a = u16::from(alpha);
    [
        mul_div255_u8(u16::from(rgb[0]), a),
        mul_div255_u8(u16::from(rgb[1]), a),
        mul_div255_u8(u16::from(rgb[2]), a),
        alpha,
    ]
}

#[test]
fn transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn opaque_src_replaces_dst() {
    assert_eq!(over([1, 2, 3, 255], [200, 100, 50, 255]), [200, 100, 50, 255]);
}

#[test]
fn transparent_dst_returns_src() {
    let src = [64, 32, 16, 128];
    assert_eq!(over([0, 0, 0, 0], src), src);
}

#[test]
fn half_alpha_over_opaque() {
    // 50% white over opaque black
    let out = over([0, 0, 0, 255], premul([255, 255, 255], 128));
    assert_eq!(out, [128, 128, 128, 255]);
}
