//! Per-pixel masking and alpha compositing.
//!
//! Layers are drawn with non-premultiplied Porter-Duff source-over:
//! `out_a = src_a + dst_a * (1 - src_a)`
//! `out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a`

use image::RgbaImage;

use crate::classify::PixelPredicate;

/// Zero the alpha of every pixel the predicate classifies as background.
///
/// Colour channels are never modified, and pixels that do not match keep
/// their decoded alpha. Returns the number of pixels cleared.
pub fn clear_background<P>(image: &mut RgbaImage, predicate: &P) -> usize
where
    P: PixelPredicate + Sync + ?Sized,
{
    #[cfg(feature = "cli")]
    {
        use rayon::prelude::*;
        let row_len = image.width() as usize * 4;
        if row_len == 0 {
            return 0;
        }
        let buf: &mut [u8] = image;
        buf.par_chunks_mut(row_len)
            .map(|row| mask_row(row, predicate))
            .sum()
    }

    #[cfg(not(feature = "cli"))]
    {
        let buf: &mut [u8] = image;
        mask_row(buf, predicate)
    }
}

fn mask_row<P>(row: &mut [u8], predicate: &P) -> usize
where
    P: PixelPredicate + ?Sized,
{
    let mut cleared = 0;
    for px in row.chunks_exact_mut(4) {
        if predicate.is_background(px[0], px[1], px[2]) {
            px[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

/// Draw `src` onto `dst` with source-over, both anchored at the origin.
///
/// Only the overlapping region is touched: a larger `src` is clipped to
/// `dst`, a smaller one leaves the rest of `dst` as it was. No scaling.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage) {
    let w = dst.width().min(src.width());
    let h = dst.height().min(src.height());

    for y in 0..h {
        for x in 0..w {
            let s = src.get_pixel(x, y);
            let d = dst.get_pixel_mut(x, y);
            d.0 = source_over(s.0, d.0);
        }
    }
}

/// Blend one source pixel over one destination pixel.
#[must_use]
pub fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let sa = f32::from(src[3]) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for ((o, &s), &d) in out.iter_mut().zip(&src[..3]).zip(&dst[..3]) {
        let c = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        *o = to_channel(c);
    }
    out[3] = to_channel(out_a * 255.0);
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BackgroundVariant;
    use image::Rgba;

    #[test]
    fn clear_background_zeroes_only_matching_alpha() {
        let mut img = RgbaImage::from_raw(2, 1, vec![0, 0, 0, 255, 255, 0, 0, 255]).unwrap();
        let cleared = clear_background(&mut img, &BackgroundVariant::Black);

        assert_eq!(cleared, 1);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn clear_background_keeps_partial_alpha_of_foreground() {
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([120, 90, 60, 77]));
        let cleared = clear_background(&mut img, &BackgroundVariant::White);
        assert_eq!(cleared, 0);
        assert!(img.pixels().all(|p| p.0 == [120, 90, 60, 77]));
    }

    #[test]
    fn clear_background_matches_single_pass_over_buffer() {
        let mut img = RgbaImage::new(7, 5);
        for (i, px) in img.pixels_mut().enumerate() {
            let v = u8::try_from(i * 7 % 256).unwrap();
            *px = Rgba([v, v / 2, v / 3, 255]);
        }
        let mut expected = img.clone();
        let expected_cleared = mask_row(&mut expected, &BackgroundVariant::Black);

        let cleared = clear_background(&mut img, &BackgroundVariant::Black);
        assert!(expected_cleared > 0);
        assert_eq!(cleared, expected_cleared);
        assert_eq!(img, expected);
    }

    #[test]
    fn clear_background_on_empty_image_is_a_no_op() {
        let mut img = RgbaImage::new(0, 3);
        assert_eq!(clear_background(&mut img, &BackgroundVariant::White), 0);
    }

    #[test]
    fn source_over_fast_paths() {
        let dst = [10, 20, 30, 255];
        assert_eq!(source_over([200, 0, 0, 0], dst), dst);
        assert_eq!(source_over([200, 1, 2, 255], dst), [200, 1, 2, 255]);
    }

    #[test]
    fn source_over_on_transparent_destination_preserves_source() {
        for a in 1..=255u8 {
            let src = [37, 150, 251, a];
            assert_eq!(source_over(src, [0, 0, 0, 0]), src, "alpha {a}");
        }
    }

    #[test]
    fn source_over_half_alpha_over_opaque() {
        let out = source_over([255, 0, 0, 128], [0, 0, 255, 255]);
        assert_eq!(out[3], 255);
        assert!((i32::from(out[0]) - 128).abs() <= 1);
        assert!((i32::from(out[2]) - 127).abs() <= 1);
        assert_eq!(out[1], 0);
    }

    #[test]
    fn draw_over_clips_larger_source() {
        let mut dst = RgbaImage::new(2, 2);
        let src = RgbaImage::from_pixel(4, 3, Rgba([9, 8, 7, 255]));
        draw_over(&mut dst, &src);
        assert_eq!(dst.dimensions(), (2, 2));
        assert!(dst.pixels().all(|p| p.0 == [9, 8, 7, 255]));
    }

    #[test]
    fn draw_over_smaller_source_leaves_rest_untouched() {
        let mut dst = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
        let src = RgbaImage::from_pixel(1, 2, Rgba([200, 200, 200, 255]));
        draw_over(&mut dst, &src);
        assert_eq!(dst.get_pixel(0, 0).0, [200, 200, 200, 255]);
        assert_eq!(dst.get_pixel(0, 1).0, [200, 200, 200, 255]);
        assert_eq!(dst.get_pixel(1, 0).0, [1, 1, 1, 255]);
        assert_eq!(dst.get_pixel(0, 2).0, [1, 1, 1, 255]);
    }
}
