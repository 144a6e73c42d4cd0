//! Layered compositing of background-cleared images.

use image::RgbaImage;
use log::debug;

use crate::blending;
use crate::classify::PixelPredicate;
use crate::surface::{RasterSurface, Surface};

/// Knock out the background of every image and stack them in order.
///
/// The output has the dimensions of `images[0]`. Later images are anchored
/// at the origin and clipped to those bounds. Returns `None` for an empty
/// slice. Inputs are never modified.
#[must_use]
pub fn composite<P>(images: &[RgbaImage], predicate: &P) -> Option<RgbaImage>
where
    P: PixelPredicate + Sync + ?Sized,
{
    composite_with_progress(images, predicate, |_, _| {})
}

/// Like [`composite`], calling `on_progress(done, total)` after each layer.
pub fn composite_with_progress<P, F>(
    images: &[RgbaImage],
    predicate: &P,
    mut on_progress: F,
) -> Option<RgbaImage>
where
    P: PixelPredicate + Sync + ?Sized,
    F: FnMut(usize, usize),
{
    let first = images.first()?;
    let total = images.len();

    let mut canvas = RasterSurface::new(first.width(), first.height());
    canvas.clear();

    for (index, image) in images.iter().enumerate() {
        let mut scratch = image.clone();
        let cleared = blending::clear_background(&mut scratch, predicate);
        canvas.draw_over(&scratch);

        debug!(
            "layer {}/{total}: {}x{}, {cleared} background pixels cleared",
            index + 1,
            image.width(),
            image.height(),
        );
        on_progress(index + 1, total);
    }

    Some(canvas.into_pixels())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BackgroundVariant;
    use image::Rgba;

    #[test]
    fn empty_input_is_a_no_op() {
        assert!(composite(&[], &BackgroundVariant::Black).is_none());
    }

    #[test]
    fn all_background_image_becomes_fully_transparent() {
        let img = RgbaImage::from_pixel(5, 4, Rgba([250, 240, 230, 255]));
        let out = composite(&[img], &BackgroundVariant::White).unwrap();
        assert_eq!(out.dimensions(), (5, 4));
        assert!(out.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn image_without_background_is_reproduced_exactly() {
        let mut img = RgbaImage::new(3, 2);
        for (i, px) in img.pixels_mut().enumerate() {
            let v = u8::try_from(40 + i * 30).unwrap();
            *px = Rgba([v, 100, 200, if i % 2 == 0 { 255 } else { 90 }]);
        }
        let out = composite(std::slice::from_ref(&img), &BackgroundVariant::Black).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn two_pixel_black_example() {
        let img = RgbaImage::from_raw(2, 1, vec![0, 0, 0, 255, 255, 0, 0, 255]).unwrap();
        let out = composite(&[img], &BackgroundVariant::Black).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn later_layers_stack_on_top() {
        // A: blue square on black; B: red left half, black right half.
        let a = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 200, 255]));
        let mut b = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        b.put_pixel(0, 0, Rgba([220, 10, 10, 255]));

        let out = composite(&[a.clone(), b.clone()], &BackgroundVariant::Black).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [220, 10, 10, 255]);
        assert_eq!(out.get_pixel(1, 0).0, [0, 0, 200, 255]);

        let reversed = composite(&[b, a], &BackgroundVariant::Black).unwrap();
        assert_eq!(reversed.get_pixel(0, 0).0, [0, 0, 200, 255]);
    }

    #[test]
    fn first_image_sets_canvas_size() {
        let small = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let large = RgbaImage::from_pixel(4, 1, Rgba([50, 60, 70, 255]));
        let out = composite(&[small, large], &BackgroundVariant::Black).unwrap();

        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.get_pixel(1, 0).0, [50, 60, 70, 255]);
        assert_eq!(out.get_pixel(1, 1).0, [100, 100, 100, 255]);
    }

    #[test]
    fn reprocessing_is_bit_identical_and_leaves_sources_alone() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 255]));
        img.put_pixel(2, 2, Rgba([90, 180, 30, 255]));
        let images = vec![img.clone(), img.clone()];

        let first = composite(&images, &BackgroundVariant::Black).unwrap();
        let second = composite(&images, &BackgroundVariant::Black).unwrap();
        assert_eq!(first, second);
        assert_eq!(images[0], img);
    }

    #[test]
    fn progress_is_reported_per_layer() {
        let images = vec![RgbaImage::new(1, 1); 3];
        let mut seen = Vec::new();
        composite_with_progress(&images, &BackgroundVariant::White, |done, total| {
            seen.push((done, total));
        });
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn custom_predicates_are_accepted() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 255, 0, 255]));
        let green = |_r: u8, g: u8, _b: u8| g == 255;
        let out = composite(&[img], &green).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }
}
