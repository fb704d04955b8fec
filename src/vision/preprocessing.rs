// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLOv8 detection models

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size for YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Smallest input size accepted; YOLOv8 downsamples by 32
pub const MIN_INPUT_SIZE: u32 = 32;

/// Grey value used for letterbox padding
pub const LETTERBOX_FILL: u8 = 114;

/// Preprocess an image for YOLOv8 inference
///
/// Steps:
/// 1. Resize with aspect ratio preservation to fit `target_size`
/// 2. Center on a square canvas padded with grey (114)
/// 3. Scale pixels to 0.0-1.0 (no mean/std normalization)
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_yolo(image: &DynamicImage, target_size: u32) -> (Array4<f32>, PreprocessInfo) {
    let info = PreprocessInfo::new(image, target_size);
    let letterboxed = resize_with_padding(image, target_size);

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in letterboxed.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}

/// Resize image with aspect ratio preservation and padding
///
/// The image is scaled to fit within target_size x target_size and
/// centered on a grey canvas.
pub fn resize_with_padding(image: &DynamicImage, target_size: u32) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([LETTERBOX_FILL, LETTERBOX_FILL, LETTERBOX_FILL]),
    );

    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return canvas;
    }

    let info = PreprocessInfo::new(image, target_size);
    let resized = imageops::resize(
        &image.to_rgb8(),
        info.scaled_width,
        info.scaled_height,
        imageops::FilterType::Triangle,
    );
    imageops::overlay(
        &mut canvas,
        &resized,
        info.offset_x as i64,
        info.offset_y as i64,
    );

    canvas
}

/// Scaling factor and offsets used during preprocessing
///
/// Maps detection coordinates from model space back to the uploaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessInfo {
    /// Scale factor applied
    pub scale: f32,
    /// X offset from padding
    pub offset_x: u32,
    /// Y offset from padding
    pub offset_y: u32,
    /// Width after scaling, before padding
    pub scaled_width: u32,
    /// Height after scaling, before padding
    pub scaled_height: u32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl PreprocessInfo {
    /// Calculate preprocessing info for an image
    pub fn new(image: &DynamicImage, target_size: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();
        Self::from_dimensions(orig_w, orig_h, target_size)
    }

    pub fn from_dimensions(orig_w: u32, orig_h: u32, target_size: u32) -> Self {
        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                scaled_width: 0,
                scaled_height: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
        let scaled_width = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
        let scaled_height = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

        Self {
            scale,
            offset_x: (target_size - scaled_width) / 2,
            offset_y: (target_size - scaled_height) / 2,
            scaled_width,
            scaled_height,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a coordinate from model space back to original image space,
    /// clipped to the image bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}
