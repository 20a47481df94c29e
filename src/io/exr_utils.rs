/* Copyright 2020 @TwoCookingMice */

use crate::core::error::RenderError;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Vector3f;

use exr::prelude::*;

// Read the first RGB(A) layer of an OpenEXR file.
pub fn read_exr_from_file(file_path: &str) -> std::result::Result<Bitmap, RenderError> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap: &mut Bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = Vector3f::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

// Write a resolved film as an RGB OpenEXR file.
pub fn write_exr_to_file(bitmap: &Bitmap, file_path: &str) -> std::result::Result<(), RenderError> {
    log::info!("Starting writing openexr images: {}.", file_path);
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(RenderError::EmptyOutput);
    }

    write_rgb_file(file_path, bitmap.width(), bitmap.height(), |x, y| {
        let v = bitmap[(x, y)];
        (v.x, v.y, v.z)
    })?;
    log::info!("EXR written to: {}.", file_path);
    Ok(())
}
