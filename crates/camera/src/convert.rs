use {
    crate::{CameraError, Frame, PixelFormat},
    image::{ImageFormat, RgbImage},
};

/// Converts YUYV (YUV 4:2:2) pixel data to packed RGB with BT.601 coefficients.
///
/// Each 4-byte group `[Y0, U, Y1, V]` yields two RGB pixels sharing U and V.
/// Returns `None` if `data` holds fewer than `width * height * 2` bytes.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let pixel_count = (width as usize) * (height as usize);
    let expected_len = pixel_count * 2;
    if data.len() < expected_len {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);
    for chunk in data[..expected_len].chunks_exact(4) {
        let (u, v) = (chunk[1] as f32 - 128.0, chunk[3] as f32 - 128.0);
        for y in [chunk[0] as f32, chunk[2] as f32] {
            rgb.push((y + 1.402 * v).clamp(0.0, 255.0) as u8);
            rgb.push((y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8);
            rgb.push((y + 1.772 * u).clamp(0.0, 255.0) as u8);
        }
    }
    Some(rgb)
}

/// Swap the red and blue channels of packed 3-byte pixels.
pub fn bgr_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect()
}

/// Decode or repack any supported raw frame into an RGB image.
pub fn to_rgb(frame: &Frame) -> Result<RgbImage, CameraError> {
    let (width, height) = (frame.width, frame.height);
    let short = || {
        CameraError::Backend(format!(
            "{:?} frame of {} bytes is too short for {width}x{height}",
            frame.format,
            frame.data.len()
        ))
    };
    let rgb = match frame.format {
        PixelFormat::Rgb8 => frame.data.clone(),
        PixelFormat::Bgr8 => bgr_to_rgb(&frame.data),
        PixelFormat::Gray8 => frame.data.iter().flat_map(|&l| [l, l, l]).collect(),
        PixelFormat::Yuyv => yuyv_to_rgb(&frame.data, width, height).ok_or_else(short)?,
        PixelFormat::Mjpeg => {
            return Ok(image::load_from_memory_with_format(&frame.data, ImageFormat::Jpeg)?.to_rgb8());
        }
    };
    RgbImage::from_raw(width, height, rgb).ok_or_else(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_gray_pixels() {
        // neutral chroma leaves luma untouched
        let rgb = yuyv_to_rgb(&[100, 128, 200, 128], 2, 1).unwrap();
        assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
    }

    #[test]
    fn test_yuyv_short_input() {
        assert!(yuyv_to_rgb(&[0; 6], 2, 2).is_none());
    }

    #[test]
    fn test_bgr_swap() {
        assert_eq!(bgr_to_rgb(&[1, 2, 3, 4, 5, 6]), vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_gray_expands() {
        let frame = Frame::new(vec![7, 9], 2, 1, PixelFormat::Gray8);
        let rgb = to_rgb(&frame).unwrap();
        assert_eq!(rgb.as_raw(), &vec![7, 7, 7, 9, 9, 9]);
    }

    #[test]
    fn test_truncated_rgb_is_backend_error() {
        let frame = Frame::new(vec![0; 5], 2, 1, PixelFormat::Rgb8);
        assert!(matches!(to_rgb(&frame), Err(CameraError::Backend(_))));
    }
}
