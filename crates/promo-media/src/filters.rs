//! FFmpeg video filter construction.

use promo_models::TransformSpec;

/// Region selected by a center square crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub side: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRegion {
    /// Filter string, sample aspect ratio reset so players show square pixels.
    pub fn to_filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{},setsar=1",
            self.side, self.side, self.x, self.y
        )
    }
}

/// Canvas produced by padding the frame to a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadRegion {
    pub side: u32,
    pub x: u32,
    pub y: u32,
}

impl PadRegion {
    pub fn to_filter(&self) -> String {
        format!(
            "pad={}:{}:{}:{}:color=black,setsar=1",
            self.side, self.side, self.x, self.y
        )
    }
}

/// Largest centered square that fits in a `width`x`height` frame.
///
/// The side is rounded down to an even number because 4:2:0 encoders reject
/// odd dimensions.
pub fn center_square_crop(width: u32, height: u32) -> CropRegion {
    let side = width.min(height) & !1;
    CropRegion {
        side,
        x: (width - side) / 2,
        y: (height - side) / 2,
    }
}

/// Smallest square canvas that holds the whole `width`x`height` frame centered.
pub fn center_square_pad(width: u32, height: u32) -> PadRegion {
    let longest = width.max(height);
    let side = longest + (longest & 1);
    PadRegion {
        side,
        x: (side - width) / 2,
        y: (side - height) / 2,
    }
}

/// Video filter for a transform on a source of the given geometry.
///
/// Returns `None` when the frame is left untouched.
pub fn build_transform_filter(spec: &TransformSpec, width: u32, height: u32) -> Option<String> {
    if spec.square_crop {
        Some(center_square_crop(width, height).to_filter())
    } else if spec.letterbox {
        Some(center_square_pad(width, height).to_filter())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promo_models::SquareStrategy;

    #[test]
    fn test_crop_portrait() {
        let region = center_square_crop(1080, 1920);
        assert_eq!(region, CropRegion { side: 1080, x: 0, y: 420 });
        assert_eq!(region.to_filter(), "crop=1080:1080:0:420,setsar=1");
    }

    #[test]
    fn test_crop_landscape() {
        let region = center_square_crop(1920, 1080);
        assert_eq!(region, CropRegion { side: 1080, x: 420, y: 0 });
    }

    #[test]
    fn test_crop_odd_dimensions() {
        let region = center_square_crop(721, 1281);
        assert_eq!(region.side, 720);
        assert_eq!(region.x, 0);
        assert_eq!(region.y, 280);
    }

    #[test]
    fn test_crop_already_square() {
        assert_eq!(center_square_crop(720, 720), CropRegion { side: 720, x: 0, y: 0 });
    }

    #[test]
    fn test_pad_portrait() {
        let region = center_square_pad(1080, 1920);
        assert_eq!(region, PadRegion { side: 1920, x: 420, y: 0 });
        assert_eq!(region.to_filter(), "pad=1920:1920:420:0:color=black,setsar=1");
    }

    #[test]
    fn test_pad_odd_dimensions() {
        let region = center_square_pad(700, 1281);
        assert_eq!(region.side, 1282);
        assert_eq!(region.x, 291);
        assert_eq!(region.y, 0);
    }

    #[test]
    fn test_build_transform_filter() {
        let trim_only = TransformSpec::trim(0.3);
        assert!(build_transform_filter(&trim_only, 1080, 1920).is_none());

        let crop = TransformSpec::square(0.3, SquareStrategy::Crop);
        assert_eq!(
            build_transform_filter(&crop, 1080, 1920).as_deref(),
            Some("crop=1080:1080:0:420,setsar=1")
        );

        let pad = TransformSpec::square(0.3, SquareStrategy::Letterbox);
        assert!(build_transform_filter(&pad, 1080, 1920)
            .unwrap()
            .starts_with("pad=1920:1920"));
    }
}
