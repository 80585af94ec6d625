use raylib::prelude::Rectangle;

/// Destination rectangle of an image on screen, in whole pixels.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FitRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FitRect {
    pub fn to_rectangle(self) -> Rectangle {
        Rectangle::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }
}

/// Uniform scale that fits the image inside the window.
///
/// Small images are scaled up as well as large ones down.
pub fn fit_scale(image_width: i32, image_height: i32, window_width: i32, window_height: i32) -> f32 {
    let scale_x = window_width as f32 / image_width as f32;
    let scale_y = window_height as f32 / image_height as f32;
    scale_x.min(scale_y)
}

/// Aspect-preserving fit, centred in the window. `None` for degenerate images.
pub fn aspect_fit(
    image_width: i32,
    image_height: i32,
    window_width: i32,
    window_height: i32,
) -> Option<FitRect> {
    if image_width <= 0 || image_height <= 0 {
        return None;
    }

    let scale = fit_scale(image_width, image_height, window_width, window_height);
    let width = (image_width as f32 * scale) as i32;
    let height = (image_height as f32 * scale) as i32;

    Some(FitRect {
        x: (window_width - width) / 2,
        y: (window_height - height) / 2,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_image_fills_height() {
        let rect = aspect_fit(640, 480, 1280, 720).unwrap();
        assert_eq!(fit_scale(640, 480, 1280, 720), 1.5);
        assert_eq!(
            rect,
            FitRect { x: 160, y: 0, width: 960, height: 720 }
        );
    }

    #[test]
    fn wide_image_fills_width() {
        let rect = aspect_fit(3840, 1080, 1280, 720).unwrap();
        assert_eq!(rect.width, 1280);
        assert_eq!(rect.height, 360);
        assert_eq!((rect.x, rect.y), (0, 180));
    }

    #[test]
    fn large_image_is_shrunk() {
        let rect = aspect_fit(2560, 1440, 1280, 720).unwrap();
        assert_eq!(rect, FitRect { x: 0, y: 0, width: 1280, height: 720 });
    }

    #[test]
    fn small_image_is_upscaled() {
        let rect = aspect_fit(100, 100, 1280, 720).unwrap();
        assert_eq!(rect, FitRect { x: 280, y: 0, width: 720, height: 720 });
    }

    #[test]
    fn portrait_image_is_centred_horizontally() {
        let rect = aspect_fit(1080, 1920, 1280, 720).unwrap();
        assert_eq!(rect.height, 720);
        assert_eq!(rect.width, 405);
        assert_eq!(rect.x, (1280 - 405) / 2);
    }

    #[test]
    fn degenerate_image_has_no_rect() {
        assert_eq!(aspect_fit(0, 480, 1280, 720), None);
        assert_eq!(aspect_fit(640, -1, 1280, 720), None);
    }
}
