/// Display context - dimensions of the current render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayContext {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl DisplayContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero dimension; nothing is drawn then
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Workgroup grid covering every pixel with `tile`-sized groups
    pub fn workgroups(&self, tile: (u32, u32)) -> (u32, u32) {
        (self.width.div_ceil(tile.0), self.height.div_ceil(tile.1))
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_when_any_dimension_zero() {
        assert!(DisplayContext::new(0, 720).is_empty());
        assert!(DisplayContext::new(1280, 0).is_empty());
        assert!(!DisplayContext::new(1, 1).is_empty());
    }

    #[test]
    fn test_workgroups_round_up() {
        let ctx = DisplayContext::new(1280, 720);
        assert_eq!(ctx.workgroups((8, 8)), (160, 90));

        let ctx = DisplayContext::new(1281, 1);
        assert_eq!(ctx.workgroups((8, 8)), (161, 1));
    }

    #[test]
    fn test_pixel_count_no_overflow() {
        let ctx = DisplayContext::new(70_000, 70_000);
        assert_eq!(ctx.pixel_count(), 4_900_000_000);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(DisplayContext::new(1600, 800).aspect_ratio(), 2.0);
        assert_eq!(DisplayContext::new(10, 0).aspect_ratio(), 1.0);
    }
}
