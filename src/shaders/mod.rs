//! WGSL sources, embedded at compile time.
//!
//! `common.wgsl` declares the frame uniform block at group 0 binding 0 and the
//! raymarcher; each entry shader is appended to it.

pub const FRACTAL_COMPUTE: &str = concat!(
    include_str!("common.wgsl"),
    include_str!("fractal_compute.wgsl")
);

pub const FRACTAL_DIRECT: &str = concat!(
    include_str!("common.wgsl"),
    include_str!("fractal_direct.wgsl")
);

pub const DISPLAY: &str = include_str!("display.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_present() {
        assert!(FRACTAL_COMPUTE.contains("@compute @workgroup_size(8, 8, 1)"));
        assert!(FRACTAL_COMPUTE.contains("fn main("));
        assert!(FRACTAL_DIRECT.contains("fn vs_main("));
        assert!(FRACTAL_DIRECT.contains("fn fs_main("));
        assert!(DISPLAY.contains("fn fs_main("));
    }

    #[test]
    fn test_uniform_block_shared() {
        for source in [FRACTAL_COMPUTE, FRACTAL_DIRECT] {
            assert_eq!(source.matches("struct FrameUniforms").count(), 1);
            assert!(source.contains("@group(0) @binding(0)"));
        }
    }
}
