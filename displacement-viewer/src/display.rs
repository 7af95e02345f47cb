use anyhow::{anyhow, Result};
use minifb::{Key, Window, WindowOptions};

/// Open a window showing an RGB frame and block until it is closed
/// (or Escape is pressed).
pub fn show_blocking(title: &str, width: u32, height: u32, rgb: &[u8]) -> Result<()> {
    let (w, h) = (width as usize, height as usize);
    if rgb.len() != w * h * 3 {
        return Err(anyhow!(
            "Frame buffer holds {} bytes, expected {} for {}x{} RGB",
            rgb.len(),
            w * h * 3,
            width,
            height
        ));
    }
    let frame = rgb_to_0rgb(rgb);

    let mut window = Window::new(title, w, h, WindowOptions::default())
        .map_err(|e| anyhow!("Failed to open window: {}", e))?;
    window.set_target_fps(30);

    tracing::info!("Showing plot, close the window to exit");
    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&frame, w, h)
            .map_err(|e| anyhow!("Failed to update window: {}", e))?;
    }
    Ok(())
}

/// Pack `[r, g, b]` triples into the `0RGB` words the window expects.
pub fn rgb_to_0rgb(rgb: &[u8]) -> Vec<u32> {
    rgb.chunks_exact(3)
        .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | p[2] as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_pixels_in_order() {
        let packed = rgb_to_0rgb(&[255, 0, 0, 0, 128, 255]);
        assert_eq!(packed, vec![0x00ff_0000, 0x0000_80ff]);
    }

    #[test]
    fn rejects_a_buffer_of_the_wrong_size() {
        // fails before any window is created
        assert!(show_blocking("test", 4, 4, &[0u8; 10]).is_err());
    }
}
