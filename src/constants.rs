use std::time::Duration;

pub const WINDOW_WIDTH: i32 = 1280;                        // Windowed mode width
pub const WINDOW_HEIGHT: i32 = 720;                        // Windowed mode height
pub const WINDOW_TITLE: &str = "High-Speed Timelapse Viewer";

pub const DEFAULT_FPS: u32 = 240;                          // Target playback rate
pub const IDLE_SLEEP: Duration = Duration::from_millis(10); // Pause between polls while paused
pub const PROGRESS_INTERVAL: usize = 10;                   // Report loading progress every N images

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];
