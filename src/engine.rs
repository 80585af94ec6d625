use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use raylib::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::constants::*;
use crate::error::ViewerError;
use crate::layout::aspect_fit;
use crate::pacing::{FpsMeter, FramePacer};
use crate::playlist::Playlist;
use crate::state::{Command, Flow};
use crate::texture_loader::{load_sorted_image_paths, load_texture_with_exif_rotation};

/// Runtime options collected from the command line.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub directory: PathBuf,
    pub fullscreen: bool,
    pub target_fps: u32,
}

struct DisplayContext {
    rl: RaylibHandle,
    thread: RaylibThread,
}

/// Owns the window, every decoded texture and the playback cursor.
///
/// Resources are released in `shutdown`: textures first, then the
/// framebuffer, then the window and GL context. `Drop` calls it, so every exit
/// path after the window opened cleans up exactly once.
pub struct SlideshowEngine {
    playlist: Playlist<Texture2D>,
    framebuffer: Option<RenderTexture2D>,
    display: Option<DisplayContext>,
    target_fps: u32,
}

impl SlideshowEngine {
    pub fn initialize(options: &ViewerOptions) -> Result<Self, ViewerError> {
        // Fail on a bad directory before a window ever appears.
        let paths = load_sorted_image_paths(&options.directory)?;
        info!(count = paths.len(), dir = %options.directory.display(), "found images");

        let (mut rl, thread) = open_window(options.fullscreen)?;
        rl.set_trace_log(TraceLogLevel::LOG_ERROR);
        rl.set_exit_key(Some(KeyboardKey::KEY_ESCAPE));
        debug!(
            width = rl.get_screen_width(),
            height = rl.get_screen_height(),
            fullscreen = options.fullscreen,
            "window opened"
        );

        let mut engine = Self {
            playlist: Playlist::from_entries(Vec::new()),
            framebuffer: None,
            display: Some(DisplayContext { rl, thread }),
            target_fps: options.target_fps,
        };
        engine.recreate_framebuffer()?;
        engine.load_images(paths);

        println!("Initialized successfully with {} images", engine.playlist.len());
        println!("Target framerate: {} FPS", engine.target_fps);
        println!("Controls: Space=Play/Pause, Left/Right=Prev/Next, ESC=Quit");
        Ok(engine)
    }

    fn load_images(&mut self, paths: Vec<PathBuf>) {
        let Some(DisplayContext { rl, thread }) = self.display.as_mut() else {
            return;
        };
        self.playlist = Playlist::load(paths, |path| {
            load_texture_with_exif_rotation(rl, thread, path)
        });
    }

    fn recreate_framebuffer(&mut self) -> Result<(), ViewerError> {
        let Some(DisplayContext { rl, thread }) = self.display.as_mut() else {
            return Ok(());
        };
        let width = rl.get_screen_width().max(1) as u32;
        let height = rl.get_screen_height().max(1) as u32;

        // Release the old target before allocating its replacement.
        self.framebuffer = None;
        let framebuffer = rl
            .load_render_texture(thread, width, height)
            .map_err(|e| ViewerError::DisplayInit(format!("failed to create framebuffer: {}", e)))?;
        let framebuffer = self.framebuffer.insert(framebuffer);

        // Fresh render textures hold undefined pixels.
        let mut d = rl.begin_texture_mode(thread, framebuffer);
        d.clear_background(Color::BLACK);
        Ok(())
    }

    pub fn run(&mut self) {
        if self.playlist.is_empty() || self.display.is_none() {
            warn!("cannot run: viewer not properly initialized");
            return;
        }

        self.render_current_frame();

        let start = Instant::now();
        let mut pacer = FramePacer::new(self.target_fps, start);
        let mut meter = FpsMeter::new(start);
        debug!(interval = ?pacer.interval(), "frame pacing");

        loop {
            self.handle_resize();

            for command in self.poll_commands() {
                let was_playing = self.playlist.is_playing();
                match self.playlist.apply(command) {
                    Flow::Exit => {
                        info!("exit requested");
                        return;
                    }
                    Flow::Redraw => self.render_current_frame(),
                    Flow::Idle => {}
                }
                if !was_playing && self.playlist.is_playing() {
                    let now = Instant::now();
                    pacer.reset(now);
                    meter.reset(now);
                }
                debug!(state = ?self.playlist.state(), index = self.playlist.current_index(), "command {:?}", command);
            }

            if self.playlist.is_playing() {
                let now = Instant::now();
                if pacer.tick(now) {
                    self.playlist.advance();
                    self.render_current_frame();
                    meter.record_frame();
                }
                if let Some(fps) = meter.sample(now) {
                    self.set_title(&format!("{} - {} FPS", WINDOW_TITLE, fps));
                }
            } else {
                thread::sleep(IDLE_SLEEP);
            }

            self.present();
        }
    }

    fn poll_commands(&self) -> Vec<Command> {
        let Some(DisplayContext { rl, .. }) = self.display.as_ref() else {
            return vec![Command::Quit];
        };
        if rl.window_should_close() {
            return vec![Command::Quit];
        }

        let mut commands = Vec::new();
        if rl.is_key_pressed(KeyboardKey::KEY_SPACE) {
            commands.push(Command::TogglePlay);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_RIGHT) {
            commands.push(Command::Next);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_LEFT) {
            commands.push(Command::Previous);
        }
        commands
    }

    fn handle_resize(&mut self) {
        let resized = self
            .display
            .as_ref()
            .is_some_and(|display| display.rl.is_window_resized());
        if !resized {
            return;
        }
        match self.recreate_framebuffer() {
            Ok(()) => self.render_current_frame(),
            Err(e) => warn!("{}", e),
        }
    }

    fn set_title(&mut self, title: &str) {
        if let Some(DisplayContext { rl, thread }) = self.display.as_mut() {
            rl.set_window_title(thread, title);
        }
    }

    /// Draw the current image, aspect-fit and centred, into the framebuffer.
    ///
    /// Does nothing when the current entry failed to decode; the last drawn
    /// image stays on screen.
    pub fn render_current_frame(&mut self) {
        let Some(entry) = self.playlist.current() else {
            return;
        };
        let Some(texture) = entry.texture.as_ref() else {
            trace!(path = %entry.path.display(), "no texture, frame skipped");
            return;
        };
        let (Some(DisplayContext { rl, thread }), Some(framebuffer)) =
            (self.display.as_mut(), self.framebuffer.as_mut())
        else {
            return;
        };
        let Some(dest) = aspect_fit(
            texture.width(),
            texture.height(),
            framebuffer.width(),
            framebuffer.height(),
        ) else {
            return;
        };

        let mut d = rl.begin_texture_mode(thread, framebuffer);
        d.clear_background(Color::BLACK);
        d.draw_texture_pro(
            texture,
            Rectangle::new(0.0, 0.0, texture.width() as f32, texture.height() as f32),
            dest.to_rectangle(),
            Vector2::new(0.0, 0.0),
            0.0,
            Color::WHITE,
        );
    }

    // Blit the framebuffer to the window. Ending the frame also polls input.
    fn present(&mut self) {
        let (Some(DisplayContext { rl, thread }), Some(framebuffer)) =
            (self.display.as_mut(), self.framebuffer.as_ref())
        else {
            return;
        };

        let mut d = rl.begin_drawing(thread);
        d.clear_background(Color::BLACK);
        // Render textures are stored upside down.
        d.draw_texture_pro(
            framebuffer,
            Rectangle::new(0.0, 0.0, framebuffer.width() as f32, -(framebuffer.height() as f32)),
            Rectangle::new(0.0, 0.0, framebuffer.width() as f32, framebuffer.height() as f32),
            Vector2::new(0.0, 0.0),
            0.0,
            Color::WHITE,
        );
    }

    pub fn shutdown(&mut self) {
        self.playlist.release_textures();
        self.framebuffer = None;
        if self.display.take().is_some() {
            info!("display closed");
        }
    }
}

impl Drop for SlideshowEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_window(fullscreen: bool) -> Result<(RaylibHandle, RaylibThread), ViewerError> {
    let mut builder = raylib::init();
    builder.title(WINDOW_TITLE).resizable();
    if fullscreen {
        // Zero size lets raylib take the desktop resolution.
        builder.size(0, 0).fullscreen();
    } else {
        builder.size(WINDOW_WIDTH, WINDOW_HEIGHT);
    }
    // raylib panics when the window or GL context cannot be created.
    catch_init_panic(|| builder.build())
}

/// Run `init`, turning a panic into `ViewerError::DisplayInit`.
///
/// The default panic hook is silenced for the duration so the failure is
/// reported once, through the returned error.
fn catch_init_panic<T>(init: impl FnOnce() -> T) -> Result<T, ViewerError> {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let result = panic::catch_unwind(AssertUnwindSafe(init));
    panic::set_hook(hook);
    result.map_err(|payload| ViewerError::DisplayInit(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "window creation failed".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_failure_becomes_display_init_error() {
        let result: Result<(), _> =
            catch_init_panic(|| panic!("Attempting to create window failed!"));
        match result {
            Err(ViewerError::DisplayInit(msg)) => {
                assert_eq!(msg, "Attempting to create window failed!")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let code = 7;
        let result: Result<(), _> = catch_init_panic(|| panic!("no GL context ({code})"));
        assert!(matches!(
            result,
            Err(ViewerError::DisplayInit(msg)) if msg == "no GL context (7)"
        ));
    }

    #[test]
    fn successful_init_passes_through() {
        assert_eq!(catch_init_panic(|| 42).unwrap(), 42);
    }

    #[test]
    fn opaque_payload_gets_generic_message() {
        let result: Result<(), _> = catch_init_panic(|| std::panic::panic_any(3u8));
        assert!(matches!(
            result,
            Err(ViewerError::DisplayInit(msg)) if msg == "window creation failed"
        ));
    }
}
