//! Global constants for the cg front end

use cg_ui::Size;

// =============================================================================
// Push channel
// =============================================================================

/// Host the push-update server listens on
pub const DEFAULT_WS_HOST: &str = "127.0.0.1";

/// Port the push-update server listens on
pub const DEFAULT_WS_PORT: u16 = 47761;

/// Fixed delay between reconnect attempts
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;

/// Reconnect attempts before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 10;

// =============================================================================
// Suggestion service
// =============================================================================

/// Path of the two-step completion call
pub const SUGGEST_CALL_PATH: &str = "/gradio_api/call/update_suggestions_js";

// =============================================================================
// Persisted keys
// =============================================================================

/// Shared position of the loading overlay and the button panel
pub const KEY_OVERLAY_POSITION: &str = "overlayPosition";
pub const KEY_CUSTOM_OVERLAY_POSITION: &str = "customOverlayPosition";
pub const KEY_CUSTOM_OVERLAY_SIZE: &str = "customOverlaySize";
pub const KEY_GRID_ASPECT_RATIO: &str = "gridAspectRatio";

/// localStorage key of the exported configuration
pub const CONFIG_STORAGE_KEY: &str = "cg-frontend-config";

// =============================================================================
// Loading overlay
// =============================================================================

pub const DEFAULT_LOADING_MESSAGE: &str = "Processing...";
pub const DEFAULT_ELAPSED_PREFIX: &str = "Time elapsed: ";
pub const DEFAULT_ELAPSED_SUFFIX: &str = "sec";

/// Refresh interval of the elapsed-time counter
pub const LOADING_TICK_MS: u64 = 100;

/// Nominal loading overlay size, used to centre it before it is measured
pub const LOADING_OVERLAY_SIZE: Size = Size {
    width: 300.0,
    height: 220.0,
};

/// Vertical anchor of the loading overlay as a fraction of viewport height
pub const LOADING_ANCHOR_Y: f32 = 0.2;

// =============================================================================
// Button panel
// =============================================================================

pub const BUTTON_PANEL_WIDTH: f32 = 240.0;
pub const BUTTON_PANEL_SIZE: Size = Size {
    width: BUTTON_PANEL_WIDTH,
    height: 110.0,
};

/// Vertical anchor of the button panel as a fraction of viewport height
pub const BUTTON_PANEL_ANCHOR_Y: f32 = 0.8;

// =============================================================================
// Custom overlay
// =============================================================================

pub const CUSTOM_OVERLAY_DEFAULT_SIZE: Size = Size {
    width: 600.0,
    height: 800.0,
};

/// Vertical anchor of the custom overlay as a fraction of viewport height
pub const CUSTOM_OVERLAY_ANCHOR_Y: f32 = 0.1;

/// Default colour of `[COPY_CUSTOM]` text in the error overlay
pub const ERROR_TEXT_COLOR: &str = "#000000";

/// Default colour of `[COPY_CUSTOM]` text in the custom overlay
pub const CUSTOM_TEXT_COLOR: &str = "#ffffff";

// =============================================================================
// Gallery
// =============================================================================

/// Height of a grid cell; width follows the image aspect ratio
pub const DEFAULT_GRID_CELL_HEIGHT: f32 = 200.0;

/// Horizontal gap counted per grid column
pub const GRID_CELL_GAP: f32 = 10.0;

/// Aspect ratio change that forces a full grid redraw
pub const GRID_ASPECT_EPSILON: f32 = 0.001;

/// Thumbnail strip cells are `container_height / THUMB_HEIGHT_DIVISOR` tall
pub const THUMB_HEIGHT_DIVISOR: f32 = 1.2;

/// Lowest and highest seed the random-seed input accepts
pub const SEED_MIN: i64 = -1;
pub const SEED_MAX: i64 = 4_294_967_295;

/// Seed value meaning "pick a random seed"
pub const RANDOM_SEED: i64 = -1;

// =============================================================================
// Privacy balls
// =============================================================================

/// Balls that may be on screen at once
pub const PRIVACY_BALL_MAX: usize = 5;

/// Edge length of a new ball
pub const PRIVACY_BALL_SIZE: f32 = 100.0;

/// Size limits while resizing with the right button
pub const PRIVACY_BALL_MIN_SIZE: f32 = 20.0;
pub const PRIVACY_BALL_MAX_SIZE: f32 = 300.0;

/// Label font size as a fraction of the ball size
pub const PRIVACY_BALL_FONT_FACTOR: f32 = 0.2;

pub const PRIVACY_BALL_LABEL: &str = "SAA";

// =============================================================================
// Thumbnail hover overlay
// =============================================================================

/// Nominal overlay size, used for placement before it is measured
pub const THUMB_OVERLAY_SIZE: Size = Size {
    width: 327.0,
    height: 480.0,
};

/// Gap between the option list and an overlay shown to its right
pub const THUMB_OVERLAY_GAP: f32 = 30.0;

/// Gap to the option list on the left and to the viewport edges
pub const THUMB_OVERLAY_MARGIN: f32 = 10.0;

// =============================================================================
// Helper Functions
// =============================================================================

/// URL of the push-update endpoint
#[inline]
pub fn ws_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}/ws", host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        assert_eq!(
            ws_url(DEFAULT_WS_HOST, DEFAULT_WS_PORT),
            "ws://127.0.0.1:47761/ws"
        );
    }
}
