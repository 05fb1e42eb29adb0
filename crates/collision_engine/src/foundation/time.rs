//! Time management utilities

/// Per-frame timing context handed to [`CollisionManager::update`]
///
/// [`CollisionManager::update`]: crate::physics::CollisionManager::update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppData {
    frame_number: u64,
    delta_time: f32,
    total_time: f32,
    frame_speed_multiplier: f32,
}

impl Default for AppData {
    fn default() -> Self {
        Self::new()
    }
}

impl AppData {
    /// Create the context for the first frame
    pub fn new() -> Self {
        Self {
            frame_number: 0,
            delta_time: 0.0,
            total_time: 0.0,
            frame_speed_multiplier: 1.0,
        }
    }

    /// Set the frame-speed multiplier (builder pattern)
    pub fn with_frame_speed_multiplier(mut self, multiplier: f32) -> Self {
        self.frame_speed_multiplier = multiplier;
        self
    }

    /// Context for the following frame, `delta_time` seconds later
    pub fn next_frame(&self, delta_time: f32) -> Self {
        Self {
            frame_number: self.frame_number + 1,
            delta_time,
            total_time: self.total_time + delta_time,
            frame_speed_multiplier: self.frame_speed_multiplier,
        }
    }

    /// Advance this context in place (should be called once per frame)
    pub fn advance(&mut self, delta_time: f32) {
        *self = self.next_frame(delta_time);
    }

    /// Monotonic frame counter
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Total elapsed time in seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Multiplier applied to simulation speed
    pub fn frame_speed_multiplier(&self) -> f32 {
        self.frame_speed_multiplier
    }

    /// Delta time scaled by the frame-speed multiplier
    pub fn scaled_delta_time(&self) -> f32 {
        self.delta_time * self.frame_speed_multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut app = AppData::new().with_frame_speed_multiplier(2.0);
        app.advance(0.5);
        app.advance(0.25);

        assert_eq!(app.frame_number(), 2);
        assert_eq!(app.total_time(), 0.75);
        assert_eq!(app.scaled_delta_time(), 0.5);
    }
}
