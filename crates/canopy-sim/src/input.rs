use serde::{Deserialize, Serialize};

/// Held-key state supplied by the host each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub action: bool,
}

impl InputState {
    /// -1.0, 0.0 or +1.0. Opposite keys cancel out.
    pub fn move_dir(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.up || self.down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_keys_cancel() {
        let both = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.move_dir(), 0.0);
        assert!(both.horizontal());
    }

    #[test]
    fn single_direction() {
        let left = InputState {
            left: true,
            ..Default::default()
        };
        assert_eq!(left.move_dir(), -1.0);
        assert!(!left.vertical());
    }
}
