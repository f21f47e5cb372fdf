// src/buffer/cursor.rs

use crate::geometry::Point;

/// Represents the visual shape of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorType {
    /// Bottom-anchored block whose height follows `size_percent`.
    #[default]
    Legacy,
    VerticalBar,
    Underscore,
    EmptyBox,
    FullBox,
    DoubleUnderscore,
}

/// The text buffer's cursor.
///
/// Every setter bumps `mutation_id`, which the renderer watches to restart
/// the blink cycle with the cursor shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    position: Point,
    visible: bool,
    blinking: bool,
    size_percent: u32,
    double: bool,
    cursor_type: CursorType,
    mutation_id: u64,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Point::default(),
            visible: true,
            blinking: true,
            size_percent: 25,
            double: false,
            cursor_type: CursorType::Legacy,
            mutation_id: 0,
        }
    }
}

impl Cursor {
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.mutation_id += 1;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.mutation_id += 1;
    }

    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    pub fn set_blinking(&mut self, blinking: bool) {
        self.blinking = blinking;
        self.mutation_id += 1;
    }

    /// Cursor height as a percentage of the cell height (1-100).
    pub fn size_percent(&self) -> u32 {
        self.size_percent
    }

    pub fn set_size_percent(&mut self, percent: u32) {
        self.size_percent = percent.clamp(1, 100);
        self.mutation_id += 1;
    }

    /// True in overwrite mode, where the cursor is drawn at double (or half) size.
    pub fn is_double(&self) -> bool {
        self.double
    }

    pub fn set_double(&mut self, double: bool) {
        self.double = double;
        self.mutation_id += 1;
    }

    pub fn cursor_type(&self) -> CursorType {
        self.cursor_type
    }

    pub fn set_cursor_type(&mut self, cursor_type: CursorType) {
        self.cursor_type = cursor_type;
        self.mutation_id += 1;
    }

    pub fn last_mutation_id(&self) -> u64 {
        self.mutation_id
    }
}
