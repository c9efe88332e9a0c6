//! Wire fixtures shared by the codec benchmarks.

/// Which side of an exchange a fixture holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// A captured HTTP message, embedded at compile time.
#[derive(Debug, Copy, Clone)]
pub struct Fixture {
    name: &'static str,
    direction: Direction,
    file_name: &'static str,
    content: &'static str,
}

impl Fixture {
    pub const fn request(name: &'static str, file_name: &'static str, content: &'static str) -> Self {
        Self { name, direction: Direction::Request, file_name, content }
    }

    pub const fn response(name: &'static str, file_name: &'static str, content: &'static str) -> Self {
        Self { name, direction: Direction::Response, file_name, content }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// Size in bytes, for throughput reporting.
    pub fn len(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
