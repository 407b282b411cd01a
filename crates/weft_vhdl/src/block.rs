//! Text blocks with column alignment.
//!
//! Generated VHDL is assembled from [`Line`]s split into parts. A
//! [`Block`] aligns the parts of its lines into columns before
//! rendering, so declarations and port maps come out with their colons
//! and arrows lined up.

/// One output line, split at alignment points.
#[derive(Debug, Clone, Default)]
pub struct Line {
    parts: Vec<String>,
}

impl Line {
    /// An empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// A line with a single part.
    pub fn of(text: impl Into<String>) -> Self {
        Self {
            parts: vec![text.into()],
        }
    }

    /// Appends an alignment part.
    pub fn add(&mut self, part: impl Into<String>) -> &mut Self {
        self.parts.push(part.into());
        self
    }

    /// Appends text to the last part, starting one if none exists.
    pub fn append(&mut self, text: &str) -> &mut Self {
        match self.parts.last_mut() {
            Some(last) => last.push_str(text),
            None => self.parts.push(text.to_string()),
        }
        self
    }

    /// The parts of this line.
    pub fn parts(&self) -> &[String] {
        self.parts.as_slice()
    }
}

/// A group of lines rendered with shared column alignment.
#[derive(Debug, Clone, Default)]
pub struct Block {
    lines: Vec<Line>,
    indent: usize,
}

impl Block {
    /// An empty block at indent level zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty block at the given indent level (two spaces each).
    pub fn indented(indent: usize) -> Self {
        Self {
            lines: Vec::new(),
            indent,
        }
    }

    /// Appends a line.
    pub fn add(&mut self, line: Line) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Appends a single-part line.
    pub fn add_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line::of(text));
        self
    }

    /// Appends every line of another block, keeping this block's indent.
    pub fn extend(&mut self, other: Block) -> &mut Self {
        self.lines.extend(other.lines);
        self
    }

    /// Whether the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Appends `suffix` to the last part of the last line, if any.
    pub fn append_last(&mut self, suffix: &str) -> &mut Self {
        if let Some(line) = self.lines.last_mut() {
            line.append(suffix);
        }
        self
    }

    /// Renders the block: parts of each line are padded to the widest
    /// part in the same column across the block.
    pub fn render(&self) -> String {
        let columns = self
            .lines
            .iter()
            .map(|l| l.parts.len())
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for line in &self.lines {
            for (i, part) in line.parts.iter().enumerate() {
                // The last part of a line never pads.
                if i + 1 < line.parts.len() {
                    widths[i] = widths[i].max(part.len());
                }
            }
        }
        let pad = "  ".repeat(self.indent);
        let mut out = String::new();
        for line in &self.lines {
            let mut text = pad.clone();
            for (i, part) in line.parts.iter().enumerate() {
                if i + 1 < line.parts.len() {
                    text.push_str(&format!("{:width$}", part, width = widths[i]));
                } else {
                    text.push_str(part);
                }
            }
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out
    }
}

/// A sequence of blocks rendered in order, each with its own alignment.
#[derive(Debug, Clone, Default)]
pub struct MultiBlock {
    blocks: Vec<Block>,
}

impl MultiBlock {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block.
    pub fn add(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    /// Renders all blocks in order.
    pub fn render(&self) -> String {
        self.blocks.iter().map(Block::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_across_lines() {
        let mut b = Block::new();
        let mut l1 = Line::new();
        l1.add("a ").add(": in  ").add("std_logic;");
        let mut l2 = Line::new();
        l2.add("data ").add(": out ").add("std_logic_vector(7 downto 0)");
        b.add(l1).add(l2);
        let text = b.render();
        assert_eq!(
            text,
            "a    : in  std_logic;\ndata : out std_logic_vector(7 downto 0)\n"
        );
    }

    #[test]
    fn indent_prefixes_every_line() {
        let mut b = Block::indented(2);
        b.add_text("x <= y;");
        assert_eq!(b.render(), "    x <= y;\n");
    }

    #[test]
    fn append_last_adds_punctuation() {
        let mut b = Block::new();
        b.add_text("x");
        b.add_text("y");
        b.append_last(";");
        assert_eq!(b.render(), "x\ny;\n");
    }

    #[test]
    fn empty_lines_render_blank() {
        let mut b = Block::new();
        b.add(Line::new());
        assert_eq!(b.render(), "\n");
    }
}
