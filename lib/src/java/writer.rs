//! Line-oriented writer for Java source with brace-driven indentation.

use std::fmt;
use std::io::{Result, Write};

pub struct JavaWriter<W: Write> {
    /// How many blocks have been opened but not closed? This determines how indented new lines
    /// should be.
    open_blocks: usize,

    inner: W,
}

impl<W: Write> JavaWriter<W> {
    const INDENT: &'static [u8] = b"    ";

    pub fn new(inner: W) -> JavaWriter<W> {
        JavaWriter {
            open_blocks: 0,
            inner,
        }
    }

    fn indent(&mut self) -> Result<()> {
        for _ in 0..self.open_blocks {
            self.inner.write_all(Self::INDENT)?;
        }
        Ok(())
    }

    /// Write one indented line
    pub fn line(&mut self, code: fmt::Arguments<'_>) -> Result<()> {
        self.indent()?;
        self.inner.write_fmt(code)?;
        self.inner.write_all(b"\n")
    }

    /// Write an empty line (no trailing indentation)
    pub fn blank(&mut self) -> Result<()> {
        self.inner.write_all(b"\n")
    }

    /// Write `header {` and indent what follows
    pub fn open_block(&mut self, header: fmt::Arguments<'_>) -> Result<()> {
        self.indent()?;
        self.inner.write_fmt(header)?;
        self.inner.write_all(b" {\n")?;
        self.open_blocks += 1;
        Ok(())
    }

    /// Close the current block and immediately open a sibling, as in `} catch (E e) {`
    pub fn continue_block(&mut self, header: fmt::Arguments<'_>) -> Result<()> {
        assert!(self.open_blocks > 0, "no block to continue");
        self.open_blocks -= 1;
        self.indent()?;
        self.inner.write_all(b"} ")?;
        self.inner.write_fmt(header)?;
        self.inner.write_all(b" {\n")?;
        self.open_blocks += 1;
        Ok(())
    }

    /// Write the closing `}` of the current block
    pub fn close_block(&mut self) -> Result<()> {
        assert!(self.open_blocks > 0, "no blocks to close");
        self.open_blocks -= 1;
        self.indent()?;
        self.inner.write_all(b"}\n")
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        assert_eq!(self.open_blocks, 0, "un-closed blocks remain");
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn nested_blocks() -> Result<()> {
        let mut java_writer = JavaWriter::new(vec![]);

        java_writer.open_block(format_args!("static"))?;
        java_writer.open_block(format_args!("try"))?;
        java_writer.line(format_args!("OFFSET = {};", 16))?;
        java_writer.continue_block(format_args!("catch (Exception e)"))?;
        java_writer.line(format_args!("throw new Error(e);"))?;
        java_writer.close_block()?;
        java_writer.close_block()?;
        java_writer.blank()?;
        let output = java_writer.finish()?;

        assert_eq!(
            std::str::from_utf8(&output).unwrap(),
            r#"static {
    try {
        OFFSET = 16;
    } catch (Exception e) {
        throw new Error(e);
    }
}

"#
        );
        Ok(())
    }

    #[test]
    #[should_panic(expected = "un-closed blocks remain")]
    fn unclosed_block_panics() {
        let mut java_writer = JavaWriter::new(vec![]);
        java_writer.open_block(format_args!("class Foo")).unwrap();
        let _ = java_writer.finish();
    }
}
