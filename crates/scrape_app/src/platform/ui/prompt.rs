use std::io::{self, BufRead, Write};

/// Line-oriented terminal. `show` prints only lines that were not part of
/// the previous render.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    shown: Vec<String>,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            shown: Vec::new(),
        }
    }

    /// `Ok(None)` at end of input.
    pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn show(&mut self, lines: Vec<String>) -> io::Result<()> {
        for line in lines.iter().filter(|line| !self.shown.contains(line)) {
            writeln!(self.output, "{line}")?;
        }
        self.output.flush()?;
        self.shown = lines;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
