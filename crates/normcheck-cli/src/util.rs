use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Read as _, StdoutLock, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};

/// Largest input accepted by [`read_input`], in bytes.
pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.finish()
    }

    pub fn finish(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Read the whole input as text, from `path` or from stdin when `None`.
///
/// # Errors
///
/// Returns error if the input cannot be read, is not UTF-8, or is larger
/// than [`MAX_INPUT_BYTES`]
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    let mut text = String::new();
    let source = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("Failed to stat input file: {}", path.display()))?
                .len();
            if len > MAX_INPUT_BYTES {
                bail!(
                    "{} is too large ({len} bytes, limit is {MAX_INPUT_BYTES} bytes)",
                    path.display()
                );
            }
            file.take(MAX_INPUT_BYTES + 1)
                .read_to_string(&mut text)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            path.display().to_string()
        }
        None => {
            io::stdin()
                .lock()
                .take(MAX_INPUT_BYTES + 1)
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            "stdin".to_owned()
        }
    };
    if text.len() as u64 > MAX_INPUT_BYTES {
        bail!("{source} exceeds the input limit of {MAX_INPUT_BYTES} bytes");
    }
    Ok(text)
}

/// Write a horizontal `#` bar chart, one row per `(label, count)` pair.
pub fn write_histogram<W, I, S>(writer: &mut W, data: I) -> io::Result<()>
where
    W: Write,
    I: Iterator<Item = (S, usize)>,
    S: fmt::Display,
{
    let data = data.collect::<Vec<_>>();
    let max_count = data.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1);
    let max_bar_width = 50;
    for (label, count) in &data {
        let bar_width = (count * max_bar_width) / max_count;
        writeln!(
            writer,
            "{:>23} | {:<7} {}",
            label,
            count,
            "#".repeat(bar_width)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_bars_scale_to_max() {
        let mut buf = Vec::new();
        write_histogram(&mut buf, [("a", 10), ("b", 5), ("c", 0)].into_iter()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with(&"#".repeat(50)));
        assert!(lines[1].ends_with(&format!(" {}", "#".repeat(25))));
        assert!(!lines[2].contains('#'));
    }

    #[test]
    fn test_histogram_all_zero() {
        let mut buf = Vec::new();
        write_histogram(&mut buf, [("a", 0)].into_iter()).unwrap();
        assert!(!String::from_utf8(buf).unwrap().contains('#'));
    }
}
