use readwise_common::{Highlight, HighlightRecord};
use regex::Regex;
use std::io::Write;

/// First line of any paste Tana should parse as structured nodes.
pub const TANA_PASTE_MARKER: &str = "%%tana%%";

const HEADING_NOTES: [&str; 3] = [".h1", ".h2", ".h3"];

/// A bullet that went through a latin-1 round trip somewhere upstream, plus its ASCII padding.
const MANGLED_BULLET: &str = r"â€¢[\t\n\x0C\r ]+";

const SECURE_SCHEME: &str = "https://";

pub struct TanaFormatter {
    mangled_bullet: Regex,
}

impl TanaFormatter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            mangled_bullet: Regex::new(MANGLED_BULLET)?,
        })
    }

    /// Writes the paste marker followed by the outline.
    pub fn write_paste<W: Write>(
        &self,
        out: &mut W,
        records: &mut [HighlightRecord],
    ) -> std::io::Result<()> {
        writeln!(out, "{}", TANA_PASTE_MARKER)?;
        self.write(out, records)
    }

    /// Writes one node per record. Each record's highlights are put in location order first.
    pub fn write<W: Write>(
        &self,
        out: &mut W,
        records: &mut [HighlightRecord],
    ) -> std::io::Result<()> {
        for record in records.iter_mut() {
            self.write_record(out, record)?;
        }

        Ok(())
    }

    fn write_record<W: Write>(
        &self,
        out: &mut W,
        record: &mut HighlightRecord,
    ) -> std::io::Result<()> {
        writeln!(out, "- {} #readwise", record.title)?;

        if let Some(source_url) = record
            .source_url
            .as_deref()
            .filter(|url| url.starts_with(SECURE_SCHEME))
        {
            writeln!(out, "  - Source URL:: {}", source_url)?;
        }

        writeln!(out, "  - Type:: {}", record.category.label())?;
        writeln!(out, "  - Author:: {}", record.author.as_deref().unwrap_or_default())?;
        writeln!(
            out,
            "  - Readwise URL:: {}",
            record.readwise_url.as_deref().unwrap_or_default()
        )?;

        if !record.highlights.is_empty() {
            writeln!(out, "  - Highlights")?;
            record.sort_highlights();

            for highlight in &record.highlights {
                self.write_highlight(out, highlight)?;
            }
        }

        Ok(())
    }

    fn write_highlight<W: Write>(&self, out: &mut W, highlight: &Highlight) -> std::io::Result<()> {
        let heading = Some(highlight.note.as_str()).filter(|note| HEADING_NOTES.contains(note));

        for line in highlight.text.split('\n') {
            let line = self.clean_line(line);
            if line.is_empty() {
                continue;
            }

            match heading {
                Some(heading) => writeln!(out, "    - {} {}", heading, line)?,
                None => writeln!(out, "    - {}", line)?,
            }
        }

        Ok(())
    }

    /// Trims the line and drops any mangled bullets in it.
    pub fn clean_line(&self, line: &str) -> String {
        self.mangled_bullet
            .replace_all(line.trim(), "")
            .into_owned()
    }
}
