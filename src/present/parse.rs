use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use super::style::markdown_to_html;
use super::{Author, Doc, Elem, ParseError, ParseMode, Section};

/// Source lines with comment lines removed; each keeps its 1-based line number.
struct Lines<'a> {
    lines: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(src: &'a str) -> Self {
        let lines = src
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.starts_with("//"))
            .map(|(i, line)| (i + 1, line))
            .collect();
        Self { lines, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a str> {
        let (_, line) = *self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|&(_, line)| line)
    }

    fn back(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Line number of the line most recently returned by `next`
    fn line_no(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map_or(0, |&(n, _)| n)
    }
}

pub(super) struct Parser<'a> {
    lines: Lines<'a>,
    name: String,
    base: PathBuf,
    markdown: bool,
}

impl<'a> Parser<'a> {
    pub(super) fn new(src: &'a str, name: &Path) -> Self {
        Self {
            lines: Lines::new(src),
            name: name.display().to_string(),
            base: name.parent().map(Path::to_path_buf).unwrap_or_default(),
            markdown: false,
        }
    }

    pub(super) fn parse(mut self, mode: ParseMode) -> Result<Doc, ParseError> {
        let mut doc = Doc::default();
        let title = loop {
            match self.lines.next() {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line.trim(),
                None => return Err(ParseError::UnexpectedEof { name: self.name }),
            }
        };
        doc.title = match title.strip_prefix("# ") {
            Some(rest) => {
                self.markdown = true;
                rest.trim().to_string()
            }
            None => title.to_string(),
        };
        self.parse_header(&mut doc)?;
        if mode == ParseMode::TitlesOnly {
            return Ok(doc);
        }
        doc.authors = self.parse_authors();
        doc.sections = self.parse_sections()?;
        Ok(doc)
    }

    fn parse_header(&mut self, doc: &mut Doc) -> Result<(), ParseError> {
        let mut first = true;
        while let Some(raw) = self.lines.next() {
            let line = raw.trim();
            if line.is_empty() {
                break;
            }
            if self.section_header(raw).is_some() {
                self.lines.back();
                break;
            }
            if let Some(tags) = line.strip_prefix("Tags:") {
                doc.tags = tags
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect();
            } else if let Some(summary) = line.strip_prefix("Summary:") {
                doc.summary = summary.trim().to_string();
            } else if let Some(url) = line.strip_prefix("OldURL:") {
                doc.old_url.push(url.trim().to_string());
            } else if let Some(time) = parse_time(line) {
                doc.time = Some(time);
            } else if first {
                doc.subtitle = line.to_string();
            } else {
                return Err(self.syntax(format!("unexpected header line {line:?}")));
            }
            first = false;
        }
        Ok(())
    }

    fn parse_authors(&mut self) -> Vec<Author> {
        let mut authors = Vec::new();
        let mut current = Vec::new();
        while let Some(raw) = self.lines.next() {
            if self.section_header(raw).is_some() {
                self.lines.back();
                break;
            }
            let line = raw.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    authors.push(Author { lines: mem::take(&mut current) });
                }
            } else {
                current.push(line.to_string());
            }
        }
        if !current.is_empty() {
            authors.push(Author { lines: current });
        }
        authors
    }

    fn parse_sections(&mut self) -> Result<Vec<Section>, ParseError> {
        let mut sections = Vec::new();
        let mut counters: Vec<usize> = Vec::new();
        while let Some(raw) = self.lines.next() {
            if raw.trim().is_empty() {
                continue;
            }
            let Some((depth, title)) = self.section_header(raw) else {
                return Err(self.syntax("expected section header".to_string()));
            };
            counters.resize(depth, 0);
            if let Some(last) = counters.last_mut() {
                *last += 1;
            }
            let mut section = Section {
                number: counters.clone(),
                title: title.to_string(),
                ..Section::default()
            };
            self.parse_body(&mut section)?;
            sections.push(section);
        }
        Ok(sections)
    }

    fn parse_body(&mut self, section: &mut Section) -> Result<(), ParseError> {
        while let Some(raw) = self.lines.next() {
            if self.section_header(raw).is_some() {
                self.lines.back();
                break;
            }
            if raw.trim().is_empty() {
                continue;
            }
            if let Some(note) = note_text(raw) {
                section.notes.push(note.to_string());
                continue;
            }
            if is_command(raw) {
                self.parse_command(raw, section)?;
                continue;
            }
            let elem = if self.markdown {
                let block = self.take_block(raw, |p, line| !p.ends_block(line));
                Elem::Html { html: markdown_to_html(&block.join("\n")) }
            } else if raw.starts_with("- ") {
                let block = self.take_block(raw, |_, line| line.starts_with("- "));
                Elem::List { bullet: block.iter().map(|l| l[2..].trim().to_string()).collect() }
            } else if raw.starts_with([' ', '\t']) {
                let block = self.take_block(raw, |_, line| {
                    line.starts_with([' ', '\t']) && !line.trim().is_empty()
                });
                Elem::Text { lines: dedent(&block), pre: true }
            } else {
                let block = self.take_block(raw, |p, line| {
                    !line.trim().is_empty() && !p.ends_block(line)
                });
                Elem::Text { lines: block.iter().map(|l| l.trim().to_string()).collect(), pre: false }
            };
            section.elem.push(elem);
        }
        Ok(())
    }

    /// Collect `first` and every following line accepted by `accept`.
    fn take_block(&mut self, first: &'a str, accept: impl Fn(&Self, &str) -> bool) -> Vec<&'a str> {
        let mut block = vec![first];
        while let Some(line) = self.lines.peek() {
            if !accept(self, line) {
                break;
            }
            self.lines.next();
            block.push(line);
        }
        block
    }

    fn ends_block(&self, line: &str) -> bool {
        self.section_header(line).is_some() || note_text(line).is_some() || is_command(line)
    }

    /// Depth and title of a section header line
    fn section_header<'l>(&self, line: &'l str) -> Option<(usize, &'l str)> {
        let (marker, offset) = if self.markdown { ('#', 1) } else { ('*', 0) };
        let depth = line.chars().take_while(|&c| c == marker).count();
        if depth <= offset {
            return None;
        }
        let title = line[depth..].strip_prefix(' ')?;
        Some((depth - offset, title.trim()))
    }

    fn parse_command(&self, line: &str, section: &mut Section) -> Result<(), ParseError> {
        let mut words = line.split_whitespace();
        let cmd = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();
        let elem = match cmd {
            ".code" | ".play" => self.parse_code(cmd == ".play", &args)?,
            ".image" => {
                let (url, height, width) = self.media_args(&args)?;
                Elem::Image { url, height, width }
            }
            ".iframe" => {
                let (url, height, width) = self.media_args(&args)?;
                Elem::Iframe { url, height, width }
            }
            ".link" => {
                let url = self.required(args.first(), "missing URL")?;
                let label = if args.len() > 1 { args[1..].join(" ") } else { url.clone() };
                Elem::Link { url, label }
            }
            ".html" => {
                let file = self.required(args.first(), "missing file name")?;
                Elem::Html { html: self.read_include(&file)? }
            }
            ".caption" => Elem::Caption { text: line[cmd.len()..].trim().to_string() },
            ".background" => {
                section.background = Some(self.required(args.first(), "missing URL")?);
                return Ok(());
            }
            _ => return Err(self.syntax(format!("unknown command {cmd:?}"))),
        };
        section.elem.push(elem);
        Ok(())
    }

    fn parse_code(&self, play: bool, args: &[&str]) -> Result<Elem, ParseError> {
        let mut edit = false;
        let mut numbers = false;
        let mut rest = args;
        while let Some((flag, tail)) = rest.split_first() {
            match *flag {
                "-edit" => edit = true,
                "-numbers" => numbers = true,
                _ => break,
            }
            rest = tail;
        }
        let (file, addr) = match rest {
            [file] => (*file, None),
            [file, addr] => (*file, Some(*addr)),
            [] => return Err(self.syntax("missing file name".to_string())),
            _ => return Err(self.syntax(format!("too many arguments: {}", rest.join(" ")))),
        };
        let source = self.read_include(file)?;
        let text = match addr {
            Some(addr) => self.select_lines(&source, addr)?,
            None => source,
        };
        let ext = Path::new(file)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        Ok(Elem::Code { text, file: file.to_string(), ext, play, edit, numbers })
    }

    /// Lines `N` or `N,M` (1-based, inclusive) of an included file
    fn select_lines(&self, src: &str, addr: &str) -> Result<String, ParseError> {
        let bad = || self.syntax(format!("bad address {addr:?}"));
        let (start, end) = match addr.split_once(',') {
            Some((a, b)) => (
                a.parse::<usize>().map_err(|_| bad())?,
                b.parse::<usize>().map_err(|_| bad())?,
            ),
            None => {
                let n = addr.parse::<usize>().map_err(|_| bad())?;
                (n, n)
            }
        };
        let lines: Vec<&str> = src.lines().collect();
        if start == 0 || start > end || end > lines.len() {
            return Err(bad());
        }
        Ok(lines[start - 1..end].join("\n"))
    }

    fn media_args(&self, args: &[&str]) -> Result<(String, Option<u32>, Option<u32>), ParseError> {
        let url = self.required(args.first(), "missing URL")?;
        let height = self.dimension(args.get(1).copied())?;
        let width = self.dimension(args.get(2).copied())?;
        Ok((url, height, width))
    }

    fn dimension(&self, arg: Option<&str>) -> Result<Option<u32>, ParseError> {
        match arg {
            None | Some("_") => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| self.syntax(format!("bad dimension {value:?}"))),
        }
    }

    fn required(&self, arg: Option<&&str>, message: &str) -> Result<String, ParseError> {
        arg.map(|s| s.to_string()).ok_or_else(|| self.syntax(message.to_string()))
    }

    fn read_include(&self, file: &str) -> Result<String, ParseError> {
        let path = self.base.join(file);
        fs::read_to_string(&path).map_err(|source| ParseError::Include {
            name: self.name.clone(),
            path,
            source,
        })
    }

    fn syntax(&self, message: String) -> ParseError {
        ParseError::Syntax { name: self.name.clone(), line: self.lines.line_no(), message }
    }
}

fn is_command(line: &str) -> bool {
    line.strip_prefix('.')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_lowercase())
}

fn note_text(line: &str) -> Option<&str> {
    if line == ":" {
        Some("")
    } else {
        line.strip_prefix(": ")
    }
}

/// Strip the space and tab indentation shared by every line of a preformatted block
fn dedent(block: &[&str]) -> Vec<String> {
    let indent = block
        .iter()
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    block.iter().map(|line| line[indent..].to_string()).collect()
}

/// Parse `15:04 2 Jan 2006` or `2 Jan 2006` into `2 January 2006`
fn parse_time(line: &str) -> Option<String> {
    let date = PrimitiveDateTime::parse(
        line,
        format_description!("[hour]:[minute] [day padding:none] [month repr:short] [year]"),
    )
    .map(|datetime| datetime.date())
    .or_else(|_| Date::parse(line, format_description!("[day padding:none] [month repr:short] [year]")))
    .ok()?;
    date.format(format_description!("[day padding:none] [month repr:long] [year]")).ok()
}
