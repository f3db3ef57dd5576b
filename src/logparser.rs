//! Parser for a single minidlna log line.
//!
//! minidlna writes one line per event in the shape
//! `SOURCE:LINE: LEVEL: MESSAGE: ID [FILEPATH]`, e.g.
//! `upnphttp.c:1976: info: play: 7 [/music/a.mp3]`. The parser walks the line
//! character by character and never fails: a malformed line simply yields a
//! record with some fields left empty, which the caller then rejects when it
//! tries to use them.

use std::num::ParseIntError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    LineNumber,
    LogLevel,
    Message,
    MessageId,
    Filepath,
    Done,
}

/// Structured view of one log line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLogRecord {
    pub source_file: String,
    pub line_number: String,
    pub log_level: String,
    pub message: String,
    pub message_id: String,
    pub filepath: String,
}

impl ParsedLogRecord {
    /// Interpret the message id as minidlna's `DETAILS.ID` key.
    pub fn detail_id(&self) -> Result<i64, ParseIntError> {
        self.message_id.parse()
    }
}

/// Parse one log line.
///
/// `LogLevel`, `Message` and `MessageId` drop every whitespace character as
/// they accumulate; `Source`, `LineNumber` and `Filepath` are kept verbatim.
/// The file path may itself contain `]`: only the last `]` on the line ends
/// it, and anything after that is ignored.
pub fn parse_line(line: &str) -> ParsedLogRecord {
    let closing_total = line.matches(']').count();
    let mut closing_seen = 0usize;

    let mut field = Field::Source;
    let mut record = ParsedLogRecord::default();

    for c in line.chars() {
        if c == ']' {
            closing_seen += 1;
        }

        match field {
            Field::Source => match c {
                ':' => field = Field::LineNumber,
                _ => record.source_file.push(c),
            },
            Field::LineNumber => match c {
                ':' => field = Field::LogLevel,
                _ => record.line_number.push(c),
            },
            Field::LogLevel => match c {
                ':' => field = Field::Message,
                c if c.is_whitespace() => {}
                _ => record.log_level.push(c),
            },
            Field::Message => match c {
                ':' => field = Field::MessageId,
                c if c.is_whitespace() => {}
                _ => record.message.push(c),
            },
            Field::MessageId => match c {
                '[' => field = Field::Filepath,
                c if c.is_whitespace() => {}
                _ => record.message_id.push(c),
            },
            Field::Filepath => match c {
                ']' if closing_seen == closing_total => field = Field::Done,
                _ => record.filepath.push(c),
            },
            Field::Done => break,
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_line() {
        let r = parse_line("upnphttp.c:1976: info: play: 7 [/music/a.mp3]");
        assert_eq!(r.source_file, "upnphttp.c");
        assert_eq!(r.line_number, "1976");
        assert_eq!(r.log_level, "info");
        assert_eq!(r.message, "play");
        assert_eq!(r.message_id, "7");
        assert_eq!(r.filepath, "/music/a.mp3");
        assert_eq!(r.detail_id().unwrap(), 7);
    }

    #[test]
    fn trims_level_message_and_id_but_not_source_or_line() {
        let r = parse_line(" S :L : LV : MSG : 42 [/a/b]");
        assert_eq!(r.source_file, " S ");
        assert_eq!(r.line_number, "L ");
        assert_eq!(r.log_level, "LV");
        assert_eq!(r.message, "MSG");
        assert_eq!(r.message_id, "42");
        assert_eq!(r.filepath, "/a/b");
    }

    #[test]
    fn whitespace_inside_trimmed_fields_is_dropped() {
        let r = parse_line("upnphttp.c:1976: warn: serving file: 9 [/x]");
        assert_eq!(r.message, "servingfile");
    }

    #[test]
    fn filepath_keeps_spaces() {
        let r = parse_line("upnphttp.c:1976: info: play: 3 [/music/Some Artist/01 Intro.flac]");
        assert_eq!(r.filepath, "/music/Some Artist/01 Intro.flac");
    }

    #[test]
    fn filepath_keeps_inner_closing_brackets() {
        let r = parse_line("upnphttp.c:1976: info: play: 12 [/a/b]c].dat]");
        assert_eq!(r.filepath, "/a/b]c].dat");
        assert_eq!(r.message_id, "12");
    }

    #[test]
    fn filepath_keeps_bracketed_tags() {
        let r = parse_line("upnphttp.c:1976: info: play: 5 [/music/Album [Deluxe]/01 [Live].mp3]");
        assert_eq!(r.filepath, "/music/Album [Deluxe]/01 [Live].mp3");
    }

    #[test]
    fn trailing_text_after_terminator_is_ignored() {
        let r = parse_line("upnphttp.c:1976: info: play: 5 [/a.mp3] trailing");
        assert_eq!(r.filepath, "/a.mp3");
    }

    #[test]
    fn unterminated_filepath_is_kept() {
        let r = parse_line("upnphttp.c:1976: info: play: 5 [/a.mp3");
        assert_eq!(r.filepath, "/a.mp3");
    }

    #[test]
    fn malformed_line_leaves_fields_empty() {
        let r = parse_line("no delimiters at all");
        assert_eq!(r.source_file, "no delimiters at all");
        assert!(r.line_number.is_empty());
        assert!(r.message_id.is_empty());
        assert!(r.filepath.is_empty());
        assert!(r.detail_id().is_err());
    }

    #[test]
    fn non_numeric_id_fails_detail_lookup() {
        let r = parse_line("upnphttp.c:1976: info: play: abc [/a.mp3]");
        assert_eq!(r.message_id, "abc");
        assert!(r.detail_id().is_err());
    }
}
