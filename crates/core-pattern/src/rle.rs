//! Run-length-encoded pattern text (the de-facto Life interchange format).

use crate::{MAX_PATTERN_CELLS, MAX_RUN_LENGTH, PatternError};

/// Emitted lines wrap before exceeding this many characters.
const WRAP_COLUMN: usize = 70;

/// Parse RLE text into live-cell coordinates (pattern-relative, origin at
/// the first row/column of the encoding).
///
/// Comment lines (`#…`) and the header line (`x = …`) are skipped. In the
/// body, digits accumulate a run count; `b`/`.` advances over dead cells,
/// `o`/`*` emits live cells, `$` ends the row, `!` ends the pattern.
/// Anything else (including whitespace and newlines) is ignored.
pub fn parse_rle(text: &str) -> Result<Vec<(i64, i64)>, PatternError> {
    let mut cells = Vec::new();
    let mut x: i64 = 0;
    let mut y: i64 = 0;
    let mut run: u64 = 0;

    'lines: for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') || trimmed.starts_with("x =") || trimmed.starts_with("x=") {
            continue;
        }
        for c in trimmed.chars() {
            match c {
                '0'..='9' => {
                    run = run * 10 + (c as u64 - '0' as u64);
                    if run > MAX_RUN_LENGTH {
                        return Err(PatternError::PatternTooLarge);
                    }
                }
                'b' | 'B' | '.' => {
                    x += run.max(1) as i64;
                    run = 0;
                }
                'o' | 'O' | '*' => {
                    let count = run.max(1) as usize;
                    if cells.len() + count > MAX_PATTERN_CELLS {
                        return Err(PatternError::PatternTooLarge);
                    }
                    for _ in 0..count {
                        cells.push((x, y));
                        x += 1;
                    }
                    run = 0;
                }
                '$' => {
                    y += run.max(1) as i64;
                    x = 0;
                    run = 0;
                }
                '!' => break 'lines,
                _ => {}
            }
        }
    }
    Ok(cells)
}

/// Encode live cells as RLE with a header naming the current rule. The
/// output origin is the bounding-box corner, so emit-then-parse reproduces
/// the cell set up to that translation.
pub fn emit_rle(cells: &[(i64, i64)], rule: &str) -> String {
    let mut out = String::new();
    out.push_str("#C exported pattern\n");

    let Some(&(first_x, first_y)) = cells.first() else {
        out.push_str(&format!("x = 0, y = 0, rule = {rule}\n!\n"));
        return out;
    };
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first_x, first_x, first_y, first_y);
    for &(x, y) in cells {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    out.push_str(&format!(
        "x = {}, y = {}, rule = {rule}\n",
        max_x - min_x + 1,
        max_y - min_y + 1
    ));

    // Row-major sorted copy; runs fall out of adjacency.
    let mut sorted: Vec<(i64, i64)> = cells.iter().map(|&(x, y)| (y, x)).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut line = String::new();
    let mut push_token = |line: &mut String, token: &str| {
        if line.len() + token.len() > WRAP_COLUMN {
            out_push_line(&mut out, line);
        }
        line.push_str(token);
    };
    let token = |count: i64, tag: char| -> String {
        if count == 1 {
            tag.to_string()
        } else {
            format!("{count}{tag}")
        }
    };

    let mut row_gap = 0i64; // '$'s owed before the next content row
    let mut i = 0;
    let mut current_row = min_y;
    while i < sorted.len() {
        let row = sorted[i].0;
        row_gap += row - current_row;
        current_row = row;
        if row_gap > 0 {
            push_token(&mut line, &token(row_gap, '$'));
            row_gap = 0;
        }

        let mut cursor = min_x;
        while i < sorted.len() && sorted[i].0 == row {
            let run_start = sorted[i].1;
            let mut run_end = run_start;
            i += 1;
            while i < sorted.len() && sorted[i].0 == row && sorted[i].1 == run_end + 1 {
                run_end = sorted[i].1;
                i += 1;
            }
            if run_start > cursor {
                push_token(&mut line, &token(run_start - cursor, 'b'));
            }
            push_token(&mut line, &token(run_end - run_start + 1, 'o'));
            cursor = run_end + 1;
        }
        // Trailing dead cells of the row are omitted.
        row_gap = 1;
    }
    push_token(&mut line, "!");
    out_push_line(&mut out, &mut line);
    out
}

fn out_push_line(out: &mut String, line: &mut String) {
    if !line.is_empty() {
        out.push_str(line);
        out.push('\n');
        line.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(cells: &[(i64, i64)]) -> BTreeSet<(i64, i64)> {
        cells.iter().copied().collect()
    }

    /// Translate a cell set so its bounding-box corner is the origin.
    fn normalized(cells: &[(i64, i64)]) -> BTreeSet<(i64, i64)> {
        let min_x = cells.iter().map(|c| c.0).min().unwrap_or(0);
        let min_y = cells.iter().map(|c| c.1).min().unwrap_or(0);
        cells.iter().map(|&(x, y)| (x - min_x, y - min_y)).collect()
    }

    #[test]
    fn parses_glider() {
        let cells = parse_rle("bo$2bo$3o!").unwrap();
        assert_eq!(
            set(&cells),
            set(&[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)])
        );
    }

    #[test]
    fn skips_comments_and_header() {
        let text = "#N Blinker\n#C three in a row\nx = 3, y = 1, rule = B3/S23\n3o!";
        let cells = parse_rle(text).unwrap();
        assert_eq!(set(&cells), set(&[(0, 0), (1, 0), (2, 0)]));
    }

    #[test]
    fn multi_row_skips_and_unknown_chars() {
        // "2$" skips a whole row; stray characters are ignored.
        let cells = parse_rle("o 2$\r o!").unwrap();
        assert_eq!(set(&cells), set(&[(0, 0), (0, 2)]));
    }

    #[test]
    fn stops_at_bang() {
        let cells = parse_rle("o!o").unwrap();
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn run_length_cap_enforced() {
        assert_eq!(parse_rle("999999o!"), Err(PatternError::PatternTooLarge));
        assert_eq!(parse_rle("100o!").unwrap().len(), 100);
    }

    #[test]
    fn emit_round_trips_gosper_gun() {
        let gun = "24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o\
                   4bobo$10bo5bo7bo$11bo3bo$12b2o!";
        let original = parse_rle(gun).unwrap();
        let emitted = emit_rle(&original, "B3/S23");
        let reparsed = parse_rle(&emitted).unwrap();
        assert_eq!(normalized(&reparsed), normalized(&original));
        assert_eq!(reparsed.len(), 36);
    }

    #[test]
    fn emit_round_trips_with_blank_rows_and_offsets() {
        let cells = vec![(-5, -3), (-3, -3), (-5, 2), (10, 2)];
        let emitted = emit_rle(&cells, "B36/S23");
        assert!(emitted.contains("rule = B36/S23"));
        assert!(emitted.contains("x = 16, y = 6"));
        let reparsed = parse_rle(&emitted).unwrap();
        assert_eq!(normalized(&reparsed), normalized(&cells));
    }

    #[test]
    fn emitted_lines_stay_under_wrap_column() {
        // A long sparse row forces many tokens.
        let cells: Vec<(i64, i64)> = (0..200).map(|i| (i * 2, 0)).collect();
        let emitted = emit_rle(&cells, "B3/S23");
        for line in emitted.lines() {
            assert!(line.len() <= WRAP_COLUMN, "line too long: {line:?}");
        }
        let reparsed = parse_rle(&emitted).unwrap();
        assert_eq!(normalized(&reparsed), normalized(&cells));
    }

    #[test]
    fn empty_pattern_emits_terminator_only_body() {
        let emitted = emit_rle(&[], "B3/S23");
        assert!(emitted.contains("x = 0, y = 0"));
        assert!(parse_rle(&emitted).unwrap().is_empty());
    }
}
