//! Tests for the worksheet parser state machine.

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::models::cell::{Cell, ComputeCell, TextCell};
use crate::parsing::{ParseError, parse_worksheet, parse_worksheet_with, unescape::UnescapeError};

fn cells(worksheet: &str) -> Vec<Cell> {
    parse_worksheet(worksheet)
        .collect::<Result<_, _>>()
        .unwrap()
}

fn text(input: &str) -> Cell {
    Cell::Text(TextCell::new(input))
}

fn compute(index: u64, input: &str, output: &str) -> Cell {
    Cell::Compute(ComputeCell::new(index, input, output))
}

// Scenarios

#[test]
fn single_compute_cell() {
    assert_eq!(
        cells("{{{id=3|\nx = 1\n///\n4\n}}}"),
        vec![compute(3, "x = 1", "4")]
    );
}

#[test]
fn text_then_compute_with_hidden_directive() {
    let parsed = cells("Hello\n{{{id=0|\n%hide\nprint(1)\n///\n1\n}}}");

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0], text("Hello"));
    let cell = parsed[1].as_compute().unwrap();
    assert_eq!(cell.index(), 0);
    assert_eq!(cell.directive_rewrite(), "print(1)");
    assert_eq!(cell.output(), "1");
}

#[test]
fn output_markup_is_hidden() {
    let parsed = cells("{{{id=1|\nshow(x)\n///\na<html>b</html>c\n}}}");
    assert_eq!(parsed[0].as_compute().unwrap().visible_output(), "ac");
}

#[test]
fn missing_close_marker_still_yields_cell() {
    assert_eq!(
        cells("{{{id=1|\nfoo\n///\nbar"),
        vec![compute(1, "foo", "bar")]
    );
}

#[test]
fn missing_mid_marker_yields_empty_output() {
    assert_eq!(
        cells("Intro\n{{{id=2|\nfoo\nbar"),
        vec![text("Intro"), compute(2, "foo\nbar", "")]
    );
}

#[test]
fn leading_directives_are_promoted() {
    let parsed = cells("{{{id=5|\n%auto\n%time\nx=1\n///\n}}}");
    assert_eq!(
        parsed[0].as_compute().unwrap().directive_rewrite(),
        "%%time\nx=1"
    );
}

// Segmentation

#[test]
fn text_between_and_after_cells() {
    let ws = "Title\n\n{{{id=0|\na = 1\n///\n\n}}}\nMiddle text\n{{{id=7|\nb\n///\nb\n}}}\n\nOutro";
    assert_eq!(
        cells(ws),
        vec![
            text("Title"),
            compute(0, "a = 1", ""),
            text("Middle text"),
            compute(7, "b", "b"),
            text("Outro"),
        ]
    );
}

#[test]
fn adjacent_cells_produce_no_text_between() {
    let ws = "{{{id=1|\na\n///\n}}}\n\n   \n{{{id=2|\nb\n///\n}}}";
    assert_eq!(cells(ws), vec![compute(1, "a", ""), compute(2, "b", "")]);
}

#[test]
fn indices_keep_document_order() {
    let ws = "{{{id=9|\nz\n///\n}}}\n{{{id=2|\ny\n///\n}}}\n{{{id=40|\nx\n///\n}}}";
    let indices: Vec<u64> = cells(ws)
        .iter()
        .filter_map(Cell::as_compute)
        .map(ComputeCell::index)
        .collect();
    assert_eq!(indices, vec![9, 2, 40]);
}

#[test]
fn multi_line_runs_are_trimmed_not_collapsed() {
    let ws = "{{{id=0|\n\n  def f(x):\n      return x\n\n///\n\n  line 1\n\n  line 2  \n\n}}}";
    assert_eq!(
        cells(ws),
        vec![compute(0, "def f(x):\n      return x", "line 1\n\n  line 2")]
    );
}

#[rstest]
#[case::mid_outside_cell("///\nplain\n}}}", "///\nplain\n}}}")]
#[case::open_without_digits("{{{id=|\ntext", "{{{id=|\ntext")]
#[case::open_with_padding(" {{{id=1|\ntext", "{{{id=1|\ntext")]
fn stray_markers_are_text(#[case] ws: &str, #[case] expected: &str) {
    assert_eq!(cells(ws), vec![text(expected)]);
}

#[test]
fn markers_inside_input_are_content() {
    let ws = "{{{id=1|\n{{{id=2|\n}}}\n///\nout\n}}}";
    assert_eq!(cells(ws), vec![compute(1, "{{{id=2|\n}}}", "out")]);
}

#[test]
fn markers_inside_output_are_content() {
    let ws = "{{{id=1|\nin\n///\n{{{id=2|\n///\n}}}\nafter";
    assert_eq!(
        cells(ws),
        vec![compute(1, "in", "{{{id=2|\n///"), text("after")]
    );
}

#[test]
fn empty_cell_keeps_both_runs() {
    assert_eq!(cells("{{{id=0|\n///\n}}}"), vec![compute(0, "", "")]);
}

#[test]
fn open_marker_on_last_line() {
    assert_eq!(cells("Text\n{{{id=4|"), vec![text("Text"), compute(4, "", "")]);
}

#[rstest]
#[case("")]
#[case("\n\n\n")]
#[case("   \n\t\n")]
fn blank_documents_produce_no_cells(#[case] ws: &str) {
    assert!(cells(ws).is_empty());
}

#[test]
fn text_only_document() {
    assert_eq!(cells("  Just some notes\nand more  "), vec![text("Just some notes\nand more")]);
}

#[test]
fn crlf_lines_are_accepted() {
    assert_eq!(
        cells("Hi\r\n{{{id=1|\r\nx\r\n///\r\ny\r\n}}}\r\n"),
        vec![text("Hi"), compute(1, "x", "y")]
    );
}

// Unescaping

#[test]
fn runs_are_unescaped_after_segmentation() {
    let ws = "a &lt; b\n{{{id=0|\nprint(&quot;&#123;&#123;&#123;id=1|&quot;)\n///\n&lt;html&gt;x&lt;/html&gt;\n}}}";
    let parsed = cells(ws);

    assert_eq!(parsed[0], text("a < b"));
    let cell = parsed[1].as_compute().unwrap();
    assert_eq!(cell.input(), "print(\"{{{id=1|\")");
    assert_eq!(cell.output(), "<html>x</html>");
    assert_eq!(cell.visible_output(), "");
}

#[test]
fn blank_text_is_not_unescaped() {
    let calls = std::cell::Cell::new(0);
    let counting = |raw: &str| -> Result<String, UnescapeError> {
        calls.set(calls.get() + 1);
        Ok(raw.to_string())
    };

    let parsed: Vec<Cell> = parse_worksheet_with("\n\n{{{id=0|\nx\n///\ny\n}}}\n", &counting)
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(parsed.len(), 1);
    // input and output only
    assert_eq!(calls.get(), 2);
}

#[test]
fn unescape_failure_is_propagated_and_fuses() {
    let failing = |raw: &str| -> Result<String, UnescapeError> {
        if raw.contains("&bogus;") {
            Err(UnescapeError {
                sequence: "&bogus;".to_string(),
                reason: "unknown entity".to_string(),
            })
        } else {
            Ok(raw.to_string())
        }
    };

    let mut parser = parse_worksheet_with("ok\n{{{id=0|\n&bogus;\n///\n}}}\nlater", failing);

    assert_eq!(parser.next().unwrap().unwrap(), text("ok"));
    assert!(matches!(parser.next(), Some(Err(ParseError::Unescape(_)))));
    assert!(parser.next().is_none());
}

// Errors

#[test]
fn malformed_index_is_fatal_after_preceding_text() {
    let mut parser = parse_worksheet("Intro\n{{{id=99999999999999999999|\nx\n///\n}}}\nMore");

    assert_eq!(parser.next().unwrap().unwrap(), text("Intro"));
    match parser.next() {
        Some(Err(ParseError::MalformedIndex { line, digits, .. })) => {
            assert_eq!(line, 2);
            assert_eq!(digits, "99999999999999999999");
        }
        other => panic!("expected malformed index, got {other:?}"),
    }
    assert!(parser.next().is_none());
}

#[test]
fn malformed_index_message_names_the_worksheet_as_corrupt() {
    let err = parse_worksheet("{{{id=18446744073709551616|")
        .next()
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().starts_with("corrupt worksheet"));
}

#[test]
fn largest_index_is_accepted() {
    assert_eq!(
        cells("{{{id=18446744073709551615|\n///\n}}}"),
        vec![compute(u64::MAX, "", "")]
    );
}

// Iteration contract

#[test]
fn partial_consumption_is_allowed() {
    let ws = "A\n{{{id=1|\nx\n///\n}}}\nB\n{{{id=2|\ny\n///\n}}}";
    let first_two: Vec<Cell> = parse_worksheet(ws).take(2).map(Result::unwrap).collect();
    assert_eq!(first_two, vec![text("A"), compute(1, "x", "")]);
}

#[test]
fn exhausted_parser_stays_exhausted() {
    let mut parser = parse_worksheet("A");
    assert!(parser.next().is_some());
    assert!(parser.next().is_none());
    assert!(parser.next().is_none());
}

/// Text and compute cells never arrive as two text cells in a row, and the
/// non-marker lines of a well-formed worksheet survive the split.
#[rstest]
#[case("Intro\n{{{id=0|\na\n///\nb\n}}}\nMid\n{{{id=1|\nc\n///\nd\n}}}\nEnd")]
#[case("{{{id=0|\na\n///\nb\n}}}\n{{{id=1|\nc\n///\nd\n}}}")]
#[case("only text\nover lines")]
fn segments_reconstruct_the_document(#[case] ws: &str) {
    let parsed = cells(ws);

    for pair in parsed.windows(2) {
        assert!(
            !matches!(pair, [Cell::Text(_), Cell::Text(_)]),
            "two text cells in a row: {pair:?}"
        );
    }

    let mut rebuilt = Vec::new();
    for cell in &parsed {
        match cell {
            Cell::Text(t) => rebuilt.push(t.input().to_string()),
            Cell::Compute(c) => {
                rebuilt.push(c.input().to_string());
                rebuilt.push(c.output().to_string());
            }
        }
    }
    let content: Vec<&str> = ws
        .lines()
        .filter(|l| !(l.starts_with("{{{id=") || *l == "///" || *l == "}}}"))
        .collect();
    assert_eq!(rebuilt.join("\n"), content.join("\n"));
}
