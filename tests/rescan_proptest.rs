//! Property tests for streamed ingestion.
//!
//! Resuming from a checkpoint must give the same slides as rescanning the
//! whole buffer, for any way the text is cut into cumulative prefixes.

use proptest::prelude::*;
use slidemark::{ParserOptions, RescanStrategy, SlideParser};

/// Well-formed and malformed fragments a model might emit.
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,12}".prop_map(|t| format!("<SECTION><H1>{t}</H1></SECTION>")),
        "[a-z ]{0,12}".prop_map(|t| format!("<SECTION layout=\"left\"><P>{t} <B>b</B></P></SECTION>")),
        "[a-z]{1,8}".prop_map(|q| format!("<SECTION><IMG query=\"{q}\" /><H2>x</H2></SECTION>")),
        Just("<SECTION><TIMELINE><DIV><H3>2024</H3><P>go</P></DIV></TIMELINE></SECTION>".to_string()),
        Just("<SECTION><TABLE><TR><TD>a</TD><TD>1</TD></TR></TABLE></SECTION>".to_string()),
        Just("<SECTION><UL><LI>one<LI>two</UL></SECTION>".to_string()),
        Just("<SECTION><IMG query=\"broken></SECTION>".to_string()),
        Just("<SECTION><P>caf\u{e9} &amp; \u{65e5}\u{672c}</P></SECTION>".to_string()),
        Just("</DIV>stray text ".to_string()),
        Just("<SECTION><COMPARE><DIV><P>a</P>".to_string()),
    ]
}

fn deck() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..8).prop_map(|parts| {
        let mut text = String::from("<PRESENTATION>");
        text.push_str(&parts.concat());
        text
    })
}

/// Cut `text` at the given fractions, rounding up to char boundaries.
fn prefixes(text: &str, cuts: &[f64]) -> Vec<String> {
    let mut ends: Vec<usize> = cuts
        .iter()
        .map(|f| {
            let mut end = ((text.len() as f64) * f) as usize;
            while end < text.len() && !text.is_char_boundary(end) {
                end += 1;
            }
            end.min(text.len())
        })
        .collect();
    ends.push(text.len());
    ends.sort_unstable();
    ends.dedup();
    ends.into_iter().map(|end| text[..end].to_string()).collect()
}

fn parser(rescan: RescanStrategy) -> SlideParser {
    SlideParser::with_options(ParserOptions::new().with_rescan(rescan))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn checkpoint_matches_full_rescan(
        text in deck(),
        cuts in prop::collection::vec(0.0f64..1.0, 1..12),
    ) {
        let mut fast = parser(RescanStrategy::Checkpoint);
        let mut full = parser(RescanStrategy::Full);

        for prefix in prefixes(&text, &cuts) {
            fast.ingest(&prefix);
            full.ingest(&prefix);
            prop_assert_eq!(fast.all_slides(), full.all_slides());
            prop_assert_eq!(fast.pending_slide(), full.pending_slide());
        }

        fast.finalize();
        full.finalize();
        prop_assert_eq!(fast.all_slides(), full.all_slides());
    }

    #[test]
    fn closed_count_is_monotonic(
        text in deck(),
        cuts in prop::collection::vec(0.0f64..1.0, 1..12),
    ) {
        let mut parser = SlideParser::new();
        let mut last = 0;
        for prefix in prefixes(&text, &cuts) {
            parser.ingest(&prefix);
            let count = parser.all_slides().len();
            prop_assert!(count >= last);
            last = count;
        }
    }

    #[test]
    fn ingest_is_idempotent(text in deck()) {
        let mut once = SlideParser::new();
        once.ingest(&text);

        let mut twice = SlideParser::new();
        twice.ingest(&text);
        twice.ingest(&text);

        prop_assert_eq!(once.all_slides(), twice.all_slides());
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,200}") {
        let mut parser = SlideParser::new();
        parser.ingest(&text);
        parser.finalize();
        parser.finalize();
        let _ = parser.presentation();
    }

    #[test]
    fn arbitrary_markup_never_panics(text in "[<>/=\" a-zA-Z0-9&;!-]{0,200}") {
        let mut parser = SlideParser::new();
        for (end, _) in text.char_indices() {
            parser.ingest(&text[..end]);
        }
        parser.ingest(&text);
        parser.finalize();
        prop_assert!(parser.is_finalized());
    }
}
