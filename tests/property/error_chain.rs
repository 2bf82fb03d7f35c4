//! Properties of error chains built through a context node

use apictx::{ApiContext, ErrorKind};
use proptest::prelude::*;

proptest! {
    /// Appending n records yields a chain of length n rendered oldest-first,
    /// and catching unwinds it one record at a time, newest first.
    #[test]
    fn prop_append_then_catch_is_lifo(messages in proptest::collection::vec("[a-z]{1,10}", 1..12)) {
        let ctx = ApiContext::new_root();
        for msg in &messages {
            ctx.append_error("prop", msg.as_str(), None, ErrorKind::Unknown);
        }

        let head = ctx.err().unwrap();
        prop_assert_eq!(head.len(), messages.len());

        let rendered = head.format_chain();
        let lines: Vec<&str> = rendered.lines().collect();
        prop_assert_eq!(lines.len(), messages.len());
        for (line, msg) in lines.iter().zip(&messages) {
            let expected = format!("Api:[prop]:{};Obj: <nil>", msg);
            prop_assert_eq!(*line, expected.as_str());
        }

        for msg in messages.iter().rev() {
            let caught = ctx.catch_last_error().unwrap();
            prop_assert_eq!(caught.message(), msg.as_str());
        }
        prop_assert!(ctx.err().is_none());
        prop_assert!(ctx.catch_last_error().is_none());
    }
}
