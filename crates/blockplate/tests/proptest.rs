//! Property-based tests for rendering.

use blockplate::{record, Record, Template, Value};
use proptest::prelude::*;

fn row_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{0,8}", 1..12)
}

proptest! {
    /// Text without placeholders, markers, comments or literals renders unchanged.
    #[test]
    fn plain_text_renders_verbatim(s in "[a-zA-Z0-9 <>/=.,;:'\"\\-]{0,64}") {
        let mut template = Template::new();
        template.load_str(&s, "", None).unwrap();
        prop_assert_eq!(template.render("").unwrap(), s);
    }

    /// Rendering twice without changes gives the same output.
    #[test]
    fn render_is_idempotent(
        title in "[a-zA-Z <>&'\"]{0,16}",
        rows in row_strategy(),
    ) {
        let mut template = Template::new();
        template
            .load_str("<h1>{{title}}</h1>`lit`<!--START:Row-->{{v}}{{_row}}<!--END:Row--><!-- x -->", "", None)
            .unwrap();
        template.bind_value("", "title", title).unwrap();
        let records: Vec<Record> = rows.iter().map(|v| record! { "v" => v.as_str() }).collect();
        template.bind_rows("Row", records).unwrap();

        let first = template.render("").unwrap();
        prop_assert_eq!(first, template.render("").unwrap());
    }

    /// Rows render in binding order with 1-based numbering.
    #[test]
    fn rows_concatenate_in_order(rows in row_strategy()) {
        let mut template = Template::new();
        template.load_str("{{_row}}={{v}};", "Row", None).unwrap();
        let records: Vec<Record> = rows.iter().map(|v| record! { "v" => v.as_str() }).collect();
        template.bind_rows("Row", records).unwrap();

        let expected: String = rows
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}={};", i + 1, v))
            .collect();
        prop_assert_eq!(template.render("Row").unwrap(), expected);
    }

    /// Exactly one row is first and exactly one is last.
    #[test]
    fn one_first_one_last(n in 1usize..20) {
        let mut template = Template::new();
        template.load_str("{{_first}}/{{_last}} ", "Row", None).unwrap();
        let records: Vec<Record> = (0..n).map(|i| record! { "i" => Value::from(i) }).collect();
        template.bind_rows("Row", records).unwrap();

        let out = template.render("Row").unwrap();
        prop_assert_eq!(out.matches("true/").count(), 1);
        prop_assert_eq!(out.matches("/true").count(), 1);
        prop_assert!(out.starts_with("true/"));
        let ends_last = out.trim_end().ends_with("/true");
        prop_assert!(ends_last);
    }

    /// Raw placeholders output bound text unchanged.
    #[test]
    fn raw_output_is_unescaped(v in "[a-z<>&'\" ]{0,32}") {
        let mut template = Template::new();
        template.load_str("[{{{v}}}]", "", None).unwrap();
        template.bind_value("", "v", v.as_str()).unwrap();
        prop_assert_eq!(template.render("").unwrap(), format!("[{}]", v));
    }
}
