use blockplate_parser::codec::{decode, encode};
use blockplate_parser::{parse, ParsedBlock};

fn page() -> &'static str {
    r#"<html>
<!--START:Header--><h1 class="title">{{Title}}</h1><!--END:Header-->
<table>
<!-- START:Row --><tr class='{{_odd}}'><!--START:Cell--><td>{{{Value}}}</td><!--END:Cell--></tr><!-- END:Row -->
</table>
<!--@ generated -->
</html>"#
}

#[test]
fn test_page_structure() {
    let block = parse(&encode(page()));

    let names: Vec<&str> = block.children.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Header", "Row"]);

    let row = &block.children["Row"];
    assert!(row.code.contains("{{{Cell}}}"));
    assert_eq!(row.children["Cell"].code, "<td>{{{Value}}}</td>");
    assert_eq!(block.block_count(), 4);
}

#[test]
fn test_parent_code_holds_only_placeholders() {
    let block = parse(&encode(page()));

    assert!(block.code.contains("{{{Header}}}"));
    assert!(block.code.contains("{{{Row}}}"));
    assert!(!block.code.contains("START:"));
    assert!(!block.code.contains("END:"));
    assert!(!block.code.contains("<td>"));
    // Non-marker comments are left for the renderer to deal with
    assert!(block.code.contains("<!--@ generated -->"));
}

#[test]
fn test_quotes_survive_parse_after_decode() {
    let block = parse(&encode(page()));
    let header = decode(&block.children["Header"].code);
    assert_eq!(header, r#"<h1 class="title">{{Title}}</h1>"#);
}

#[test]
fn test_reparse_of_code_is_stable() {
    let block = parse(&encode(page()));
    let again = parse(&block.code);
    assert_eq!(again.code, block.code);
    assert!(again.children.is_empty());
}

#[test]
fn test_default_block_is_empty_code() {
    let block = ParsedBlock::default();
    assert_eq!(block.code, "");
    assert_eq!(block.block_count(), 1);
}
