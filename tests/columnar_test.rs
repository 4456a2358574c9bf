use email_body_extract::*;
use serde_json::{Value, json};

fn columns(html: &str) -> Value {
    serde_json::to_value(to_columnar_json(html)).unwrap()
}

#[test]
fn test_header_row_maps_to_columns() {
    let html = "<table><tr><th>Field</th><th>Response</th></tr>\
                <tr><td>Name</td><td>John Doe</td></tr></table>";
    assert_eq!(columns(html), json!({"Field": ["Name"], "Response": ["John Doe"]}));
}

#[test]
fn test_no_tables_gives_empty_mapping() {
    assert_eq!(columns("<p>Nothing tabular</p>"), json!({}));
    assert_eq!(columns(""), json!({}));
    assert!(to_columnar_json("<div>still nothing</div>").is_empty());
}

#[test]
fn test_td_header_row_and_short_rows() {
    let html = "<table>\
                <tr><td>A</td><td>B</td><td>C</td></tr>\
                <tr><td>1</td></tr>\
                <tr><td>2</td><td>3</td><td>4</td><td>extra</td></tr>\
                </table>";
    assert_eq!(
        columns(html),
        json!({"A": ["1", "2"], "B": ["", "3"], "C": ["", "4"]})
    );
}

#[test]
fn test_header_cells_are_decoded_and_collapsed() {
    let html = "<table><tr><th>Q&amp;A\n   Time</th></tr><tr><td> 10&nbsp;am </td></tr></table>";
    assert_eq!(columns(html), json!({"Q&A Time": ["10 am"]}));
}

#[test]
fn test_tables_merge_by_header() {
    let html = "<table><tr><th>Name</th><th>Age</th></tr>\
                <tr><td>Ann</td><td>31</td></tr></table>\
                <p>and</p>\
                <table><tr><th>Name</th><th>City</th></tr>\
                <tr><td>Bob</td><td>Oslo</td></tr>\
                <tr><td>Cy</td><td>Rome</td></tr></table>";

    let table = to_columnar_json(html);

    assert_eq!(table.headers().collect::<Vec<_>>(), vec!["Name", "Age", "City"]);
    assert_eq!(
        table.column("Name"),
        Some(&["Ann".to_string(), "Bob".to_string(), "Cy".to_string()][..])
    );
    assert_eq!(
        table.column("Age"),
        Some(&["31".to_string(), String::new(), String::new()][..])
    );
    assert_eq!(
        table.column("City"),
        Some(&[String::new(), "Oslo".to_string(), "Rome".to_string()][..])
    );
}

#[test]
fn test_merged_columns_have_equal_length() {
    let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>31</td></tr></table>\
                <table><tr><th>Name</th><th>City</th></tr><tr><td>Bob</td><td>Oslo</td></tr></table>";

    assert_eq!(
        columns(html),
        json!({"Name": ["Ann", "Bob"], "Age": ["31", ""], "City": ["", "Oslo"]})
    );
}

#[test]
fn test_header_only_table_keeps_empty_columns() {
    assert_eq!(
        columns("<table><tr><th>Only</th><th>Headers</th></tr></table>"),
        json!({"Only": [], "Headers": []})
    );
}

#[test]
fn test_tag_scan_recovers_tables_hidden_from_dom() {
    let html = "<textarea><table><tr><td>H</td></tr><tr><td>v</td></tr></table></textarea>";
    assert_eq!(columns(html), json!({"H": ["v"]}));
}
