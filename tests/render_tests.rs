use anyhow::{anyhow, Result};
use indesign_mcp::{
    catalog::{Catalog, ONLY_PAGE_REFUSAL},
    script::{emit::string_literal, NO_DOCUMENT},
};
use serde_json::{json, Value};

fn render(name: &str, args: Value) -> Result<String> {
    let catalog = Catalog::builtin();
    let op = catalog.get(name).ok_or_else(|| anyhow!("no operation {}", name))?;
    let params = op.validate(&args)?;
    Ok(op.render(&params)?.into_string())
}

/// Decode a double-quoted ECMAScript string literal the way the engine's lexer would.
fn decode_literal(lit: &str) -> Result<String> {
    let inner = lit
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| anyhow!("not a quoted literal: {}", lit))?;
    let mut units: Vec<u16> = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' || c == '\n' || c == '\r' {
            return Err(anyhow!("unescaped {:?} inside literal", c));
        }
        if c != '\\' {
            let mut buf = [0u16; 2];
            units.extend_from_slice(c.encode_utf16(&mut buf));
            continue;
        }
        let escaped = chars.next().ok_or_else(|| anyhow!("dangling backslash"))?;
        let unit = match escaped {
            'n' => 0x0A,
            'r' => 0x0D,
            't' => 0x09,
            'b' => 0x08,
            'f' => 0x0C,
            'v' => 0x0B,
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                u16::from_str_radix(&hex, 16)?
            }
            other => other as u16,
        };
        units.push(unit);
    }
    Ok(String::from_utf16(&units)?)
}

#[test]
fn test_escaping_round_trips() -> Result<()> {
    let samples = [
        "plain",
        "She said \"hi\"",
        "it's",
        "line one\nline two\r\nline three",
        "back\\slash",
        "tab\there",
        "caf\u{e9} \u{2014} \u{1F4D6}",
        "sep\u{2028}arators\u{2029}",
        "nul\u{0}bell\u{7}",
        "\"; app.quit(); \"",
    ];
    for sample in samples {
        let lit = string_literal(sample);
        assert!(lit.is_ascii(), "literal not ascii: {}", lit);
        assert_eq!(decode_literal(&lit)?, sample);
    }
    Ok(())
}

#[test]
fn test_injection_stays_inside_the_literal() -> Result<()> {
    let hostile = "x\"; app.activeDocument.close(); var y = \"";
    let out = render(
        "create_text_frame",
        json!({ "width": 100, "height": 50, "content": hostile }),
    )?;
    let line = out
        .lines()
        .find(|l| l.trim_start().starts_with("frame.contents = "))
        .ok_or_else(|| anyhow!("no contents assignment"))?;
    let lit = line
        .trim_start()
        .trim_start_matches("frame.contents = ")
        .trim_end_matches(';');
    assert_eq!(decode_literal(lit)?, hostile);
    Ok(())
}

#[test]
fn test_optional_clauses_are_omitted() -> Result<()> {
    let bare = render("create_text_frame", json!({ "width": 100, "height": 50, "content": "x" }))?;
    assert!(!bare.contains("appliedFont"));
    assert!(!bare.contains("pointSize"));
    assert!(!bare.contains("applyParagraphStyle"));

    let styled = render(
        "create_text_frame",
        json!({ "width": 100, "height": 50, "content": "x", "font": "Minion Pro", "font_size": 12 }),
    )?;
    assert!(styled.contains("frame.parentStory.appliedFont = \"Minion Pro\";"));
    assert!(styled.contains("frame.parentStory.pointSize = \"12pt\";"));
    Ok(())
}

#[test]
fn test_lengths_carry_points() -> Result<()> {
    let out = render(
        "create_rectangle",
        json!({ "x": 10, "y": 20, "width": 100, "height": 50.5 }),
    )?;
    assert!(out.contains("geometricBounds: [\"20pt\", \"10pt\", \"70.5pt\", \"110pt\"]"));
    Ok(())
}

#[test]
fn test_rendering_is_pure() -> Result<()> {
    let args = json!({ "find": "colour", "replace": "color" });
    assert_eq!(render("find_replace_text", args.clone())?, render("find_replace_text", args)?);
    Ok(())
}

#[test]
fn test_document_guard_reports_no_document() -> Result<()> {
    for name in ["get_document_info", "save_document", "list_layers", "list_swatches"] {
        let out = render(name, json!({}))?;
        let expected = format!(
            "if (app.documents.length === 0) {{\n    \"{}\";\n}} else {{\n    var doc = app.activeDocument;\n",
            NO_DOCUMENT
        );
        assert!(out.starts_with(&expected), "{} did not start with the guard:\n{}", name, out);
    }
    // creating and opening documents need no active one
    assert!(!render("create_document", json!({}))?.contains(NO_DOCUMENT));
    Ok(())
}

#[test]
fn test_delete_page_refuses_the_last_page() -> Result<()> {
    let out = render("delete_page", json!({ "page": 1 }))?;
    let refusal = format!(
        "if (doc.pages.length === 1) {{\n        \"{}\";\n",
        ONLY_PAGE_REFUSAL
    );
    assert!(out.contains(&refusal), "{}", out);
    assert!(out.contains("\"Page 1 does not exist\""));
    assert!(out.contains("doc.pages[0].remove();"));
    Ok(())
}

#[test]
fn test_execute_script_is_verbatim() -> Result<()> {
    let code = "var s = 'it\\'s';\ns + \" ok\"";
    let out = render("execute_script", json!({ "code": code }))?;
    assert_eq!(out, format!("{}\n", code));
    Ok(())
}
