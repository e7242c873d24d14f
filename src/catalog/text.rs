use super::{bounds, doc, on_page, with_text_frame, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{
        app, concat, constant, exec, for_each, if_else, int, let_, result, set, str, var, Expr,
        Script, Stmt,
    },
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "create_text_frame",
            "Create Text Frame",
            "Create a text frame on a page and fill it with text",
            create_text_frame,
        )
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).default_int(1))
        .param(ParamSpec::length("x", "Left edge").default_length(36.0))
        .param(ParamSpec::length("y", "Top edge").default_length(36.0))
        .param(ParamSpec::length("width", "Frame width").min(1.0).required())
        .param(ParamSpec::length("height", "Frame height").min(1.0).required())
        .param(ParamSpec::text("content", "Text to place in the frame").allow_empty().required())
        .param(ParamSpec::text("font", "Font name, e.g. \"Minion Pro\""))
        .param(ParamSpec::length("font_size", "Point size").min(0.1))
        .param(ParamSpec::text("paragraph_style", "Paragraph style to apply"))
        .param(ParamSpec::text("name", "Script label for the frame")),
        OperationDef::new(
            "edit_text_frame",
            "Edit Text Frame",
            "Replace or append text in an existing text frame and adjust its type",
            edit_text_frame,
        )
        .param(ParamSpec::integer("frame_id", "Text frame id").required())
        .param(ParamSpec::text("content", "New text").allow_empty())
        .param(ParamSpec::flag("append", "Append instead of replacing").default_flag(false))
        .param(ParamSpec::text("font", "Font family and style"))
        .param(ParamSpec::length("font_size", "Point size").min(0.1)),
        OperationDef::new(
            "find_replace_text",
            "Find/Replace Text",
            "Find and replace text across the active document",
            find_replace_text,
        )
        .param(ParamSpec::text("find", "Text to find").required())
        .param(ParamSpec::text("replace", "Replacement text").allow_empty().required())
        .param(ParamSpec::flag("case_sensitive", "Match case").default_flag(false))
        .param(ParamSpec::flag("whole_word", "Match whole words only").default_flag(false)),
        OperationDef::new(
            "list_text_frames",
            "Text Frames",
            "List text frames with their ids and the start of their text",
            list_text_frames,
        )
        .param(ParamSpec::integer("page", "Limit to this page number (1-based)").min(1.0)),
    ]
}

fn story() -> Expr {
    var("frame").dot("parentStory")
}

/// Font and size clauses shared by create and edit, only for the parameters given.
fn type_clauses(params: &Params) -> Vec<Stmt> {
    let mut out = Vec::new();
    if let Some(font) = params.expr("font") {
        out.push(set(story().dot("appliedFont"), font));
    }
    if let Some(size) = params.expr("font_size") {
        out.push(set(story().dot("pointSize"), size));
    }
    out
}

fn create_text_frame(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let mut body = vec![
        let_("frame", var("pg").dot("textFrames").call("add", vec![])),
        set(var("frame").dot("geometricBounds"), bounds(params, "x", "y")?),
        set(var("frame").dot("contents"), params.require_expr("content")?),
    ];
    body.extend(type_clauses(params));
    if let Some(style) = params.expr("paragraph_style") {
        body.push(exec(story().dot("texts").at(int(0)).call(
            "applyParagraphStyle",
            vec![doc().dot("paragraphStyles").by_name(style), Expr::Bool(true)],
        )));
    }
    if let Some(name) = params.expr("name") {
        body.push(set(var("frame").dot("name"), name));
    }
    body.push(result(concat([
        str("Created text frame "),
        var("frame").dot("id"),
        str(" on page "),
        var("pg").dot("name"),
    ])));
    Ok(Script::with_document(vec![on_page(page, body)]))
}

fn edit_text_frame(params: &Params) -> Result<Script, ParamError> {
    let id = params.require_integer("frame_id")?;
    let mut body = Vec::new();
    if let Some(content) = params.expr("content") {
        let target = if params.flag("append").unwrap_or(false) {
            story().dot("insertionPoints").at(int(-1)).dot("contents")
        } else {
            var("frame").dot("contents")
        };
        body.push(set(target, content));
    }
    body.extend(type_clauses(params));
    body.push(result(concat([
        str(format!("Updated text frame {}: ", id)),
        story().dot("characters").len(),
        str(" character(s)"),
    ])));
    Ok(Script::with_document(with_text_frame(id, body)))
}

fn find_replace_text(params: &Params) -> Result<Script, ParamError> {
    let find_prefs = || app().dot("findTextPreferences");
    let change_prefs = || app().dot("changeTextPreferences");
    let options = || app().dot("findChangeTextOptions");
    let nothing = || constant("NothingEnum", "NOTHING");
    Ok(Script::with_document(vec![
        set(find_prefs(), nothing()),
        set(change_prefs(), nothing()),
        set(find_prefs().dot("findWhat"), params.require_expr("find")?),
        set(change_prefs().dot("changeTo"), params.require_expr("replace")?),
        set(options().dot("caseSensitive"), params.require_expr("case_sensitive")?),
        set(options().dot("wholeWord"), params.require_expr("whole_word")?),
        let_("changed", doc().call("changeText", vec![])),
        set(find_prefs(), nothing()),
        set(change_prefs(), nothing()),
        result(concat([
            str("Replaced "),
            var("changed").len(),
            str(" occurrence(s)"),
        ])),
    ]))
}

fn list_text_frames(params: &Params) -> Result<Script, ParamError> {
    let listing = |frames: Expr| {
        let frame = || var("frames").at(var("i"));
        vec![
            let_("frames", frames),
            let_("lines", Expr::Array(vec![])),
            for_each(
                "i",
                var("frames").len(),
                vec![exec(var("lines").call(
                    "push",
                    vec![concat([
                        str("id "),
                        frame().dot("id"),
                        str(": "),
                        frame().dot("contents").call("substr", vec![int(0), int(60)]),
                    ])],
                ))],
            ),
            if_else(
                var("lines").len().equals(int(0)),
                vec![result(str("No text frames"))],
                vec![result(concat([
                    var("lines").len(),
                    str(" text frame(s):\n"),
                    var("lines").call("join", vec![str("\n")]),
                ]))],
            ),
        ]
    };
    let body = match params.integer("page") {
        Some(page) => vec![on_page(page, listing(var("pg").dot("textFrames")))],
        None => listing(doc().dot("textFrames")),
    };
    Ok(Script::with_document(body))
}
