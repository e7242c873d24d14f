use super::{doc, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{app, concat, constant, exec, if_else, let_, result, set, str, var, Expr, Script},
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "create_document",
            "Create Document",
            "Create a new document with the given page size and page count",
            create_document,
        )
        .param(ParamSpec::length("width", "Page width").min(1.0).default_length(612.0))
        .param(ParamSpec::length("height", "Page height").min(1.0).default_length(792.0))
        .param(ParamSpec::integer("pages", "Number of pages").range(1.0, 9999.0).default_int(1))
        .param(ParamSpec::flag("facing_pages", "Use facing pages (spreads)").default_flag(false))
        .param(ParamSpec::length("margin", "Margin applied to all four sides").min(0.0))
        .param(ParamSpec::integer("columns", "Column count per page").range(1.0, 40.0)),
        OperationDef::new(
            "open_document",
            "Open Document",
            "Open an existing InDesign document from disk",
            open_document,
        )
        .param(ParamSpec::text("path", "Absolute path to the .indd file").required())
        .param(ParamSpec::flag("show_window", "Open the document in a window").default_flag(true)),
        OperationDef::new(
            "save_document",
            "Save Document",
            "Save the active document, optionally to a new path",
            save_document,
        )
        .param(ParamSpec::text("path", "Absolute path to save to; omit to save in place")),
        OperationDef::new(
            "close_document",
            "Close Document",
            "Close the active document",
            close_document,
        )
        .param(
            ParamSpec::choice("save", "Save changes before closing", &["yes", "no", "ask"])
                .default_choice("no"),
        ),
        OperationDef::new(
            "get_document_info",
            "Document Info",
            "Describe the active document: name, pages, page size, layers and save state",
            document_info,
        ),
    ]
}

fn create_document(params: &Params) -> Result<Script, ParamError> {
    let prefs = || var("doc").dot("documentPreferences");
    let mut body = vec![
        let_("doc", app().dot("documents").call("add", vec![])),
        set(prefs().dot("pageWidth"), params.require_expr("width")?),
        set(prefs().dot("pageHeight"), params.require_expr("height")?),
        set(prefs().dot("pagesPerDocument"), params.require_expr("pages")?),
        set(prefs().dot("facingPages"), params.require_expr("facing_pages")?),
    ];
    if let Some(margin) = params.expr("margin") {
        for side in ["top", "bottom", "left", "right"] {
            body.push(set(var("doc").dot("marginPreferences").dot(side), margin.clone()));
        }
    }
    if let Some(columns) = params.expr("columns") {
        body.push(set(var("doc").dot("marginPreferences").dot("columnCount"), columns));
    }
    body.push(result(concat([
        str("Created document '"),
        var("doc").dot("name"),
        str("' with "),
        var("doc").dot("pages").len(),
        str(" page(s)"),
    ])));
    Ok(Script::from_statements(body))
}

fn open_document(params: &Params) -> Result<Script, ParamError> {
    let path = params.require_text("path")?;
    let show = params.require_expr("show_window")?;
    Ok(Script::from_statements(vec![
        let_("file", Expr::New("File", vec![str(path)])),
        if_else(
            var("file").dot("exists").negate(),
            vec![result(str(format!("File not found: {}", path)))],
            vec![
                let_("doc", app().call("open", vec![var("file"), show])),
                result(concat([str("Opened document '"), doc().dot("name"), str("'")])),
            ],
        ),
    ]))
}

fn save_document(params: &Params) -> Result<Script, ParamError> {
    let save = match params.text("path") {
        Some(path) => doc().call("save", vec![Expr::New("File", vec![str(path)])]),
        None => doc().call("save", vec![]),
    };
    Ok(Script::with_document(vec![
        exec(save),
        result(concat([
            str("Saved document '"),
            doc().dot("name"),
            str("' to "),
            doc().dot("fullName").dot("fsName"),
        ])),
    ]))
}

fn close_document(params: &Params) -> Result<Script, ParamError> {
    let option = match params.require_text("save")? {
        "yes" => constant("SaveOptions", "YES"),
        "ask" => constant("SaveOptions", "ASK"),
        _ => constant("SaveOptions", "NO"),
    };
    Ok(Script::with_document(vec![
        let_("name", doc().dot("name")),
        exec(doc().call("close", vec![option])),
        result(concat([str("Closed document '"), var("name"), str("'")])),
    ]))
}

fn document_info(_params: &Params) -> Result<Script, ParamError> {
    let prefs = || doc().dot("documentPreferences");
    Ok(Script::with_document(vec![result(concat([
        str("Name: "),
        doc().dot("name"),
        str("\nPages: "),
        doc().dot("pages").len(),
        str("\nPage size: "),
        prefs().dot("pageWidth"),
        str(" x "),
        prefs().dot("pageHeight"),
        str("\nFacing pages: "),
        prefs().dot("facingPages"),
        str("\nLayers: "),
        doc().dot("layers").len(),
        str("\nSaved: "),
        doc().dot("saved"),
    ]))]))
}
