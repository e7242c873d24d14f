use super::{doc, missing_page, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{
        app, concat, constant, exec, if_else, int, let_, result, set, str, var, BinOp, Expr,
        Script, Stmt,
    },
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "export_pdf",
            "Export PDF",
            "Export the active document to a PDF file",
            export_pdf,
        )
        .param(ParamSpec::text("path", "Absolute path of the PDF to write").required())
        .param(ParamSpec::text("preset", "PDF export preset name, e.g. \"[High Quality Print]\""))
        .param(ParamSpec::text("page_range", "\"all\" or an InDesign page range such as \"1-3,5\"").default_text("all"))
        .long_running(),
        OperationDef::new(
            "export_images",
            "Export Images",
            "Export pages as PNG or JPEG images into a folder",
            export_images,
        )
        .param(ParamSpec::text("folder", "Absolute path of the output folder").required())
        .param(ParamSpec::choice("format", "Image format", &["png", "jpg"]).default_choice("png"))
        .param(ParamSpec::integer("resolution", "Resolution in ppi").range(36.0, 2400.0).default_int(150))
        .param(ParamSpec::integer("page", "Export only this page number (1-based)").min(1.0))
        .long_running(),
        OperationDef::new(
            "package_document",
            "Package Document",
            "Package the active document with its fonts and links into a folder",
            package_document,
        )
        .param(ParamSpec::text("folder", "Absolute path of the package folder").required())
        .param(ParamSpec::flag("include_fonts", "Copy fonts").default_flag(true))
        .param(ParamSpec::flag("include_links", "Copy linked graphics").default_flag(true))
        .param(ParamSpec::flag("update_graphics", "Update graphic links in the package").default_flag(true))
        .param(ParamSpec::flag("include_hidden_layers", "Include fonts and links from hidden layers").default_flag(false))
        .param(ParamSpec::flag("create_report", "Write an instructions report").default_flag(false))
        .long_running(),
        OperationDef::new(
            "print_document",
            "Print Document",
            "Print the active document without showing the print dialog",
            print_document,
        )
        .param(ParamSpec::text("printer", "Printer name; omit for the current printer"))
        .param(ParamSpec::integer("copies", "Number of copies").range(1.0, 999.0).default_int(1))
        .param(ParamSpec::text("page_range", "\"all\" or an InDesign page range such as \"1-3,5\"").default_text("all"))
        .param(ParamSpec::text("preset", "Printer preset name")),
    ]
}

/// `PageRange.ALL_PAGES` for "all", otherwise the range text as given.
fn page_range(params: &Params) -> Result<Expr, ParamError> {
    Ok(match params.require_text("page_range")? {
        range if range.eq_ignore_ascii_case("all") => constant("PageRange", "ALL_PAGES"),
        range => str(range),
    })
}

fn export_pdf(params: &Params) -> Result<Script, ParamError> {
    let path = params.require_text("path")?;
    let export = |extra: Vec<Expr>| {
        let mut args = vec![
            constant("ExportFormat", "PDF_TYPE"),
            Expr::New("File", vec![str(path)]),
            Expr::Bool(false),
        ];
        args.extend(extra);
        vec![
            exec(doc().call("exportFile", args)),
            result(str(format!("Exported PDF to {}", path))),
        ]
    };

    let mut body = vec![set(
        app().dot("pdfExportPreferences").dot("pageRange"),
        page_range(params)?,
    )];
    match params.text("preset") {
        Some(preset) => body.extend([
            let_("preset", app().dot("pdfExportPresets").by_name(str(preset))),
            if_else(
                var("preset").is_valid().negate(),
                vec![result(str(format!("PDF preset '{}' not found", preset)))],
                export(vec![var("preset")]),
            ),
        ]),
        None => body.extend(export(vec![])),
    }
    Ok(Script::with_document(body))
}

fn export_images(params: &Params) -> Result<Script, ParamError> {
    let folder = params.require_text("folder")?;
    let (prefs_name, range_name, format, ext) = match params.require_text("format")? {
        "jpg" => ("jpegExportPreferences", "jpegExportRange", "JPG", ".jpg"),
        _ => ("pngExportPreferences", "pngExportRange", "PNG_FORMAT", ".png"),
    };
    let prefs = || app().dot(prefs_name);
    let pg = || var("pages").at(var("i"));

    let mut body = vec![
        let_("folder", Expr::New("Folder", vec![str(folder)])),
        if_else(
            var("folder").dot("exists").negate(),
            vec![exec(var("folder").call("create", vec![]))],
            vec![],
        ),
        set(prefs().dot("exportResolution"), params.require_expr("resolution")?),
        set(
            prefs().dot(range_name),
            constant("ExportRangeOrAllPages", "EXPORT_RANGE"),
        ),
        let_("base", doc().dot("name").call("split", vec![str(".indd")]).at(int(0))),
    ];
    let each_page = |stmts: Vec<Stmt>| -> Vec<Stmt> {
        let mut out = vec![let_("pages", doc().dot("pages"))];
        out.push(Stmt::For {
            var: "i",
            from: var("first"),
            until: var("last"),
            body: stmts,
        });
        out
    };
    let export_one = vec![
        set(prefs().dot("pageString"), pg().dot("name")),
        exec(doc().call(
            "exportFile",
            vec![
                constant("ExportFormat", format),
                Expr::New(
                    "File",
                    vec![concat([
                        var("folder").dot("fsName"),
                        str("/"),
                        var("base"),
                        str("_"),
                        pg().dot("name"),
                        str(ext),
                    ])],
                ),
                Expr::Bool(false),
            ],
        )),
        set(var("count"), var("count").bin(BinOp::Add, int(1))),
    ];

    body.push(let_("count", int(0)));
    match params.integer("page") {
        Some(page) => {
            body.push(if_else(
                doc().dot("pages").len().bin(BinOp::Lt, int(page)),
                vec![result(str(missing_page(page)))],
                {
                    let mut found = vec![let_("first", int(page - 1)), let_("last", int(page))];
                    found.extend(each_page(export_one));
                    found.push(done(folder));
                    found
                },
            ));
        }
        None => {
            body.push(let_("first", int(0)));
            body.push(let_("last", doc().dot("pages").len()));
            body.extend(each_page(export_one));
            body.push(done(folder));
        }
    }
    Ok(Script::with_document(body))
}

fn done(folder: &str) -> Stmt {
    result(concat([
        str("Exported "),
        var("count"),
        str(format!(" page image(s) to {}", folder)),
    ]))
}

fn package_document(params: &Params) -> Result<Script, ParamError> {
    let folder = params.require_text("folder")?;
    let flag = |name: &str| params.require_expr(name);
    Ok(Script::with_document(vec![
        let_("folder", Expr::New("Folder", vec![str(folder)])),
        if_else(
            var("folder").dot("exists").negate(),
            vec![exec(var("folder").call("create", vec![]))],
            vec![],
        ),
        let_(
            "packaged",
            doc().call(
                "packageForPrint",
                vec![
                    var("folder"),
                    flag("include_fonts")?,
                    flag("include_links")?,
                    // copy profiles
                    Expr::Bool(false),
                    flag("update_graphics")?,
                    flag("include_hidden_layers")?,
                    // ignore preflight errors
                    Expr::Bool(true),
                    flag("create_report")?,
                ],
            ),
        ),
        if_else(
            var("packaged"),
            vec![result(str(format!("Packaged document to {}", folder)))],
            vec![result(str(format!("Packaging to {} did not complete", folder)))],
        ),
    ]))
}

fn print_document(params: &Params) -> Result<Script, ParamError> {
    let prefs = || doc().dot("printPreferences");
    let mut body = Vec::new();
    if let Some(printer) = params.expr("printer") {
        body.push(set(prefs().dot("printer"), printer));
    }
    body.push(set(prefs().dot("copies"), params.require_expr("copies")?));
    body.push(set(prefs().dot("pageRange"), page_range(params)?));

    let print = |extra: Vec<Expr>| {
        let mut args = vec![Expr::Bool(false)];
        args.extend(extra);
        vec![
            exec(doc().call("print", args)),
            result(concat([
                str("Sent "),
                prefs().dot("copies"),
                str(" copy(ies) of '"),
                doc().dot("name"),
                str("' to the printer"),
            ])),
        ]
    };
    match params.text("preset") {
        Some(preset) => body.extend([
            let_("preset", app().dot("printerPresets").by_name(str(preset))),
            if_else(
                var("preset").is_valid().negate(),
                vec![result(str(format!("Printer preset '{}' not found", preset)))],
                print(vec![var("preset")]),
            ),
        ]),
        None => body.extend(print(vec![])),
    }
    Ok(Script::with_document(body))
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use serde_json::json;

    fn render(name: &str, args: serde_json::Value) -> String {
        let catalog = Catalog::builtin();
        let op = catalog.get(name).unwrap();
        op.render(&op.validate(&args).unwrap()).unwrap().into_string()
    }

    #[test]
    fn exports_are_long_running_and_print_is_not() {
        let catalog = Catalog::builtin();
        for name in ["export_pdf", "export_images", "package_document"] {
            assert!(catalog.get(name).unwrap().long_running, "{}", name);
        }
        assert!(!catalog.get("print_document").unwrap().long_running);
    }

    #[test]
    fn all_pages_uses_the_enum() {
        let out = render("export_pdf", json!({ "path": "/tmp/out.pdf" }));
        assert!(out.contains("app.pdfExportPreferences.pageRange = PageRange.ALL_PAGES;"));
        assert!(out.contains("doc.exportFile(ExportFormat.PDF_TYPE, new File(\"/tmp/out.pdf\"), false);"));

        let out = render("export_pdf", json!({ "path": "/tmp/out.pdf", "page_range": "2-3" }));
        assert!(out.contains("app.pdfExportPreferences.pageRange = \"2-3\";"));
    }

    #[test]
    fn single_page_image_export_checks_the_page() {
        let out = render("export_images", json!({ "folder": "/tmp/png", "page": 4 }));
        assert!(out.contains("if (doc.pages.length < 4) {"));
        assert!(out.contains("var first = 3;"));
        assert!(out.contains("for (var i = first; i < last; i++) {"));
    }
}
