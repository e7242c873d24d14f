use super::{doc, missing_page, on_page, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{
        app, concat, constant, exec, for_each, if_else, int, let_, result, set, str, var, BinOp,
        Expr, Script,
    },
};

/// Returned by `delete_page` instead of removing a document's last page.
pub const ONLY_PAGE_REFUSAL: &str = "Cannot delete the only page in the document";

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new("add_page", "Add Page", "Add one or more pages", add_page)
            .param(ParamSpec::integer("count", "Number of pages to add").range(1.0, 100.0).default_int(1))
            .param(ParamSpec::integer("after", "Insert after this page number (1-based); omit to append").min(1.0)),
        OperationDef::new(
            "delete_page",
            "Delete Page",
            "Delete a page by number. The last remaining page is never deleted",
            delete_page,
        )
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).required()),
        OperationDef::new(
            "duplicate_page",
            "Duplicate Page",
            "Duplicate a page, placing the copy after it or at the end",
            duplicate_page,
        )
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).required())
        .param(
            ParamSpec::choice("placement", "Where to put the copy", &["after", "at_end"])
                .default_choice("after"),
        ),
        OperationDef::new(
            "get_page_info",
            "Page Info",
            "Describe a page: name, bounds and item counts",
            page_info,
        )
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).required()),
        OperationDef::new(
            "navigate_to_page",
            "Navigate To Page",
            "Show a page in the active layout window",
            navigate_to_page,
        )
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).required()),
    ]
}

fn pages_summary() -> Expr {
    concat([
        str(". Document now has "),
        doc().dot("pages").len(),
        str(" page(s)"),
    ])
}

fn add_page(params: &Params) -> Result<Script, ParamError> {
    let count = params.require_integer("count")?;
    let added = |location| {
        for_each(
            "i",
            int(count),
            vec![exec(doc().dot("pages").call("add", location))],
        )
    };
    let done = result(concat([str(format!("Added {} page(s)", count)), pages_summary()]));

    let body = match params.integer("after") {
        None => vec![
            added(vec![constant("LocationOptions", "AT_END")]),
            done,
        ],
        Some(after) => vec![on_page(
            after,
            vec![
                added(vec![constant("LocationOptions", "AFTER"), var("pg")]),
                done,
            ],
        )],
    };
    Ok(Script::with_document(body))
}

fn delete_page(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let pages = || doc().dot("pages");
    Ok(Script::with_document(vec![if_else(
        pages().len().equals(int(1)),
        vec![result(str(ONLY_PAGE_REFUSAL))],
        vec![if_else(
            pages().len().bin(BinOp::Lt, int(page)),
            vec![result(str(missing_page(page)))],
            vec![
                exec(pages().at(int(page - 1)).call("remove", vec![])),
                result(concat([str(format!("Deleted page {}", page)), pages_summary()])),
            ],
        )],
    )]))
}

fn duplicate_page(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let location = match params.require_text("placement")? {
        "at_end" => vec![constant("LocationOptions", "AT_END")],
        _ => vec![constant("LocationOptions", "AFTER"), var("pg")],
    };
    Ok(Script::with_document(vec![on_page(
        page,
        vec![
            let_("copy", var("pg").call("duplicate", location)),
            result(concat([
                str(format!("Duplicated page {} as page ", page)),
                var("copy").dot("name"),
                pages_summary(),
            ])),
        ],
    )]))
}

fn page_info(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let pg = || var("pg");
    Ok(Script::with_document(vec![on_page(
        page,
        vec![result(concat([
            str("Page "),
            pg().dot("name"),
            str(" (index "),
            pg().dot("documentOffset"),
            str(")\nBounds: "),
            pg().dot("bounds").call("join", vec![str(", ")]),
            str("\nItems: "),
            pg().dot("allPageItems").len(),
            str("\nText frames: "),
            pg().dot("textFrames").len(),
            str("\nRectangles: "),
            pg().dot("rectangles").len(),
        ]))],
    )]))
}

fn navigate_to_page(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    Ok(Script::with_document(vec![on_page(
        page,
        vec![
            set(app().dot("activeWindow").dot("activePage"), var("pg")),
            result(concat([str("Now showing page "), var("pg").dot("name")])),
        ],
    )]))
}
