use super::{doc, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{
        concat, exec, for_each, if_else, let_, result, set, str, var, BinOp, Expr, Script, Stmt,
    },
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new("create_layer", "Create Layer", "Add a layer to the active document", create_layer)
            .param(ParamSpec::text("name", "Layer name").required())
            .param(ParamSpec::flag("visible", "Show the layer").default_flag(true))
            .param(ParamSpec::flag("locked", "Lock the layer").default_flag(false)),
        OperationDef::new(
            "set_active_layer",
            "Set Active Layer",
            "Make a layer the target for new items",
            set_active_layer,
        )
        .param(ParamSpec::text("name", "Layer name").required()),
        OperationDef::new(
            "set_layer_visibility",
            "Set Layer Visibility",
            "Show or hide a layer and optionally lock or unlock it",
            set_layer_visibility,
        )
        .param(ParamSpec::text("name", "Layer name").required())
        .param(ParamSpec::flag("visible", "Show the layer").required())
        .param(ParamSpec::flag("locked", "Lock the layer")),
        OperationDef::new(
            "list_layers",
            "Layers",
            "List layers with their visibility and lock state",
            list_layers,
        ),
    ]
}

fn layers() -> Expr {
    doc().dot("layers")
}

/// Bind `layer` by name and run `body`, or report it missing.
fn with_layer(name: &str, body: Vec<Stmt>) -> Script {
    Script::with_document(vec![
        let_("layer", layers().by_name(str(name))),
        if_else(
            var("layer").is_valid().negate(),
            vec![result(str(format!("Layer '{}' not found", name)))],
            body,
        ),
    ])
}

fn create_layer(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    Ok(Script::with_document(vec![if_else(
        layers().by_name(str(name)).is_valid(),
        vec![result(str(format!("Layer '{}' already exists", name)))],
        vec![
            let_(
                "layer",
                layers().call(
                    "add",
                    vec![Expr::Object(vec![
                        ("name", str(name)),
                        ("visible", params.require_expr("visible")?),
                        ("locked", params.require_expr("locked")?),
                    ])],
                ),
            ),
            result(concat([
                str(format!("Created layer '{}'. Document now has ", name)),
                layers().len(),
                str(" layer(s)"),
            ])),
        ],
    )]))
}

fn set_active_layer(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    Ok(with_layer(
        name,
        vec![
            set(doc().dot("activeLayer"), var("layer")),
            result(str(format!("Active layer is now '{}'", name))),
        ],
    ))
}

fn set_layer_visibility(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    let visible = params.flag("visible").unwrap_or(true);
    let mut body = vec![set(var("layer").dot("visible"), Expr::Bool(visible))];
    let mut summary = format!("Layer '{}' is now {}", name, if visible { "visible" } else { "hidden" });
    if let Some(locked) = params.flag("locked") {
        body.push(set(var("layer").dot("locked"), Expr::Bool(locked)));
        summary.push_str(if locked { " and locked" } else { " and unlocked" });
    }
    body.push(result(str(summary)));
    Ok(with_layer(name, body))
}

fn list_layers(_params: &Params) -> Result<Script, ParamError> {
    let layer = || var("items").at(var("i"));
    let flag = |field: &'static str, on: &str, off: &str| {
        layer().dot(field).bin(BinOp::And, str(on)).bin(BinOp::Or, str(off))
    };
    Ok(Script::with_document(vec![
        let_("items", layers()),
        let_("lines", Expr::Array(vec![])),
        for_each(
            "i",
            var("items").len(),
            vec![exec(var("lines").call(
                "push",
                vec![concat([
                    layer().dot("name"),
                    str(" ("),
                    flag("visible", "visible", "hidden"),
                    str(", "),
                    flag("locked", "locked", "unlocked"),
                    str(")"),
                ])],
            ))],
        ),
        result(concat([
            var("lines").len(),
            str(" layer(s):\n"),
            var("lines").call("join", vec![str("\n")]),
        ])),
    ]))
}

#[cfg(test)]
mod tests {
    use crate::catalog::Catalog;
    use serde_json::json;

    #[test]
    fn layer_flags_render_as_conditional_text() {
        let catalog = Catalog::builtin();
        let op = catalog.get("list_layers").unwrap();
        let out = op.render(&op.validate(&json!({})).unwrap()).unwrap().into_string();
        assert!(out.contains(r#"(items[i].visible && "visible" || "hidden")"#));
    }

    #[test]
    fn visibility_without_lock_leaves_lock_alone() {
        let catalog = Catalog::builtin();
        let op = catalog.get("set_layer_visibility").unwrap();
        let params = op.validate(&json!({ "name": "Art", "visible": false })).unwrap();
        let out = op.render(&params).unwrap().into_string();
        assert!(out.contains("layer.visible = false;"));
        assert!(!out.contains("layer.locked"));
    }
}
