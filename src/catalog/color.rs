use super::{collect_names, doc, joined_or, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{constant, if_else, let_, result, set, str, var, Expr, Script},
};

const CMYK: [&str; 4] = ["cyan", "magenta", "yellow", "black"];
const RGB: [&str; 3] = ["red", "green", "blue"];

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "create_color_swatch",
            "Create Color Swatch",
            "Add a named process color swatch from CMYK (0-100) or RGB (0-255) components",
            create_color_swatch,
        )
        .param(ParamSpec::text("name", "Swatch name").required())
        .param(ParamSpec::choice("model", "Color space of the components", &["cmyk", "rgb"]).default_choice("cmyk"))
        .param(ParamSpec::number("cyan", "Cyan percentage").range(0.0, 100.0))
        .param(ParamSpec::number("magenta", "Magenta percentage").range(0.0, 100.0))
        .param(ParamSpec::number("yellow", "Yellow percentage").range(0.0, 100.0))
        .param(ParamSpec::number("black", "Black percentage").range(0.0, 100.0))
        .param(ParamSpec::number("red", "Red component").range(0.0, 255.0))
        .param(ParamSpec::number("green", "Green component").range(0.0, 255.0))
        .param(ParamSpec::number("blue", "Blue component").range(0.0, 255.0)),
        OperationDef::new(
            "apply_fill_color",
            "Apply Color",
            "Apply a swatch to the fill or stroke of a page item",
            apply_fill_color,
        )
        .param(ParamSpec::integer("item_id", "Page item id").required())
        .param(ParamSpec::text("swatch", "Swatch name").required())
        .param(ParamSpec::choice("target", "Which attribute to color", &["fill", "stroke"]).default_choice("fill")),
        OperationDef::new(
            "list_swatches",
            "Swatches",
            "List swatch names in the active document",
            list_swatches,
        ),
    ]
}

fn create_color_swatch(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    let (space, components): (&'static str, &[&str]) = match params.require_text("model")? {
        "rgb" => ("RGB", &RGB[..]),
        _ => ("CMYK", &CMYK[..]),
    };
    // A swatch with a partial color value is rejected before anything runs.
    let values = components
        .iter()
        .map(|c| params.require_number(c).map(Expr::Num))
        .collect::<Result<Vec<_>, _>>()?;

    let colors = || doc().dot("colors");
    Ok(Script::with_document(vec![if_else(
        colors().by_name(str(name)).is_valid(),
        vec![result(str(format!("Swatch '{}' already exists", name)))],
        vec![
            let_(
                "color",
                colors().call(
                    "add",
                    vec![Expr::Object(vec![
                        ("name", str(name)),
                        ("model", constant("ColorModel", "PROCESS")),
                        ("space", constant("ColorSpace", space)),
                        ("colorValue", Expr::Array(values)),
                    ])],
                ),
            ),
            result(str(format!("Created {} swatch '{}'", space, name))),
        ],
    )]))
}

fn apply_fill_color(params: &Params) -> Result<Script, ParamError> {
    let id = params.require_integer("item_id")?;
    let swatch = params.require_text("swatch")?;
    let (property, target) = match params.require_text("target")? {
        "stroke" => ("strokeColor", "stroke"),
        _ => ("fillColor", "fill"),
    };
    Ok(Script::with_document(vec![
        let_("item", doc().dot("pageItems").call("itemByID", vec![Expr::Int(id)])),
        let_("swatch", doc().dot("swatches").by_name(str(swatch))),
        if_else(
            var("item").is_valid().negate(),
            vec![result(str(format!("Page item {} not found", id)))],
            vec![if_else(
                var("swatch").is_valid().negate(),
                vec![result(str(format!("Swatch '{}' not found", swatch)))],
                vec![
                    set(var("item").dot(property), var("swatch")),
                    result(str(format!("Set {} of item {} to '{}'", target, id, swatch))),
                ],
            )],
        ),
    ]))
}

fn list_swatches(_params: &Params) -> Result<Script, ParamError> {
    let mut body = collect_names("names", doc().dot("swatches"));
    body.push(joined_or("names", "Swatches: ", "No swatches"));
    Ok(Script::with_document(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;

    #[test]
    fn partial_components_are_a_template_error() {
        let catalog = Catalog::builtin();
        let op = catalog.get("create_color_swatch").unwrap();
        let params = op
            .validate(&json!({ "name": "Brand", "model": "rgb", "red": 10, "green": 20 }))
            .unwrap();
        assert_eq!(op.render(&params), Err(ParamError::Missing("blue".into())));
    }

    #[test]
    fn cmyk_components_render_in_order() {
        let catalog = Catalog::builtin();
        let op = catalog.get("create_color_swatch").unwrap();
        let params = op
            .validate(&json!({ "name": "Brand", "cyan": 100, "magenta": 0, "yellow": 0, "black": 20.5 }))
            .unwrap();
        let out = op.render(&params).unwrap().into_string();
        assert!(out.contains("space: ColorSpace.CMYK, colorValue: [100, 0, 0, 20.5]"));
    }
}
