use super::{bounds, doc, on_page, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{concat, constant, exec, if_else, let_, result, set, str, var, Expr, Script, Stmt},
};

const FITS: &[&str] = &["proportionally", "fill_proportionally", "frame_to_content", "none"];

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "place_image",
            "Place Image",
            "Place an image or PDF file on a page",
            place_image,
        )
        .param(ParamSpec::text("path", "Absolute path to the image file").required())
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).default_int(1))
        .param(ParamSpec::length("x", "Left edge").default_length(36.0))
        .param(ParamSpec::length("y", "Top edge").default_length(36.0))
        .param(ParamSpec::length("width", "Frame width; requires height").min(1.0))
        .param(ParamSpec::length("height", "Frame height; requires width").min(1.0))
        .param(ParamSpec::choice("fit", "How to fit the image in its frame", FITS).default_choice("proportionally")),
        shape("create_rectangle", "Create Rectangle", "Draw a rectangle on a page", create_rectangle),
        shape("create_ellipse", "Create Ellipse", "Draw an ellipse on a page", create_ellipse),
        OperationDef::new("create_line", "Create Line", "Draw a straight line on a page", create_line)
            .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).default_int(1))
            .param(ParamSpec::length("x1", "Start x").required())
            .param(ParamSpec::length("y1", "Start y").required())
            .param(ParamSpec::length("x2", "End x").required())
            .param(ParamSpec::length("y2", "End y").required())
            .param(ParamSpec::text("stroke_color", "Stroke swatch name"))
            .param(ParamSpec::length("stroke_weight", "Stroke weight").min(0.0).default_length(1.0)),
    ]
}

fn shape(
    name: &'static str,
    label: &'static str,
    description: &'static str,
    template: super::Template,
) -> OperationDef {
    OperationDef::new(name, label, description, template)
        .param(ParamSpec::integer("page", "Page number (1-based)").min(1.0).default_int(1))
        .param(ParamSpec::length("x", "Left edge").required())
        .param(ParamSpec::length("y", "Top edge").required())
        .param(ParamSpec::length("width", "Width").min(0.0).required())
        .param(ParamSpec::length("height", "Height").min(0.0).required())
        .param(ParamSpec::text("fill_color", "Fill swatch name"))
        .param(ParamSpec::text("stroke_color", "Stroke swatch name"))
        .param(ParamSpec::length("stroke_weight", "Stroke weight").min(0.0))
}

fn swatch(name: Expr) -> Expr {
    doc().dot("swatches").by_name(name)
}

/// Fill, stroke and weight clauses for the parameters that were given.
fn paint(params: &Params, item: &'static str) -> Vec<Stmt> {
    let mut out = Vec::new();
    if let Some(fill) = params.expr("fill_color") {
        out.push(set(var(item).dot("fillColor"), swatch(fill)));
    }
    if let Some(stroke) = params.expr("stroke_color") {
        out.push(set(var(item).dot("strokeColor"), swatch(stroke)));
    }
    if let Some(weight) = params.expr("stroke_weight") {
        out.push(set(var(item).dot("strokeWeight"), weight));
    }
    out
}

fn place_image(params: &Params) -> Result<Script, ParamError> {
    let path = params.require_text("path")?;
    let page = params.require_integer("page")?;
    let origin = Expr::Array(vec![params.require_expr("x")?, params.require_expr("y")?]);

    let mut placed = vec![
        let_("graphic", var("pg").call("place", vec![var("file"), origin]).at(crate::script::int(0))),
        let_("frame", var("graphic").dot("parent")),
    ];
    match (params.contains("width"), params.contains("height")) {
        (true, true) => {
            placed.push(set(var("frame").dot("geometricBounds"), bounds(params, "x", "y")?))
        }
        (false, false) => {}
        (_, given_height) => {
            return Err(ParamError::Invalid {
                name: if given_height { "width" } else { "height" }.into(),
                reason: "width and height must be given together".into(),
            })
        }
    }
    let fit = match params.require_text("fit")? {
        "proportionally" => Some("PROPORTIONALLY"),
        "fill_proportionally" => Some("FILL_PROPORTIONALLY"),
        "frame_to_content" => Some("FRAME_TO_CONTENT"),
        _ => None,
    };
    if let Some(fit) = fit {
        placed.push(exec(var("frame").call("fit", vec![constant("FitOptions", fit)])));
    }
    placed.push(result(concat([
        str("Placed "),
        var("file").dot("name"),
        str(" on page "),
        var("pg").dot("name"),
        str(" (frame id "),
        var("frame").dot("id"),
        str(")"),
    ])));

    Ok(Script::with_document(vec![
        let_("file", Expr::New("File", vec![str(path)])),
        if_else(
            var("file").dot("exists").negate(),
            vec![result(str(format!("File not found: {}", path)))],
            vec![on_page(page, placed)],
        ),
    ]))
}

fn draw(params: &Params, collection: &'static str, kind: &'static str) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let mut body = vec![let_(
        "shape",
        var("pg").dot(collection).call(
            "add",
            vec![Expr::Object(vec![("geometricBounds", bounds(params, "x", "y")?)])],
        ),
    )];
    body.extend(paint(params, "shape"));
    body.push(result(concat([
        str(format!("Created {} ", kind)),
        var("shape").dot("id"),
        str(" on page "),
        var("pg").dot("name"),
    ])));
    Ok(Script::with_document(vec![on_page(page, body)]))
}

fn create_rectangle(params: &Params) -> Result<Script, ParamError> {
    draw(params, "rectangles", "rectangle")
}

fn create_ellipse(params: &Params) -> Result<Script, ParamError> {
    draw(params, "ovals", "ellipse")
}

fn create_line(params: &Params) -> Result<Script, ParamError> {
    let page = params.require_integer("page")?;
    let point = |x: &str, y: &str| -> Result<Expr, ParamError> {
        Ok(Expr::Array(vec![params.require_expr(x)?, params.require_expr(y)?]))
    };
    let mut body = vec![
        let_("line", var("pg").dot("graphicLines").call("add", vec![])),
        set(
            var("line").dot("paths").at(crate::script::int(0)).dot("entirePath"),
            Expr::Array(vec![point("x1", "y1")?, point("x2", "y2")?]),
        ),
    ];
    body.extend(paint(params, "line"));
    body.push(result(concat([
        str("Created line "),
        var("line").dot("id"),
        str(" on page "),
        var("pg").dot("name"),
    ])));
    Ok(Script::with_document(vec![on_page(page, body)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;

    fn place(args: serde_json::Value) -> Result<String, ParamError> {
        let catalog = Catalog::builtin();
        let op = catalog.get("place_image").unwrap();
        Ok(op.render(&op.validate(&args)?)?.into_string())
    }

    #[test]
    fn image_size_needs_both_dimensions() {
        assert_eq!(
            place(json!({ "path": "/tmp/a.png", "width": 200 })),
            Err(ParamError::Invalid {
                name: "height".into(),
                reason: "width and height must be given together".into(),
            })
        );
        assert!(matches!(
            place(json!({ "path": "/tmp/a.png", "height": 100 })),
            Err(ParamError::Invalid { ref name, .. }) if name == "width"
        ));
    }

    #[test]
    fn sized_image_sets_bounds() {
        let out = place(json!({ "path": "/tmp/a.png", "width": 200, "height": 100 })).unwrap();
        assert!(out.contains("frame.geometricBounds = [\"36pt\", \"36pt\", \"136pt\", \"236pt\"];"), "{}", out);
        let natural = place(json!({ "path": "/tmp/a.png" })).unwrap();
        assert!(!natural.contains("geometricBounds"));
    }
}
